use regex::Regex;
use std::sync::OnceLock;
use time::{Date, Duration, Month};

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

struct DatePatterns {
    iso: Regex,
    month_first: Regex,
    month_name_first: Regex,
    day_first_name: Regex,
}

fn patterns() -> &'static DatePatterns {
    static P: OnceLock<DatePatterns> = OnceLock::new();
    P.get_or_init(|| DatePatterns {
        iso: Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T\s].*)?$").expect("iso date regex"),
        month_first: Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").expect("numeric date regex"),
        month_name_first: Regex::new(r"(?i)^([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})$")
            .expect("month-name date regex"),
        day_first_name: Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)?\s+(?:day\s+of\s+|of\s+)?([a-z]{3,9})\.?,?\s+(\d{4})$")
            .expect("day-first date regex"),
    })
}

/// Matches dates embedded in running text, in any of the accepted shapes.
pub fn date_in_text_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{4}|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}|\d{1,2}(?:st|nd|rd|th)?\s+(?:day\s+of\s+)?(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*,?\s+\d{4})\b",
        )
        .expect("embedded date regex")
    })
}

fn month_from_name(name: &str) -> Option<u8> {
    let lower = name.to_ascii_lowercase();
    let lower = if lower == "sept" { "sep".to_string() } else { lower };
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lower))
        .map(|i| i as u8 + 1)
}

fn build(year: &str, month: u8, day: &str) -> Option<Date> {
    let year: i32 = year.parse().ok()?;
    let day: u8 = day.parse().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

pub fn parse_date(s: &str) -> Option<Date> {
    let s = s.trim();
    let p = patterns();
    if let Some(c) = p.iso.captures(s) {
        return build(&c[1], c[2].parse().ok()?, &c[3]);
    }
    if let Some(c) = p.month_first.captures(s) {
        return build(&c[3], c[1].parse().ok()?, &c[2]);
    }
    if let Some(c) = p.month_name_first.captures(s) {
        return build(&c[3], month_from_name(&c[1])?, &c[2]);
    }
    if let Some(c) = p.day_first_name.captures(s) {
        return build(&c[3], month_from_name(&c[2])?, &c[1]);
    }
    None
}

pub fn format_date(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}

/// Normalize any accepted date shape to `YYYY-MM-DD`.
pub fn normalize_date(s: &str) -> Option<String> {
    parse_date(s).map(format_date)
}

/// Terms longer than this are treated as unparseable.
pub const MAX_TERM_YEARS: f64 = 1000.0;

/// `None` when the offset leaves the calendar range `time` supports.
pub fn add_days(date: &str, days: i64) -> Option<String> {
    let d = parse_date(date)?;
    let seconds = days.checked_mul(86_400)?;
    d.checked_add(Duration::seconds(seconds)).map(format_date)
}

/// Term arithmetic uses 365-day years, no leap-day adjustment.
pub fn years_after(date: &str, years: f64) -> Option<String> {
    if !years.is_finite() || years <= 0.0 || years > MAX_TERM_YEARS {
        return None;
    }
    add_days(date, (years * 365.0).round() as i64)
}

/// First date found anywhere in `text`, normalized.
pub fn find_date_in_text(text: &str) -> Option<String> {
    date_in_text_regex()
        .find_iter(text)
        .find_map(|m| normalize_date(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_shapes_normalize() {
        assert_eq!(normalize_date("2024-3-5").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("2024/03/05").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("03/05/2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("March 5th, 2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("5 Mar 2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("5th day of March, 2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("2024-03-05T10:00:00Z").as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert_eq!(normalize_date("2023-02-29"), None);
        assert_eq!(normalize_date("13/01/2024"), None);
        assert_eq!(normalize_date("Not specified"), None);
        assert_eq!(normalize_date("Smarch 3, 2024"), None);
    }

    #[test]
    fn term_years_are_365_days() {
        assert_eq!(years_after("2024-01-01", 1.0).as_deref(), Some("2024-12-31"));
        assert_eq!(years_after("2023-01-01", 2.0).as_deref(), Some("2024-12-31"));
        assert_eq!(years_after("2023-01-01", 0.0), None);
    }

    #[test]
    fn absurd_offsets_are_none() {
        assert_eq!(years_after("2024-01-01", 3.0e11), None);
        assert_eq!(years_after("2024-01-01", 1.0e20), None);
        assert_eq!(years_after("2024-01-01", 1001.0), None);
        assert_eq!(add_days("2024-01-01", i64::MAX), None);
        assert_eq!(add_days("2024-01-01", i64::MIN), None);
        assert_eq!(add_days("2024-01-01", 10_000_000), None);
        assert!(years_after("2024-01-01", 1000.0).is_some());
    }

    #[test]
    fn subtracting_days() {
        assert_eq!(add_days("2024-03-01", -30).as_deref(), Some("2024-01-31"));
    }

    #[test]
    fn finds_first_date_in_prose() {
        let text = "This Agreement is made effective as of January 15, 2024 between the parties.";
        assert_eq!(find_date_in_text(text).as_deref(), Some("2024-01-15"));
    }
}
