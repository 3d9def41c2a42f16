use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_CURRENCY: &str = "USD";

struct MagnitudePattern {
    regex: Regex,
    multiplier: f64,
}

/// Precedence: millions, thousands, plain. First match wins.
fn magnitude_patterns() -> &'static [MagnitudePattern] {
    static P: OnceLock<Vec<MagnitudePattern>> = OnceLock::new();
    P.get_or_init(|| {
        [
            (r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(?:million|mil|m)\b", 1_000_000.0),
            (r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(?:thousand|k)\b", 1_000.0),
            (r"(\d[\d,]*(?:\.\d+)?)", 1.0),
        ]
        .into_iter()
        .map(|(pat, multiplier)| MagnitudePattern {
            regex: Regex::new(pat).expect("static magnitude pattern"),
            multiplier,
        })
        .collect()
    })
}

/// Numeric amount in free text: comma groups, decimals, and million/thousand suffixes.
pub fn extract_numeric_value(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | '₹'))
        .collect();
    for p in magnitude_patterns() {
        if let Some(c) = p.regex.captures(&cleaned) {
            let digits = c[1].replace(',', "");
            let digits = digits.trim_end_matches('.');
            if let Ok(v) = digits.parse::<f64>() {
                return Some(v * p.multiplier);
            }
        }
    }
    None
}

const CURRENCY_CODES: &[&str] = &["USD", "EUR", "GBP", "CAD", "AUD", "INR", "JPY", "HKD", "SGD"];

// Prefixed dollar forms come before the bare symbol.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("HK$", "HKD"),
    ("CA$", "CAD"),
    ("C$", "CAD"),
    ("AU$", "AUD"),
    ("A$", "AUD"),
    ("S$", "SGD"),
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
];

fn code_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(&format!(r"\b({})\b", CURRENCY_CODES.join("|"))).expect("currency code regex")
    })
}

/// Explicit three-letter code wins over symbol inference.
pub fn detect_currency(text: &str) -> Option<&'static str> {
    let upper = text.to_uppercase();
    if let Some(c) = code_regex().captures(&upper) {
        let found = c.get(1)?.as_str();
        return CURRENCY_CODES.iter().copied().find(|code| *code == found);
    }
    CURRENCY_SYMBOLS
        .iter()
        .find(|(sym, _)| text.contains(sym))
        .map(|(_, code)| *code)
}

/// USD only when the text carries no currency signal at all.
pub fn currency_or_default(text: &str) -> &'static str {
    detect_currency(text).unwrap_or(DEFAULT_CURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitudes_apply_once() {
        assert_eq!(extract_numeric_value("$2.5 million"), Some(2_500_000.0));
        assert_eq!(extract_numeric_value("USD 750k"), Some(750_000.0));
        assert_eq!(extract_numeric_value("40 thousand"), Some(40_000.0));
        assert_eq!(extract_numeric_value("3m"), Some(3_000_000.0));
    }

    #[test]
    fn plain_grouped_numbers_with_cents() {
        assert_eq!(extract_numeric_value("$1,250,000.50"), Some(1_250_000.5));
        assert_eq!(extract_numeric_value("Total: 12,000"), Some(12_000.0));
        assert_eq!(extract_numeric_value("Not specified"), None);
    }

    #[test]
    fn month_words_are_not_million_suffixes() {
        assert_eq!(extract_numeric_value("payable within 10 months"), Some(10.0));
    }

    #[test]
    fn codes_beat_symbols() {
        assert_eq!(detect_currency("$500 (CAD)"), Some("CAD"));
        assert_eq!(detect_currency("€1,000"), Some("EUR"));
        assert_eq!(detect_currency("£20"), Some("GBP"));
        assert_eq!(detect_currency("HK$ 3,000"), Some("HKD"));
        assert_eq!(detect_currency("twelve apples"), None);
        assert_eq!(currency_or_default("twelve apples"), "USD");
    }
}
