use regex::Regex;
use std::sync::OnceLock;

fn number_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(\d[\d,]*(?:\.\d+)?)").expect("quantity regex"))
}

/// First comma-grouped number in the text.
pub fn first_quantity(text: &str) -> Option<f64> {
    let c = number_regex().captures(text)?;
    c[1].replace(',', "").parse().ok()
}

/// Unit vocabulary, tried in order. Sized units keep their leading amount ("150gm").
fn unit_patterns() -> &'static [Regex] {
    static P: OnceLock<Vec<Regex>> = OnceLock::new();
    P.get_or_init(|| {
        [
            r"(?i)\b(\d+(?:\.\d+)?\s?(?:gm|g|grams?))\b",
            r"(?i)\b(\d+(?:\.\d+)?\s?(?:ml|milliliters?|millilitres?))\b",
            r"(?i)\b(\d+(?:\.\d+)?\s?(?:kg|kilograms?))\b",
            r"(?i)\b(\d+(?:\.\d+)?\s?(?:lbs?|pounds?))\b",
            r"(?i)\b(units?|pieces?|items?|hours?|days?|boxes|cases?|licen[cs]es?|seats?)\b",
        ]
        .into_iter()
        .map(|p| Regex::new(p).expect("static unit pattern"))
        .collect()
    })
}

pub fn infer_unit(text: &str) -> Option<String> {
    unit_patterns()
        .iter()
        .find_map(|re| re.captures(text).map(|c| c[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_number_wins() {
        assert_eq!(first_quantity("15,000 bottles of 150gm"), Some(15_000.0));
        assert_eq!(first_quantity("2.5 tonnes"), Some(2.5));
        assert_eq!(first_quantity("as required"), None);
    }

    #[test]
    fn sized_units_come_first() {
        assert_eq!(infer_unit("15000 jars, 150gm units").as_deref(), Some("150gm"));
        assert_eq!(infer_unit("500 ml bottles").as_deref(), Some("500 ml"));
        assert_eq!(infer_unit("40 hours of support").as_deref(), Some("hours"));
        assert_eq!(infer_unit("a lot"), None);
    }
}
