use crate::model::{is_not_specified, Address, NOT_SPECIFIED};
use regex::Regex;
use std::sync::OnceLock;

const KNOWN_COUNTRIES: &[&str] = &[
    "USA", "United States", "Canada", "UK", "United Kingdom", "Hong Kong", "Singapore",
    "Australia", "Germany", "France", "Japan", "China", "India", "Vanuatu", "Switzerland",
    "Netherlands", "Belgium", "Italy", "Spain", "Ireland", "Mexico", "Brazil",
];

fn postal_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"\b\d{5}(?:-\d{4})?\b|\b[A-Z]\d[A-Z]\s?\d[A-Z]\d\b|\b[A-Z]{1,2}\d[A-Z\d]?\s\d[A-Z]{2}\b")
            .expect("postal code regex")
    })
}

fn looks_like_country(part: &str) -> bool {
    let lower = part.to_lowercase();
    KNOWN_COUNTRIES.iter().any(|c| {
        let c = c.to_lowercase();
        // short codes must match a whole word
        if c.len() <= 3 {
            lower.split(|ch: char| !ch.is_alphanumeric()).any(|w| w == c)
        } else {
            lower.contains(&c)
        }
    })
}

/// Comma-separated free-text address: street, city, [state,] [country]; postal code by pattern.
pub fn parse_address(text: &str) -> Address {
    let mut address = Address::default();
    if is_not_specified(text) || text.trim().eq_ignore_ascii_case("address not specified") {
        return address;
    }
    let parts: Vec<&str> = text.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();

    if let Some(street) = parts.first() {
        address.street = street.to_string();
    }
    if parts.len() >= 2 {
        address.city = parts[1].to_string();
    }
    if parts.len() >= 3 {
        let last = parts[parts.len() - 1];
        if looks_like_country(last) {
            address.country = last.to_string();
            if parts.len() >= 4 {
                address.state = parts[parts.len() - 2].to_string();
            }
        } else {
            address.state = last.to_string();
            if parts.len() >= 4 {
                address.country = NOT_SPECIFIED.to_string();
            }
        }
    }
    if let Some(m) = parts.iter().find_map(|p| postal_regex().find(p)) {
        address.postal_code = m.as_str().to_string();
    }
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_us_address() {
        let a = parse_address("100 Harbor Blvd, Oakland, CA 94607, USA");
        assert_eq!(a.street, "100 Harbor Blvd");
        assert_eq!(a.city, "Oakland");
        assert_eq!(a.state, "CA 94607");
        assert_eq!(a.country, "USA");
        assert_eq!(a.postal_code, "94607");
    }

    #[test]
    fn three_parts_without_country_is_state() {
        let a = parse_address("9 King St, Toronto, Ontario M5V 1J5");
        assert_eq!(a.state, "Ontario M5V 1J5");
        assert_eq!(a.country, "");
        assert_eq!(a.postal_code, "M5V 1J5");
    }

    #[test]
    fn short_country_codes_need_whole_words() {
        // "Duke" contains "uk" only as a substring
        let a = parse_address("1 Main, Springfield, Duke");
        assert_eq!(a.state, "Duke");
    }

    #[test]
    fn sentinel_is_empty_address() {
        assert_eq!(parse_address("Not specified"), Address::default());
    }
}
