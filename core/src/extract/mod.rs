//! Soft `contractInfo` fields, one extractor per field.
//!
//! Precedence is fixed for every field: the structured hint from the model payload, then a
//! regex over the raw document text, then an explicit fallback. The fallback is the
//! "Not specified" sentinel (or `false` / `0` for flags and amounts), never a guessed value.

use crate::model::NOT_SPECIFIED;
use crate::normalize::{detect_currency, extract_numeric_value, find_date_in_text, normalize_date};
use crate::reconcile::fields;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldSource {
    STRUCTURED_HINT,
    DOCUMENT_TEXT,
    FALLBACK,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub value: T,
    pub source: FieldSource,
}

/// Everything a field extractor may consult.
pub struct FieldSources<'a> {
    pub basics: &'a Value,
    pub financial: &'a Value,
    pub document_text: &'a str,
}

pub trait TextFieldExtractor {
    type Output;

    fn field(&self) -> &'static str;
    fn from_hint(&self, src: &FieldSources<'_>) -> Option<Self::Output>;
    fn from_text(&self, text: &str) -> Option<Self::Output>;
    fn fallback(&self) -> Self::Output;

    fn extract(&self, src: &FieldSources<'_>) -> Extracted<Self::Output> {
        if let Some(value) = self.from_hint(src) {
            return Extracted { value, source: FieldSource::STRUCTURED_HINT };
        }
        if let Some(value) = self.from_text(src.document_text) {
            return Extracted { value, source: FieldSource::DOCUMENT_TEXT };
        }
        tracing::debug!(field = self.field(), "field not found, using fallback");
        Extracted { value: self.fallback(), source: FieldSource::FALLBACK }
    }
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static field pattern"))
        .collect()
}

fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

pub struct TitleExtractor;

impl TextFieldExtractor for TitleExtractor {
    type Output = String;

    fn field(&self) -> &'static str {
        "title"
    }

    fn from_hint(&self, src: &FieldSources<'_>) -> Option<String> {
        fields::text(src.basics, "title").filter(|t| t.chars().count() > 3)
    }

    /// A heading line near the top that names the instrument.
    fn from_text(&self, text: &str) -> Option<String> {
        head(text, 500)
            .lines()
            .map(str::trim)
            .find(|l| {
                let lower = l.to_lowercase();
                (lower.contains("agreement") || lower.contains("contract")) && l.chars().count() <= 120
            })
            .map(|l| l.trim_end_matches(['.', ':']).to_string())
    }

    fn fallback(&self) -> String {
        NOT_SPECIFIED.to_string()
    }
}

pub struct ContractTypeExtractor;

const TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("Supply Agreement", &["supply", "supplier", "manufacturing"]),
    ("Service Agreement", &["services", "service provider", "consulting"]),
    ("Distribution Agreement", &["distribution", "distributor"]),
    ("Employment Agreement", &["employment", "employee"]),
    ("License Agreement", &["license", "licensing", "licensee"]),
];

impl TextFieldExtractor for ContractTypeExtractor {
    type Output = String;

    fn field(&self) -> &'static str {
        "type"
    }

    fn from_hint(&self, src: &FieldSources<'_>) -> Option<String> {
        fields::text(src.basics, "type")
    }

    fn from_text(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        TYPE_KEYWORDS
            .iter()
            .find(|(_, kws)| kws.iter().any(|k| lower.contains(k)))
            .map(|(t, _)| t.to_string())
    }

    fn fallback(&self) -> String {
        NOT_SPECIFIED.to_string()
    }
}

pub struct EffectiveDateExtractor;

fn effective_date_patterns() -> &'static [Regex] {
    static P: OnceLock<Vec<Regex>> = OnceLock::new();
    P.get_or_init(|| {
        compile(&[
            r"(?i)effective\s+(?:date|from|as\s+of)\s*:?\s*(?:is\s+)?([^\n;()]{6,40}?\d{4})",
            r"(?i)commenc(?:ing|es|e)\s+(?:on\s+)?([^\n;()]{6,40}?\d{4})",
            r"(?i)\bdated\s+(?:as\s+of\s+)?([^\n;()]{6,40}?\d{4})",
        ])
    })
}

impl TextFieldExtractor for EffectiveDateExtractor {
    type Output = String;

    fn field(&self) -> &'static str {
        "effective_date"
    }

    fn from_hint(&self, src: &FieldSources<'_>) -> Option<String> {
        fields::text(src.basics, "effective_date").and_then(|d| normalize_date(&d))
    }

    fn from_text(&self, text: &str) -> Option<String> {
        effective_date_patterns().iter().find_map(|re| {
            re.captures_iter(text)
                .filter_map(|c| c.get(1))
                .find_map(|m| normalize_date(m.as_str()).or_else(|| find_date_in_text(m.as_str())))
        })
    }

    fn fallback(&self) -> String {
        NOT_SPECIFIED.to_string()
    }
}

pub struct GoverningLawExtractor;

fn governing_law_patterns() -> &'static [Regex] {
    static P: OnceLock<Vec<Regex>> = OnceLock::new();
    P.get_or_init(|| {
        compile(&[
            r"(?i)governed\s+by\s+(?:and\s+construed\s+in\s+accordance\s+with\s+)?(?:the\s+)?laws?\s+of\s+(?:the\s+)?([^,\n.;]+)",
            r"(?i)governing\s+law\s*[:.-]?\s*(?:is\s+)?(?:the\s+laws?\s+of\s+)?([^,\n.;]+)",
            r"(?i)subject\s+to\s+([^,\n.;]+?)\s+law",
        ])
    })
}

impl TextFieldExtractor for GoverningLawExtractor {
    type Output = String;

    fn field(&self) -> &'static str {
        "governing_law"
    }

    fn from_hint(&self, src: &FieldSources<'_>) -> Option<String> {
        fields::text(src.basics, "governing_law")
    }

    fn from_text(&self, text: &str) -> Option<String> {
        first_capture(governing_law_patterns(), text)
    }

    fn fallback(&self) -> String {
        NOT_SPECIFIED.to_string()
    }
}

pub struct TerritoryExtractor;

fn territory_patterns() -> &'static [Regex] {
    static P: OnceLock<Vec<Regex>> = OnceLock::new();
    P.get_or_init(|| {
        compile(&[
            r"(?i)\bterritory\s*(?:means|shall\s+mean|:)\s*(?:the\s+)?([^,\n.;]+)",
            r"(?i)geographical?\s+area\s*:?\s*([^,\n.;]+)",
        ])
    })
}

fn normalize_territory(t: &str) -> String {
    let lower = t.to_lowercase();
    if lower.contains("worldwide") || lower.contains("global") {
        "Global".to_string()
    } else {
        t.trim().to_string()
    }
}

impl TextFieldExtractor for TerritoryExtractor {
    type Output = String;

    fn field(&self) -> &'static str {
        "territory"
    }

    fn from_hint(&self, src: &FieldSources<'_>) -> Option<String> {
        fields::text(src.basics, "territory").map(|t| normalize_territory(&t))
    }

    fn from_text(&self, text: &str) -> Option<String> {
        if let Some(t) = first_capture(territory_patterns(), text) {
            return Some(normalize_territory(&t));
        }
        let lower = text.to_lowercase();
        (lower.contains("worldwide") || lower.contains("throughout the world")).then(|| "Global".to_string())
    }

    fn fallback(&self) -> String {
        NOT_SPECIFIED.to_string()
    }
}

pub struct ExclusivityExtractor;

fn exclusivity_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)\bnon[-\s]?exclusive|\bexclusive(?:ly)?\b").expect("exclusivity regex"))
}

impl TextFieldExtractor for ExclusivityExtractor {
    type Output = bool;

    fn field(&self) -> &'static str {
        "exclusivity"
    }

    fn from_hint(&self, src: &FieldSources<'_>) -> Option<bool> {
        fields::boolean(src.basics, "exclusivity").or_else(|| fields::boolean(src.basics, "exclusive"))
    }

    /// The first mention decides; "non-exclusive" reads as false.
    fn from_text(&self, text: &str) -> Option<bool> {
        exclusivity_regex()
            .find(text)
            .map(|m| !m.as_str().to_lowercase().starts_with("non"))
    }

    fn fallback(&self) -> bool {
        false
    }
}

pub struct ContractValueExtractor;

fn value_patterns() -> &'static [Regex] {
    static P: OnceLock<Vec<Regex>> = OnceLock::new();
    P.get_or_init(|| {
        compile(&[
            r"(?i)(?:total\s+)?(?:contract\s+)?(?:value|price|consideration)\s+(?:of\s+|is\s+|shall\s+be\s+)?:?\s*((?:[A-Z]{3}\s*)?[$€£¥₹]?\s?\d[\d,]*(?:\.\d+)?(?:\s*(?:million|thousand|k|m)\b)?)",
            r"([$€£¥₹]\s?\d[\d,]*(?:\.\d+)?(?:\s*(?:million|thousand|k|m)\b)?)",
        ])
    })
}

impl TextFieldExtractor for ContractValueExtractor {
    type Output = f64;

    fn field(&self) -> &'static str {
        "contract_value"
    }

    fn from_hint(&self, src: &FieldSources<'_>) -> Option<f64> {
        fields::text(src.basics, "contract_value")
            .or_else(|| fields::text(src.financial, "total_value"))
            .and_then(|t| extract_numeric_value(&t))
            .filter(|v| *v > 0.0)
    }

    fn from_text(&self, text: &str) -> Option<f64> {
        first_capture(value_patterns(), text)
            .and_then(|t| extract_numeric_value(&t))
            .filter(|v| *v > 0.0)
    }

    fn fallback(&self) -> f64 {
        0.0
    }
}

pub struct CurrencyExtractor;

impl TextFieldExtractor for CurrencyExtractor {
    type Output = String;

    fn field(&self) -> &'static str {
        "currency"
    }

    fn from_hint(&self, src: &FieldSources<'_>) -> Option<String> {
        let hinted = |obj: &Value, key: &str| fields::text(obj, key).and_then(|t| detect_currency(&t));
        hinted(src.financial, "currency")
            .or_else(|| hinted(src.basics, "contract_value"))
            .or_else(|| hinted(src.financial, "total_value"))
            .map(str::to_string)
    }

    fn from_text(&self, text: &str) -> Option<String> {
        detect_currency(text).map(str::to_string)
    }

    /// No signal anywhere: USD.
    fn fallback(&self) -> String {
        crate::normalize::money::DEFAULT_CURRENCY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOC: &str = "MASTER SUPPLY AGREEMENT\n\
        This Agreement is dated March 3, 2024 between Northwind Traders Inc. and Baumann GmbH.\n\
        1. Territory: the United States and Canada.\n\
        2. Supplier grants Buyer an exclusive right of resale.\n\
        3. The total contract value is $2.5 million.\n\
        12. This Agreement shall be governed by the laws of the State of New York.";

    fn sources<'a>(basics: &'a Value, financial: &'a Value) -> FieldSources<'a> {
        FieldSources { basics, financial, document_text: DOC }
    }

    #[test]
    fn hints_win_over_text() {
        let basics = json!({"title": "Distribution Deal", "governing_law": "Ontario"});
        let fin = json!({});
        let src = sources(&basics, &fin);
        let t = TitleExtractor.extract(&src);
        assert_eq!(t.value, "Distribution Deal");
        assert_eq!(t.source, FieldSource::STRUCTURED_HINT);
        assert_eq!(GoverningLawExtractor.extract(&src).value, "Ontario");
    }

    #[test]
    fn text_fallbacks() {
        let basics = json!({"title": "Not specified"});
        let fin = json!({});
        let src = sources(&basics, &fin);
        assert_eq!(TitleExtractor.extract(&src).value, "MASTER SUPPLY AGREEMENT");
        assert_eq!(ContractTypeExtractor.extract(&src).value, "Supply Agreement");
        assert_eq!(EffectiveDateExtractor.extract(&src).value, "2024-03-03");
        assert_eq!(TerritoryExtractor.extract(&src).value, "United States and Canada");
        assert!(ExclusivityExtractor.extract(&src).value);
        assert_eq!(ContractValueExtractor.extract(&src).value, 2_500_000.0);
        assert_eq!(CurrencyExtractor.extract(&src).value, "USD");
        let law = GoverningLawExtractor.extract(&src);
        assert_eq!(law.value, "State of New York");
        assert_eq!(law.source, FieldSource::DOCUMENT_TEXT);
    }

    #[test]
    fn nothing_found_is_sentinel_not_today() {
        let basics = json!({});
        let fin = json!({});
        let src = FieldSources { basics: &basics, financial: &fin, document_text: "Plain words." };
        let d = EffectiveDateExtractor.extract(&src);
        assert_eq!(d.value, NOT_SPECIFIED);
        assert_eq!(d.source, FieldSource::FALLBACK);
        assert!(!ExclusivityExtractor.extract(&src).value);
        assert_eq!(ContractValueExtractor.extract(&src).value, 0.0);
    }

    #[test]
    fn non_exclusive_reads_false() {
        assert_eq!(ExclusivityExtractor.from_text("a non-exclusive license"), Some(false));
        assert_eq!(TerritoryExtractor.from_text("Territory: worldwide"), Some("Global".to_string()));
    }
}
