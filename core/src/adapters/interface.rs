use crate::config::AiConfig;
use crate::error::{CoreError, CoreResult};
use crate::mapping::highlight::Rgb;
use crate::model::Region;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Substituted for model output whenever the generative collaborator fails.
pub const AI_UNAVAILABLE_MARKER: &str = "[AI ANALYSIS UNAVAILABLE]";
const UNAVAILABLE_PREFIX: &str = "[AI ANALYSIS UNAVAILABLE";

/// Lines containing any of these are conversational filler, not analysis.
const BOILERPLATE_PHRASES: &[&str] = &[
    "okay",
    "here's",
    "this excerpt",
    "clause by clause",
    "please note",
    "it is important",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: u32,
    /// Extracted text was below the OCR threshold. A hint for the caller, not an error.
    pub needs_ocr: bool,
}

pub trait TextSource {
    fn extract(&self, path: &Path) -> CoreResult<ExtractedText>;
}

pub trait GenerativeModel {
    fn generate(&self, prompt: &str, cfg: &AiConfig) -> CoreResult<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HighlightTarget {
    TextSpan(String),
    Region(Region),
}

pub trait Highlighter {
    /// Returns the number of annotations added (0 when a text span is not found on the page).
    fn add_highlight(
        &mut self,
        page: u32,
        target: &HighlightTarget,
        color: Rgb,
        opacity: f32,
        note: &str,
    ) -> CoreResult<usize>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorFailure {
    pub code: String,
    pub message: String,
    pub retryable: bool,
    pub category: String, // AUTH|TIMEOUT|MODEL_NOT_FOUND|EMPTY_RESPONSE|RUNTIME_ERROR
}

pub fn classify_collaborator_error(err: &str) -> CollaboratorFailure {
    let lower = err.to_lowercase();
    let (category, code, retryable) = if lower.contains("api key") || err.contains("API_KEY_INVALID") {
        ("AUTH", "AI_KEY_INVALID", false)
    } else if lower.contains("timeout") || lower.contains("timed out") {
        ("TIMEOUT", "AI_TIMEOUT", true)
    } else if lower.contains("not found") {
        ("MODEL_NOT_FOUND", "MODEL_NOT_FOUND", false)
    } else if lower.contains("empty") {
        ("EMPTY_RESPONSE", "AI_EMPTY_RESPONSE", true)
    } else {
        ("RUNTIME_ERROR", "RUNTIME_ERROR", false)
    };
    CollaboratorFailure {
        code: code.to_string(),
        message: err.to_string(),
        retryable,
        category: category.to_string(),
    }
}

pub fn is_unavailable(text: &str) -> bool {
    text.trim_start().starts_with(UNAVAILABLE_PREFIX)
}

/// Calls the model once. Any failure, or an empty response, becomes the unavailable marker.
pub fn generate_or_marker(model: &dyn GenerativeModel, prompt: &str, cfg: &AiConfig) -> String {
    let result = model.generate(prompt, cfg).and_then(|text| {
        if text.trim().is_empty() {
            Err(CoreError::CollaboratorUnavailable("empty response".to_string()))
        } else {
            Ok(text)
        }
    });
    match result {
        Ok(text) => text,
        Err(e) => {
            let failure = classify_collaborator_error(&e.to_string());
            tracing::warn!(
                code = %failure.code,
                category = %failure.category,
                retryable = failure.retryable,
                "generative model unavailable: {}",
                failure.message
            );
            AI_UNAVAILABLE_MARKER.to_string()
        }
    }
}

/// Drops conversational filler lines from free-text model output.
pub fn clean_ai_text(text: &str) -> String {
    text.trim()
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            !BOILERPLATE_PHRASES.iter().any(|p| lower.contains(p))
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing(&'static str);

    impl GenerativeModel for Failing {
        fn generate(&self, _prompt: &str, _cfg: &AiConfig) -> CoreResult<String> {
            Err(CoreError::CollaboratorUnavailable(self.0.to_string()))
        }
    }

    struct Echo(&'static str);

    impl GenerativeModel for Echo {
        fn generate(&self, _prompt: &str, _cfg: &AiConfig) -> CoreResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn failures_become_the_marker() {
        let cfg = AiConfig::default();
        assert_eq!(generate_or_marker(&Failing("API key expired"), "p", &cfg), AI_UNAVAILABLE_MARKER);
        assert_eq!(generate_or_marker(&Echo("   "), "p", &cfg), AI_UNAVAILABLE_MARKER);
        assert_eq!(generate_or_marker(&Echo("{\"a\":1}"), "p", &cfg), "{\"a\":1}");
    }

    #[test]
    fn marker_variants_are_recognized() {
        assert!(is_unavailable(AI_UNAVAILABLE_MARKER));
        assert!(is_unavailable("[AI ANALYSIS UNAVAILABLE - No API key]"));
        assert!(!is_unavailable("{\"parties\": []}"));
    }

    #[test]
    fn classification() {
        assert_eq!(classify_collaborator_error("API_KEY_INVALID").category, "AUTH");
        let t = classify_collaborator_error("request timed out");
        assert_eq!(t.category, "TIMEOUT");
        assert!(t.retryable);
        assert_eq!(classify_collaborator_error("boom").code, "RUNTIME_ERROR");
    }

    #[test]
    fn filler_lines_are_dropped() {
        let raw = "Okay, here is the summary.\nParties: Northwind Inc.\nPlease note this is not advice.\nTakeaway: low risk";
        assert_eq!(clean_ai_text(raw), "Parties: Northwind Inc.\nTakeaway: low risk");
    }
}
