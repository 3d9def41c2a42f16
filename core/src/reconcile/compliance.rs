use crate::model::ComplianceRequirement;
use regex::Regex;
use std::sync::OnceLock;

const REGULATIONS: &[(&str, &str, &str)] = &[
    ("FDA", r"\bFDA\b|Food\s+and\s+Drug\s+Administration", "Food and Drug Administration compliance"),
    ("GDPR", r"\bGDPR\b|General\s+Data\s+Protection\s+Regulation", "General Data Protection Regulation compliance"),
    ("HIPAA", r"\bHIPAA\b", "Health Insurance Portability and Accountability Act compliance"),
    ("SOX", r"\bSOX\b|Sarbanes[-\s]Oxley", "Sarbanes-Oxley compliance"),
    ("ISO", r"\bISO\s*\d*\b", "ISO standard compliance"),
];

fn compiled() -> &'static [(&'static str, Regex, &'static str)] {
    static C: OnceLock<Vec<(&'static str, Regex, &'static str)>> = OnceLock::new();
    C.get_or_init(|| {
        REGULATIONS
            .iter()
            .map(|(name, pat, desc)| {
                (*name, Regex::new(&format!("(?i){}", pat)).expect("regulation pattern"), *desc)
            })
            .collect()
    })
}

/// Only regulations the text actually mentions; empty when there are none.
pub fn detect_compliance(text: &str) -> Vec<ComplianceRequirement> {
    compiled()
        .iter()
        .filter(|(_, re, _)| re.is_match(text))
        .map(|(name, _, desc)| ComplianceRequirement {
            regulation: name.to_string(),
            requirement: desc.to_string(),
            status: "Active".to_string(),
            deadline: "Ongoing".to_string(),
            responsible: "Both parties".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_only_mentioned_regulations() {
        let reqs = detect_compliance("Products shall meet FDA labeling rules and ISO 9001.");
        let names: Vec<_> = reqs.iter().map(|r| r.regulation.as_str()).collect();
        assert_eq!(names, vec!["FDA", "ISO"]);
        assert!(detect_compliance("No regulators mentioned.").is_empty());
    }

    #[test]
    fn abbreviations_need_word_boundaries() {
        // "isolated" must not count as ISO
        assert!(detect_compliance("an isolated incident").is_empty());
    }
}
