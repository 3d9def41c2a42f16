use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A document-wide finding: a required clause type is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalFlag {
    pub name: String,
    pub severity: u32,
    pub description: String,
}

impl GlobalFlag {
    /// >= 20 HIGH, >= 10 MEDIUM, otherwise LOW
    pub fn severity_label(&self) -> &'static str {
        if self.severity >= 20 {
            "HIGH"
        } else if self.severity >= 10 {
            "MEDIUM"
        } else {
            "LOW"
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GlobalRule {
    pub name: &'static str,
    pub required_pattern: &'static str,
    pub severity: u32,
    pub description: &'static str,
}

pub const GLOBAL_RULES: &[GlobalRule] = &[
    GlobalRule {
        name: "Missing Indemnification Clause",
        required_pattern: r"indemnif",
        severity: 20,
        description: "No indemnification language found.",
    },
    GlobalRule {
        name: "Missing Governing Law Clause",
        required_pattern: r"governing\s+law|governed\s+by\s+(?:the\s+)?laws?\s+of",
        severity: 15,
        description: "No 'Governing Law' clause detected.",
    },
    GlobalRule {
        name: "Missing Termination Clause",
        required_pattern: r"termination\s+for\s+convenience|termination\s+by\s+either\s+party",
        severity: 15,
        description: "No clear termination-for-convenience clause found.",
    },
];

fn compiled() -> &'static [(GlobalRule, Regex)] {
    static COMPILED: OnceLock<Vec<(GlobalRule, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        GLOBAL_RULES
            .iter()
            .map(|r| {
                let re = Regex::new(&format!("(?i){}", r.required_pattern))
                    .expect("static global rule pattern must compile");
                (*r, re)
            })
            .collect()
    })
}

/// Flags every required clause type absent from `text`, in rule declaration order.
pub fn check_required_clauses(text: &str) -> Vec<GlobalFlag> {
    compiled()
        .iter()
        .filter(|(_, re)| !re.is_match(text))
        .map(|(rule, _)| GlobalFlag {
            name: rule.name.to_string(),
            severity: rule.severity,
            description: rule.description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_text_emits_all_flags_in_order() {
        let flags = check_required_clauses("The parties agree to cooperate.");
        let names: Vec<_> = flags.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Missing Indemnification Clause",
                "Missing Governing Law Clause",
                "Missing Termination Clause",
            ]
        );
        assert_eq!(flags.iter().map(|f| f.severity).sum::<u32>(), 50);
    }

    #[test]
    fn presence_anywhere_suppresses_flag() {
        let text = "7. INDEMNIFICATION. Supplier shall indemnify Buyer.\n\
                    12. Governing Law. This Agreement is governed by Delaware law.\n\
                    14. Termination for convenience on 90 days notice.";
        assert!(check_required_clauses(text).is_empty());
    }

    #[test]
    fn labels_follow_severity() {
        let flags = check_required_clauses("");
        assert_eq!(flags[0].severity_label(), "HIGH");
        assert_eq!(flags[1].severity_label(), "MEDIUM");
    }
}
