use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Ordinal clause risk level. Declaration order is severity order.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    NONE,
    LOW,
    MEDIUM,
    HIGH,
}

impl RiskLevel {
    /// 0 -> NONE, 1 -> LOW, 2..=3 -> MEDIUM, >= 4 -> HIGH
    pub fn from_weight(weight: u8) -> Self {
        match weight {
            0 => RiskLevel::NONE,
            1 => RiskLevel::LOW,
            2 | 3 => RiskLevel::MEDIUM,
            _ => RiskLevel::HIGH,
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            RiskLevel::NONE => 0,
            RiskLevel::LOW => 1,
            RiskLevel::MEDIUM => 3,
            RiskLevel::HIGH => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::NONE => "NONE",
            RiskLevel::LOW => "LOW",
            RiskLevel::MEDIUM => "MEDIUM",
            RiskLevel::HIGH => "HIGH",
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleKind {
    LIABILITY_WAIVER,
    MISSING_PROTECTION,
    ONE_SIDED_DISCRETION,
    MODAL_UNCERTAINTY,
    HEDGE,
}

#[derive(Debug, Clone, Copy)]
pub struct RiskRule {
    pub id: &'static str,
    pub pattern: &'static str,
    pub weight: u8,
    pub kind: RuleKind,
}

/// Weight at or below which a match is also reported as a loophole.
pub const LOOPHOLE_MAX_WEIGHT: u8 = 3;

/// Evaluated top to bottom; flag order in an assessment follows this table.
pub const RISK_RULES: &[RiskRule] = &[
    RiskRule { id: "without_liability", pattern: r"\bwithout\s+liability\b", weight: 5, kind: RuleKind::LIABILITY_WAIVER },
    RiskRule { id: "unlimited_liability", pattern: r"\bunlimited\s+liability\b", weight: 5, kind: RuleKind::LIABILITY_WAIVER },
    RiskRule { id: "no_indemnification", pattern: r"\bno\s+indemnifi\w*", weight: 5, kind: RuleKind::MISSING_PROTECTION },
    RiskRule { id: "no_governing_law", pattern: r"\bno\s+governing\s+law\b", weight: 5, kind: RuleKind::MISSING_PROTECTION },
    RiskRule { id: "no_termination", pattern: r"\bno\s+termination\b", weight: 5, kind: RuleKind::MISSING_PROTECTION },
    RiskRule { id: "terminate_at_will", pattern: r"\bterminat\w*\s+at\s+will\b", weight: 5, kind: RuleKind::ONE_SIDED_DISCRETION },
    RiskRule { id: "sole_discretion", pattern: r"\bsole\s+(?:and\s+absolute\s+)?discretion\b", weight: 3, kind: RuleKind::ONE_SIDED_DISCRETION },
    RiskRule { id: "may", pattern: r"\bmay\b", weight: 3, kind: RuleKind::MODAL_UNCERTAINTY },
    RiskRule { id: "could", pattern: r"\bcould\b", weight: 3, kind: RuleKind::MODAL_UNCERTAINTY },
    RiskRule { id: "reasonable_endeavours", pattern: r"\breasonable\s+endeavou?rs?\b", weight: 3, kind: RuleKind::HEDGE },
    RiskRule { id: "subject_to_review", pattern: r"\bsubject\s+to\s+review\b", weight: 3, kind: RuleKind::HEDGE },
    RiskRule { id: "unless_otherwise_agreed", pattern: r"\bunless\s+otherwise\s+agreed\b", weight: 1, kind: RuleKind::HEDGE },
    RiskRule { id: "best_efforts", pattern: r"\bbest\s+efforts?\b", weight: 1, kind: RuleKind::HEDGE },
];

pub struct CompiledRule {
    pub rule: RiskRule,
    pub regex: Regex,
}

pub fn compiled_rules() -> &'static [CompiledRule] {
    static COMPILED: OnceLock<Vec<CompiledRule>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RISK_RULES
            .iter()
            .map(|rule| CompiledRule {
                rule: *rule,
                regex: Regex::new(&format!("(?i){}", rule.pattern))
                    .expect("static risk rule pattern must compile"),
            })
            .collect()
    })
}
