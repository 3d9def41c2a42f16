use crate::error::{CoreError, CoreResult, EntityClass};
use crate::model::RiskItem;
use crate::reconcile::fields;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;

pub const MIN_RISK_SCORE: u32 = 20;
pub const MAX_RISK_SCORE: u32 = 95;

pub fn urgency_for(score: u32) -> &'static str {
    if score >= 80 {
        "Critical"
    } else if score >= 60 {
        "High"
    } else if score >= 40 {
        "Medium"
    } else {
        "Low"
    }
}

fn ip_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)\bintellectual\s+property\b|\bip\b").expect("ip regex"))
}

fn guidance_for(title: &str) -> (Vec<String>, Vec<String>) {
    let t = title.to_lowercase();
    let (recs, strategies): (Vec<String>, [&str; 3]) = if t.contains("renewal") {
        (
            vec![
                "Set calendar reminders for renewal dates".to_string(),
                "Review contract performance annually".to_string(),
                "Negotiate renewal terms in advance".to_string(),
            ],
            ["Automated renewal tracking", "Performance monitoring", "Strategic planning"],
        )
    } else if t.contains("payment") || t.contains("financial") {
        (
            vec![
                "Implement payment tracking system".to_string(),
                "Establish credit monitoring".to_string(),
                "Consider payment guarantees".to_string(),
            ],
            ["Cash flow management", "Credit assessment", "Financial controls"],
        )
    } else if ip_regex().is_match(title) {
        (
            vec![
                "Conduct IP due diligence".to_string(),
                "Register trademarks/patents".to_string(),
                "Monitor for infringement".to_string(),
            ],
            ["IP portfolio management", "Legal protection", "Monitoring systems"],
        )
    } else if t.contains("termination") {
        (
            vec![
                "Understand termination triggers".to_string(),
                "Maintain compliance records".to_string(),
                "Plan exit strategies".to_string(),
            ],
            ["Compliance monitoring", "Documentation", "Contingency planning"],
        )
    } else {
        (
            vec![
                format!("Monitor {}", t),
                "Regular compliance review".to_string(),
                "Seek legal advice if needed".to_string(),
            ],
            ["Regular monitoring", "Legal consultation", "Risk assessment"],
        )
    };
    (recs, strategies.iter().map(|s| s.to_string()).collect())
}

/// The score must come from the extraction as a JSON number. It is clamped into range,
/// never synthesized.
fn score_of(raw: &Value, title: &str) -> CoreResult<u32> {
    let v = raw
        .get("risk_score")
        .or_else(|| raw.get("riskScore"))
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            CoreError::reconciliation(
                EntityClass::Risks,
                format!("risk '{}' has no numeric risk_score", title),
            )
        })?;
    let clamped = v.round().clamp(MIN_RISK_SCORE as f64, MAX_RISK_SCORE as f64) as u32;
    if clamped as f64 != v.round() {
        warn!(%title, raw = v, clamped, "risk score clamped into range");
    }
    Ok(clamped)
}

pub fn reconcile_risks(raw: &[Value]) -> CoreResult<Vec<RiskItem>> {
    let mut risks = Vec::new();
    for candidate in raw {
        let Some(title) = fields::text(candidate, "risk_title").or_else(|| fields::text(candidate, "title"))
        else {
            warn!("risk entry without a title skipped");
            continue;
        };
        let risk_score = score_of(candidate, &title)?;
        let (recommendations, mitigation_strategies) = guidance_for(&title);
        let level = |key: &str| {
            fields::text(candidate, key)
                .map(|s| fields::title_case(&s))
                .unwrap_or_else(|| "Medium".to_string())
        };
        risks.push(RiskItem {
            id: format!("risk_{}", risks.len() + 1),
            category: level("category"),
            description: fields::text(candidate, "description")
                .unwrap_or_else(|| "Risk identified in contract analysis".to_string()),
            impact: level("impact"),
            likelihood: level("likelihood"),
            risk_score,
            urgency: urgency_for(risk_score).to_string(),
            mitigation: fields::text(candidate, "mitigation")
                .unwrap_or_else(|| format!("Monitor and address {}", title)),
            recommendations,
            mitigation_strategies,
            title,
        });
    }
    if risks.is_empty() {
        return Err(CoreError::reconciliation(EntityClass::Risks, "no risks identified"));
    }
    Ok(risks)
}
