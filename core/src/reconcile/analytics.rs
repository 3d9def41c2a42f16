use crate::model::{
    Analytics, ContractComplexity, PerformanceMetrics, RiskDistribution, RiskItem, TimelineEvent,
};
use regex::Regex;
use std::sync::OnceLock;

fn section_ref_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)\b(?:section|clause|article|paragraph)\s+\d+").expect("section ref regex"))
}

fn numbered_item_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"\b\d+\.\d+").expect("numbered item regex"))
}

fn legalese_regex() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?i)\b(?:whereas|therefore|notwithstanding|pursuant|herein|thereof)\b")
            .expect("legalese regex")
    })
}

/// Category when it names a level, otherwise the score band (>= 70 high, >= 40 medium).
pub fn distribution_bucket(risk: &RiskItem) -> &'static str {
    match risk.category.to_lowercase().as_str() {
        "high" | "critical" => "high",
        "medium" => "medium",
        "low" => "low",
        _ if risk.risk_score >= 70 => "high",
        _ if risk.risk_score >= 40 => "medium",
        _ => "low",
    }
}

pub fn estimate_total_clauses(text: &str) -> u32 {
    let section_refs = section_ref_regex().find_iter(text).count();
    let numbered = numbered_item_regex().find_iter(text).count();
    let by_length = text.chars().count() / 800;
    [section_refs * 2, numbered, by_length, 10]
        .into_iter()
        .max()
        .unwrap_or(10)
        .min(100) as u32
}

/// Derived entirely from reconciled records and the document text. `as_of` is `YYYY-MM-DD`.
pub fn compute_analytics(
    risks: &[RiskItem],
    timeline: &[TimelineEvent],
    document_text: &str,
    as_of: &str,
) -> Analytics {
    let mut distribution = RiskDistribution::default();
    for r in risks {
        match distribution_bucket(r) {
            "high" => distribution.high += 1,
            "medium" => distribution.medium += 1,
            _ => distribution.low += 1,
        }
    }

    let overall_risk_score = if risks.is_empty() {
        0
    } else {
        let sum: u32 = risks.iter().map(|r| r.risk_score).sum();
        sum / risks.len() as u32
    };

    let completed = timeline.iter().filter(|e| e.completed).count();
    let completion_rate = (completed * 100 / timeline.len().max(1)) as u32;

    let critical_deadlines = timeline
        .iter()
        .filter(|e| matches!(e.priority.as_str(), "high" | "critical"))
        .filter(|e| !e.completed)
        .filter(|e| crate::normalize::dates::parse_date(&e.date).is_some() && e.date.as_str() > as_of)
        .count() as u32;

    let (h, m, l) = (distribution.high, distribution.medium, distribution.low);
    let text_length = document_text.chars().count();

    Analytics {
        overall_risk_score,
        completion_rate,
        critical_deadlines,
        total_clauses: estimate_total_clauses(document_text),
        risky_clauses: h * 3 + m * 2 + l,
        performance_metrics: PerformanceMetrics {
            compliance_score: 100u32.saturating_sub(h * 20 + m * 8).max(50),
            financial_health: 100u32.saturating_sub(h * 15 + m * 5).max(60),
            operational_risk: (overall_risk_score + h * 8).min(90),
        },
        contract_complexity: ContractComplexity {
            text_length,
            estimated_reading_time: (text_length / 1000).max(5),
            legal_complexity: legalese_regex().find_iter(document_text).count().min(10),
        },
        risk_distribution: distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(category: &str, score: u32) -> RiskItem {
        RiskItem {
            id: "risk".to_string(),
            category: category.to_string(),
            title: "Auto-renewal exposure".to_string(),
            description: String::new(),
            impact: "High".to_string(),
            likelihood: "Medium".to_string(),
            risk_score: score,
            urgency: String::new(),
            mitigation: String::new(),
            recommendations: vec![],
            mitigation_strategies: vec![],
        }
    }

    fn event(date: &str, priority: &str, completed: bool) -> TimelineEvent {
        TimelineEvent {
            id: "event".to_string(),
            date: date.to_string(),
            event: "Delivery".to_string(),
            event_type: "delivery".to_string(),
            responsible_party: String::new(),
            notice_required: false,
            notice_deadline: String::new(),
            priority: priority.to_string(),
            completed,
            consequences: String::new(),
        }
    }

    #[test]
    fn distribution_always_sums_to_risk_count() {
        let risks = vec![risk("High", 90), risk("Legal", 55), risk("Commercial", 25)];
        let a = compute_analytics(&risks, &[], "", "2024-06-01");
        assert_eq!(a.risk_distribution, RiskDistribution { high: 1, medium: 1, low: 1 });
        assert_eq!(a.risk_distribution.total(), 3);
        assert_eq!(a.overall_risk_score, 56);
        assert_eq!(a.risky_clauses, 6);
        assert_eq!(a.performance_metrics.compliance_score, 72);
        assert_eq!(a.performance_metrics.financial_health, 80);
        assert_eq!(a.performance_metrics.operational_risk, 64);
    }

    #[test]
    fn deadlines_relative_to_analysis_date() {
        let timeline = vec![
            event("2024-09-01", "high", false),
            event("2024-01-01", "high", false),
            event("2024-09-01", "medium", false),
            event("2024-02-01", "high", true),
        ];
        let a = compute_analytics(&[], &timeline, "", "2024-06-01");
        assert_eq!(a.critical_deadlines, 1);
        assert_eq!(a.completion_rate, 25);
    }

    #[test]
    fn clause_estimate_is_bounded() {
        assert_eq!(estimate_total_clauses("short"), 10);
        let long = "Section 1 applies. ".repeat(200);
        assert_eq!(estimate_total_clauses(&long), 100);
    }
}
