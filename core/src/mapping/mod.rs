//! Clause-to-region mapping.
//!
//! Three sources, first non-empty wins: the model's explicit clause mapping, recognized section
//! names in the document text, then the highest-scoring risks. Every entry carries a
//! percentage-based advisory region for highlighters that cannot find the clause text itself.

pub mod highlight;

use crate::config::MappingConfig;
use crate::model::{ClauseRiskMapEntry, Region, RiskItem};
use crate::reconcile::analytics::distribution_bucket;
use crate::reconcile::fields;
use crate::reconcile::structure::{page_of, KNOWN_SECTIONS};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MapSource {
    AI_PAYLOAD,
    DOCUMENT_SECTIONS,
    TOP_RISKS,
}

const RISK_LEVELS: &[&str] = &["critical", "high", "medium", "low"];

pub fn advisory_region(slot: usize, step: f64) -> Region {
    Region {
        top: (10.0 + slot as f64 * step).min(90.0),
        left: 5.0,
        width: 90.0,
        height: 8.0,
    }
}

fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}

fn payload_page(raw: &Value) -> u32 {
    match raw.get("page").or_else(|| raw.get("pageNumber")) {
        Some(Value::Number(n)) => n.as_f64().filter(|p| *p >= 1.0).map(|p| p as u32).unwrap_or(1),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(1),
        _ => 1,
    }
}

fn normalized_level(level: Option<String>) -> String {
    level
        .map(|l| l.trim().to_lowercase())
        .filter(|l| RISK_LEVELS.contains(&l.as_str()))
        .unwrap_or_else(|| "medium".to_string())
}

pub fn map_from_payload(raw: &[Value], total_pages: u32) -> Vec<ClauseRiskMapEntry> {
    raw.iter()
        .filter_map(|c| {
            let clause = fields::text(c, "clause")?;
            if clause.chars().count() <= 3 {
                return None;
            }
            Some((c, clause))
        })
        .enumerate()
        .map(|(i, (c, clause))| ClauseRiskMapEntry {
            risk_level: normalized_level(
                fields::text(c, "risk_level").or_else(|| fields::text(c, "riskLevel")),
            ),
            page: clamp_page(payload_page(c), total_pages),
            position: advisory_region(i, 15.0),
            description: fields::text(c, "description")
                .unwrap_or_else(|| format!("Risk identified in: {}", clause)),
            clause,
        })
        .collect()
}

/// One entry per recognized section name present in the text, placed on the page where the
/// name first occurs.
pub fn map_from_sections(document_text: &str, total_pages: u32) -> Vec<ClauseRiskMapEntry> {
    let lower = document_text.to_lowercase();
    KNOWN_SECTIONS
        .iter()
        .enumerate()
        .filter_map(|(i, (name, _, level))| {
            let byte = lower.find(&name.to_lowercase())?;
            let char_offset = lower[..byte].chars().count();
            Some(ClauseRiskMapEntry {
                clause: format!("Section: {}", name),
                risk_level: level.to_string(),
                page: page_of(document_text, char_offset, total_pages),
                position: advisory_region(i, 12.0),
                description: format!("Contract section: {}", name),
            })
        })
        .collect()
}

/// Highest-scoring risks first (ties keep payload order); page assigned round-robin.
pub fn map_from_risks(risks: &[RiskItem], total_pages: u32, max_regions: usize) -> Vec<ClauseRiskMapEntry> {
    let mut ranked: Vec<&RiskItem> = risks.iter().collect();
    ranked.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    ranked
        .into_iter()
        .take(max_regions)
        .enumerate()
        .map(|(i, r)| {
            let short: String = r.title.chars().take(50).collect();
            ClauseRiskMapEntry {
                clause: format!("Risk Area {}: {}", i + 1, short),
                risk_level: distribution_bucket(r).to_string(),
                page: clamp_page(i as u32 + 1, total_pages),
                position: advisory_region(i, 15.0),
                description: format!("Risk area: {}", r.title),
            }
        })
        .collect()
}

pub fn build_clause_map(
    payload_mapping: &[Value],
    document_text: &str,
    risks: &[RiskItem],
    total_pages: u32,
    cfg: &MappingConfig,
) -> (Vec<ClauseRiskMapEntry>, Option<MapSource>) {
    let from_payload = map_from_payload(payload_mapping, total_pages);
    let (entries, source) = if !from_payload.is_empty() {
        (from_payload, MapSource::AI_PAYLOAD)
    } else {
        let from_sections = map_from_sections(document_text, total_pages);
        if !from_sections.is_empty() {
            (from_sections, MapSource::DOCUMENT_SECTIONS)
        } else {
            (map_from_risks(risks, total_pages, cfg.max_risk_regions), MapSource::TOP_RISKS)
        }
    };
    if !entries.is_empty() {
        tracing::debug!(?source, entries = entries.len(), "clause map built");
        return (entries, Some(source));
    }
    (Vec::new(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn risk(title: &str, score: u32) -> RiskItem {
        RiskItem {
            id: "risk".to_string(),
            category: "Legal".to_string(),
            title: title.to_string(),
            description: String::new(),
            impact: "Medium".to_string(),
            likelihood: "Medium".to_string(),
            risk_score: score,
            urgency: String::new(),
            mitigation: String::new(),
            recommendations: vec![],
            mitigation_strategies: vec![],
        }
    }

    #[test]
    fn explicit_mapping_wins() {
        let payload = vec![
            json!({"clause": "Section 3.1 Payment Terms", "risk_level": "HIGH", "page": "9", "description": "Net 90"}),
            json!({"clause": "x", "risk_level": "low", "page": 1}),
            json!({"clause": "Automatic Renewal Clause", "risk_level": "severe", "page": 2}),
        ];
        let (map, source) = build_clause_map(&payload, "Payment Terms", &[], 4, &MappingConfig::default());
        assert_eq!(source, Some(MapSource::AI_PAYLOAD));
        assert_eq!(map.len(), 2);
        assert_eq!(map[0].risk_level, "high");
        assert_eq!(map[0].page, 4);
        assert_eq!(map[1].risk_level, "medium");
        assert_eq!(map[1].description, "Risk identified in: Automatic Renewal Clause");
        assert_eq!(map[1].position.top, 25.0);
    }

    #[test]
    fn sections_before_risks() {
        let text = "Definitions apply.\x0cPayment Terms are net 30.\x0cTermination on notice.";
        let (map, source) = build_clause_map(&[], text, &[risk("Renewal", 80)], 3, &MappingConfig::default());
        assert_eq!(source, Some(MapSource::DOCUMENT_SECTIONS));
        let clauses: Vec<_> = map.iter().map(|e| (e.clause.as_str(), e.page)).collect();
        assert_eq!(
            clauses,
            vec![
                ("Section: Definitions", 1),
                ("Section: Payment Terms", 2),
                ("Section: Termination", 3)
            ]
        );
        assert_eq!(map[1].risk_level, "high");
    }

    #[test]
    fn risks_round_robin_pages() {
        let risks: Vec<_> = (0..7).map(|i| risk(&format!("Risk number {}", i), 30 + i * 5)).collect();
        let (map, source) = build_clause_map(&[], "nothing recognizable", &risks, 2, &MappingConfig::default());
        assert_eq!(source, Some(MapSource::TOP_RISKS));
        assert_eq!(map.len(), 5);
        assert_eq!(map[0].clause, "Risk Area 1: Risk number 6");
        let pages: Vec<_> = map.iter().map(|e| e.page).collect();
        assert_eq!(pages, vec![1, 2, 2, 2, 2]);
    }

    #[test]
    fn empty_everywhere() {
        let (map, source) = build_clause_map(&[], "", &[], 1, &MappingConfig::default());
        assert!(map.is_empty());
        assert_eq!(source, None);
    }
}
