use crate::adapters::interface::{HighlightTarget, Highlighter};
use crate::config::MappingConfig;
use crate::error::CoreResult;
use crate::model::{ClauseRiskMapEntry, ContractData, Party, Region, RiskItem};
use crate::reconcile::analytics::distribution_bucket;
use serde::{Deserialize, Serialize};

/// RGB components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

pub fn risk_color(level: &str) -> Rgb {
    match level.to_lowercase().as_str() {
        "high" => Rgb(0.937, 0.267, 0.267),
        "medium" => Rgb(0.961, 0.620, 0.043),
        "low" => Rgb(0.133, 0.773, 0.369),
        "critical" => Rgb(0.800, 0.000, 0.000),
        "warning" => Rgb(1.000, 0.647, 0.000),
        "info" => Rgb(0.000, 0.500, 1.000),
        _ => Rgb(0.612, 0.639, 0.686),
    }
}

/// Title keyword → phrases worth marking in the document.
const RISK_KEY_PHRASES: &[(&str, &[&str])] = &[
    ("automatic renewal", &["automatic renewal", "automatically renew"]),
    ("exclusive", &["exclusive", "sole and exclusive"]),
    ("termination", &["termination", "terminate"]),
    ("intellectual property", &["intellectual property", "IP"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRequest {
    /// `None` searches every page.
    pub page: Option<u32>,
    /// Tried in order; the first one found on the page is used.
    pub candidates: Vec<String>,
    /// Used only when no candidate is found.
    pub fallback_region: Option<Region>,
    pub level: String,
    pub opacity: f32,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSummary {
    pub requests: usize,
    pub annotations: usize,
    pub span_hits: usize,
    pub region_fallbacks: usize,
    pub unmatched: usize,
}

pub fn clause_candidates(clause: &str) -> Vec<String> {
    let c = clause.trim();
    vec![
        c.to_string(),
        format!("Clause {}", c),
        format!("Section {}", c),
        format!("{}.", c),
        format!("Article {}", c),
    ]
}

pub fn clause_requests(map: &[ClauseRiskMapEntry], cfg: &MappingConfig) -> Vec<HighlightRequest> {
    map.iter()
        .map(|e| {
            let mut note = format!("Clause: {}\nRisk Level: {}", e.clause, e.risk_level.to_uppercase());
            if !e.description.is_empty() {
                note.push('\n');
                note.push_str(&e.description);
            }
            HighlightRequest {
                page: Some(e.page),
                candidates: clause_candidates(&e.clause),
                fallback_region: Some(e.position),
                level: e.risk_level.clone(),
                opacity: cfg.clause_highlight_opacity,
                note,
            }
        })
        .collect()
}

pub fn risk_phrase_requests(risks: &[RiskItem], cfg: &MappingConfig) -> Vec<HighlightRequest> {
    let mut out = Vec::new();
    for r in risks {
        let title = r.title.to_lowercase();
        let desc: String = r.description.chars().take(100).collect();
        for (keyword, phrases) in RISK_KEY_PHRASES {
            if !title.contains(keyword) {
                continue;
            }
            for phrase in phrases.iter() {
                out.push(HighlightRequest {
                    page: None,
                    candidates: vec![phrase.to_string()],
                    fallback_region: None,
                    level: distribution_bucket(r).to_string(),
                    opacity: cfg.text_highlight_opacity,
                    note: format!("{}: {}...", r.title, desc),
                });
            }
        }
    }
    out
}

pub fn party_requests(parties: &[Party], cfg: &MappingConfig) -> Vec<HighlightRequest> {
    parties
        .iter()
        .filter(|p| p.name.chars().count() > 5)
        .map(|p| HighlightRequest {
            page: None,
            candidates: vec![p.name.clone()],
            fallback_region: None,
            level: "info".to_string(),
            opacity: cfg.text_highlight_opacity,
            note: format!("Contract Party: {}", p.role),
        })
        .collect()
}

/// Clause regions first, then risk phrases, then party names.
pub fn build_highlight_requests(contract: &ContractData, cfg: &MappingConfig) -> Vec<HighlightRequest> {
    let mut out = clause_requests(&contract.clause_risk_map, cfg);
    out.extend(risk_phrase_requests(&contract.risks, cfg));
    out.extend(party_requests(&contract.contract_info.parties, cfg));
    out
}

fn apply_one(
    h: &mut dyn Highlighter,
    req: &HighlightRequest,
    page: u32,
    summary: &mut HighlightSummary,
) -> CoreResult<usize> {
    let color = risk_color(&req.level);
    for candidate in &req.candidates {
        let target = HighlightTarget::TextSpan(candidate.clone());
        let added = h.add_highlight(page, &target, color, req.opacity, &req.note)?;
        if added > 0 {
            summary.span_hits += 1;
            return Ok(added);
        }
    }
    if let Some(region) = req.fallback_region {
        let added = h.add_highlight(page, &HighlightTarget::Region(region), color, req.opacity, &req.note)?;
        if added > 0 {
            summary.region_fallbacks += 1;
        }
        return Ok(added);
    }
    Ok(0)
}

pub fn apply_highlights(
    h: &mut dyn Highlighter,
    requests: &[HighlightRequest],
    total_pages: u32,
) -> CoreResult<HighlightSummary> {
    let total_pages = total_pages.max(1);
    let mut summary = HighlightSummary {
        requests: requests.len(),
        ..Default::default()
    };
    for req in requests {
        let added = match req.page {
            Some(p) if p >= 1 && p <= total_pages => apply_one(h, req, p, &mut summary)?,
            Some(p) => {
                tracing::debug!(page = p, total_pages, "highlight page out of range skipped");
                0
            }
            None => {
                let mut n = 0;
                for p in 1..=total_pages {
                    n += apply_one(h, req, p, &mut summary)?;
                }
                n
            }
        };
        if added == 0 {
            summary.unmatched += 1;
        }
        summary.annotations += added;
    }
    tracing::info!(
        annotations = summary.annotations,
        region_fallbacks = summary.region_fallbacks,
        unmatched = summary.unmatched,
        "highlights applied"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::page_highlighter::PageTextHighlighter;
    use crate::mapping::advisory_region;
    use crate::model::{Address, ClauseRiskMapEntry};

    fn entry(clause: &str, page: u32) -> ClauseRiskMapEntry {
        ClauseRiskMapEntry {
            clause: clause.to_string(),
            risk_level: "high".to_string(),
            page,
            position: advisory_region(0, 15.0),
            description: "Net 90 payment".to_string(),
        }
    }

    #[test]
    fn colors() {
        assert_eq!(risk_color("HIGH"), Rgb(0.937, 0.267, 0.267));
        assert_eq!(risk_color("info"), Rgb(0.0, 0.5, 1.0));
        assert_eq!(risk_color("unknown"), Rgb(0.612, 0.639, 0.686));
    }

    #[test]
    fn clause_spans_before_region() {
        let doc = "Intro\x0cSection 3.1 Payment is due in 90 days.";
        let mut h = PageTextHighlighter::new(doc);
        let cfg = MappingConfig::default();
        let reqs = clause_requests(&[entry("Section 3.1", 2), entry("Schedule Z", 1)], &cfg);
        let summary = apply_highlights(&mut h, &reqs, 2).unwrap();
        assert_eq!(summary.span_hits, 1);
        assert_eq!(summary.region_fallbacks, 1);
        assert_eq!(summary.annotations, 2);
        assert!(matches!(h.annotations[0].target, HighlightTarget::TextSpan(ref s) if s == "Section 3.1"));
        assert!(matches!(h.annotations[1].target, HighlightTarget::Region(_)));
        assert_eq!(h.annotations[0].opacity, 0.3);
    }

    #[test]
    fn party_names_search_every_page() {
        let doc = "Northwind Traders Inc. agrees\x0cNorthwind Traders Inc. signs";
        let mut h = PageTextHighlighter::new(doc);
        let party = Party {
            id: "party_1".to_string(),
            name: "Northwind Traders Inc.".to_string(),
            legal_name: "Northwind Traders Inc.".to_string(),
            address: Address::default(),
            role: "Supplier".to_string(),
            entity_type: "Company".to_string(),
            location: String::new(),
        };
        let reqs = party_requests(&[party], &MappingConfig::default());
        let summary = apply_highlights(&mut h, &reqs, 2).unwrap();
        assert_eq!(summary.annotations, 2);
        assert_eq!(h.annotations[0].note, "Contract Party: Supplier");
        assert_eq!(h.annotations[1].color, risk_color("info"));
    }

    #[test]
    fn ip_phrase_needs_a_whole_word() {
        let risk = RiskItem {
            id: "risk_1".to_string(),
            category: "high".to_string(),
            title: "Intellectual Property assignment".to_string(),
            description: "All IP vests in the Buyer".to_string(),
            impact: "High".to_string(),
            likelihood: "Medium".to_string(),
            risk_score: 80,
            urgency: "high".to_string(),
            mitigation: String::new(),
            recommendations: Vec::new(),
            mitigation_strategies: Vec::new(),
        };
        let reqs = risk_phrase_requests(&[risk], &MappingConfig::default());
        let ip = reqs.iter().position(|r| r.candidates == ["IP"]).unwrap();

        let mut h = PageTextHighlighter::new("The relationship covers shipping to the recipient.");
        let summary = apply_highlights(&mut h, &reqs[ip..=ip], 1).unwrap();
        assert_eq!(summary.annotations, 0);
        assert_eq!(summary.unmatched, 1);

        let mut h = PageTextHighlighter::new("Supplier assigns all IP to the Buyer.");
        let summary = apply_highlights(&mut h, &reqs[ip..=ip], 1).unwrap();
        assert_eq!(summary.annotations, 1);
    }

    #[test]
    fn candidate_order() {
        assert_eq!(
            clause_candidates("4.2"),
            vec!["4.2", "Clause 4.2", "Section 4.2", "4.2.", "Article 4.2"]
        );
    }
}
