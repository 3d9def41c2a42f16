pub mod global;
pub mod meter;
pub mod rules;
pub mod snippet;

use crate::chunking::{chunk_with_config, Chunk};
use crate::config::{ChunkingConfig, ScannerConfig};
use crate::error::CoreResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use global::{check_required_clauses, GlobalFlag};
pub use meter::{compute_risk_meter, RiskBand, RiskMeter};
pub use rules::{RiskLevel, RuleKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedFlag {
    pub pattern_id: String,
    pub severity_label: RiskLevel,
    pub description: String,
    pub kind: RuleKind,
    /// Byte span of the first match within the chunk text.
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseRiskAssessment {
    pub chunk_index: usize,
    pub risk_level: RiskLevel,
    pub matched_flags: Vec<MatchedFlag>,
    pub loopholes: Vec<String>,
}

/// Evaluate every rule against one chunk's text.
///
/// The level is the maximum matched weight; every match is kept as a flag.
pub fn scan_text(chunk_index: usize, text: &str) -> ClauseRiskAssessment {
    let mut max_weight = 0u8;
    let mut matched_flags = Vec::new();
    let mut loopholes = Vec::new();

    for compiled in rules::compiled_rules() {
        let Some(m) = compiled.regex.find(text) else {
            continue;
        };
        let rule = &compiled.rule;
        max_weight = max_weight.max(rule.weight);
        matched_flags.push(MatchedFlag {
            pattern_id: rule.id.to_string(),
            severity_label: RiskLevel::from_weight(rule.weight),
            description: format!("Matched pattern '{}'", rule.pattern),
            kind: rule.kind,
            span: (m.start(), m.end()),
        });
        if rule.weight <= rules::LOOPHOLE_MAX_WEIGHT {
            loopholes.push(format!("Ambiguous phrasing: '{}'", m.as_str()));
        }
    }

    ClauseRiskAssessment {
        chunk_index,
        risk_level: RiskLevel::from_weight(max_weight),
        matched_flags,
        loopholes,
    }
}

pub fn scan_chunk(chunk: &Chunk) -> ClauseRiskAssessment {
    scan_text(chunk.index, &chunk.text)
}

/// Scan chunks, optionally in parallel. Output is always in chunk order.
pub fn scan_chunks(chunks: &[Chunk], parallel: bool) -> Vec<ClauseRiskAssessment> {
    if parallel {
        chunks.par_iter().map(scan_chunk).collect()
    } else {
        chunks.iter().map(scan_chunk).collect()
    }
}

/// Rule-based result for a whole document, independent of any AI step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub chunks: Vec<Chunk>,
    pub assessments: Vec<ClauseRiskAssessment>,
    pub global_flags: Vec<GlobalFlag>,
    pub risk_meter: RiskMeter,
}

impl ScanReport {
    pub fn level_counts(&self) -> [(RiskLevel, usize); 4] {
        let count = |lvl| self.assessments.iter().filter(|a| a.risk_level == lvl).count();
        [
            (RiskLevel::HIGH, count(RiskLevel::HIGH)),
            (RiskLevel::MEDIUM, count(RiskLevel::MEDIUM)),
            (RiskLevel::LOW, count(RiskLevel::LOW)),
            (RiskLevel::NONE, count(RiskLevel::NONE)),
        ]
    }
}

pub fn scan_document(
    text: &str,
    chunking: &ChunkingConfig,
    scanner: &ScannerConfig,
) -> CoreResult<ScanReport> {
    let chunks = chunk_with_config(text, chunking)?;
    let assessments = scan_chunks(&chunks, scanner.parallel);
    debug_assert!(assessments
        .iter()
        .enumerate()
        .all(|(i, a)| a.chunk_index == i));
    let global_flags = check_required_clauses(text);
    let levels: Vec<RiskLevel> = assessments.iter().map(|a| a.risk_level).collect();
    let risk_meter = compute_risk_meter(&levels, &global_flags);

    for f in &global_flags {
        debug!(name = %f.name, severity = f.severity, "global flag");
    }
    info!(
        chunks = chunks.len(),
        global_flags = global_flags.len(),
        meter = risk_meter.value,
        band = risk_meter.band.as_str(),
        "rule-based scan complete"
    );

    Ok(ScanReport {
        chunks,
        assessments,
        global_flags,
        risk_meter,
    })
}
