use crate::determinism::to_canonical_pretty;
use crate::error::{CoreError, CoreResult};
use crate::model::ClauseRiskMapEntry;
use crate::pipeline::AnalysisReport;
use crate::scanner::snippet::sentence_context;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const ANALYSIS_FILE: &str = "contract_analysis.json";
pub const SUMMARY_FILE: &str = "contract_summary.txt";
pub const CLAUSE_MAP_FILE: &str = "clause_map.csv";
pub const ERROR_FILE: &str = "contract_analysis_error.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorArtifact {
    pub error: bool,
    pub message: String,
    pub details: String,
    pub timestamp: String,
}

impl ErrorArtifact {
    pub fn from_error(err: &CoreError, timestamp: &str) -> Self {
        let message = match err {
            CoreError::Parse(_)
            | CoreError::Reconciliation { .. }
            | CoreError::QualityGateRejection { .. } => "Contract analysis failed quality validation",
            CoreError::CollaboratorUnavailable(_) => "Contract analysis service unavailable",
            _ => "Unexpected error during contract processing",
        };
        Self {
            error: true,
            message: message.to_string(),
            details: format!("{}: {}", err.kind(), err),
            timestamp: timestamp.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub analysis: PathBuf,
    pub summary: PathBuf,
    pub clause_map: PathBuf,
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Plain-text report: headline facts, then the rule-based scan clause by clause.
pub fn render_summary(report: &AnalysisReport) -> String {
    let info = &report.contract.contract_info;
    let scan = &report.scan;
    let mut out = String::new();

    // writeln! into a String cannot fail
    let _ = writeln!(out, "Contract Analysis Summary");
    let _ = writeln!(out, "Title: {}", info.title);
    let _ = writeln!(out, "Type: {}", info.contract_type);
    let _ = writeln!(out, "Effective Date: {}", info.effective_date);
    let _ = writeln!(out, "Total Value: {} {}", format_amount(info.value), info.currency);
    let _ = writeln!(out, "Risk Score: {}", report.contract.analytics.overall_risk_score);
    let _ = writeln!(
        out,
        "Risk Meter: {}/100 ({})",
        scan.risk_meter.value,
        scan.risk_meter.band.as_str()
    );
    let _ = writeln!(out, "Quality Score: {}/100", report.quality.score);
    let counts: Vec<String> = scan
        .level_counts()
        .iter()
        .map(|(level, n)| format!("{} {}", level.as_str(), n))
        .collect();
    let _ = writeln!(out, "Clause Levels: {}", counts.join(", "));

    let _ = writeln!(out, "\nGlobal Flags:");
    if scan.global_flags.is_empty() {
        let _ = writeln!(out, "- none");
    }
    for f in &scan.global_flags {
        let _ = writeln!(out, "- [{}] {}: {}", f.severity_label(), f.name, f.description);
    }

    let _ = writeln!(out, "\nClause Risk Levels:");
    for (chunk, a) in scan.chunks.iter().zip(&scan.assessments) {
        let _ = writeln!(out, "[Clause {}] Risk Level: {}", a.chunk_index + 1, a.risk_level.as_str());
        for flag in &a.matched_flags {
            let _ = writeln!(
                out,
                "  - {}: {} | {}",
                flag.severity_label.as_str(),
                flag.description,
                sentence_context(&chunk.text, flag.span.0, flag.span.1)
            );
        }
        for lp in &a.loopholes {
            let _ = writeln!(out, "  * {}", lp);
        }
        if let Some(s) = report.summaries.clauses.iter().find(|s| s.chunk_index == a.chunk_index) {
            let _ = writeln!(out, "  AI Analysis: {}", s.summary.replace('\n', "\n    "));
        }
    }

    if let Some(full) = &report.summaries.full_summary {
        let _ = writeln!(out, "\nDocument Summary:\n{}", full);
    }
    out
}

pub fn clause_map_csv(entries: &[ClauseRiskMapEntry]) -> CoreResult<String> {
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(["clause", "risk_level", "page", "top", "left", "width", "height", "description"])?;
    for e in entries {
        wtr.write_record(&[
            e.clause.clone(),
            e.risk_level.clone(),
            e.page.to_string(),
            e.position.top.to_string(),
            e.position.left.to_string(),
            e.position.width.to_string(),
            e.position.height.to_string(),
            e.description.clone(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}

/// Success artifacts. Also removes a stale error artifact from an earlier failed run.
pub fn write_artifacts(dir: &Path, report: &AnalysisReport) -> CoreResult<ArtifactPaths> {
    std::fs::create_dir_all(dir)?;
    let paths = ArtifactPaths {
        analysis: dir.join(ANALYSIS_FILE),
        summary: dir.join(SUMMARY_FILE),
        clause_map: dir.join(CLAUSE_MAP_FILE),
    };
    std::fs::write(&paths.analysis, to_canonical_pretty(&report.contract)?)?;
    std::fs::write(&paths.summary, render_summary(report))?;
    std::fs::write(&paths.clause_map, clause_map_csv(&report.contract.clause_risk_map)?)?;
    let stale = dir.join(ERROR_FILE);
    if stale.exists() {
        std::fs::remove_file(stale)?;
    }
    tracing::info!(dir = %dir.display(), "artifacts written");
    Ok(paths)
}

/// A failed document produces only this file.
pub fn write_error_artifact(dir: &Path, err: &CoreError, timestamp: &str) -> CoreResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    for name in [ANALYSIS_FILE, SUMMARY_FILE, CLAUSE_MAP_FILE] {
        let p = dir.join(name);
        if p.exists() {
            std::fs::remove_file(p)?;
        }
    }
    let path = dir.join(ERROR_FILE);
    let artifact = ErrorArtifact::from_error(err, timestamp);
    std::fs::write(&path, serde_json::to_string_pretty(&artifact)?)?;
    tracing::warn!(kind = err.kind(), path = %path.display(), "error artifact written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityClass;
    use crate::mapping::advisory_region;

    #[test]
    fn error_artifact_shape() {
        let err = CoreError::reconciliation(EntityClass::Products, "no products identified");
        let a = ErrorArtifact::from_error(&err, "2024-06-01T00:00:00Z");
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["error"], true);
        assert_eq!(v["message"], "Contract analysis failed quality validation");
        assert!(v["details"].as_str().unwrap().contains("products"));
        assert_eq!(v.as_object().unwrap().len(), 4);
    }

    #[test]
    fn csv_quotes_commas() {
        let entries = vec![ClauseRiskMapEntry {
            clause: "Section 3.1 Payment, Fees".to_string(),
            risk_level: "high".to_string(),
            page: 2,
            position: advisory_region(0, 15.0),
            description: "Net 90".to_string(),
        }];
        let csv = clause_map_csv(&entries).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "clause,risk_level,page,top,left,width,height,description");
        assert_eq!(lines[1], "\"Section 3.1 Payment, Fees\",high,2,10,5,90,8,Net 90");
    }

    #[test]
    fn amounts() {
        assert_eq!(format_amount(2_500_000.0), "2500000");
        assert_eq!(format_amount(12.5), "12.50");
    }
}
