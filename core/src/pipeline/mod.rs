use crate::adapters::interface::{clean_ai_text, generate_or_marker, is_unavailable, ExtractedText, GenerativeModel};
use crate::adapters::prompts::{chunk_prompt, extraction_prompt, full_summary_prompt};
use crate::config::PipelineConfig;
use crate::error::CoreResult;
use crate::mapping::highlight::{build_highlight_requests, HighlightRequest};
use crate::mapping::MapSource;
use crate::model::ContractData;
use crate::reconcile::payload::RepairReport;
use crate::reconcile::{reconcile, ReconcileContext};
use crate::scanner::{scan_document, RiskLevel, ScanReport};
use crate::validator::{QualityGate, QualityReport};
use serde::{Deserialize, Serialize};
use tracing::info;

const SUMMARY_CONTEXT_CHARS: usize = 1500;

/// A document as handed over by the text-extraction collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub text: String,
    pub page_count: u32,
    pub file_name: String,
    pub file_size: u64,
    pub needs_ocr: bool,
}

impl SourceDocument {
    pub fn from_extracted(extracted: ExtractedText, file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            text: extracted.text,
            page_count: extracted.page_count,
            file_name: file_name.into(),
            file_size,
            needs_ocr: extracted.needs_ocr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseSummary {
    pub chunk_index: usize,
    pub risk_level: RiskLevel,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummaries {
    /// Only for documents within `full_summary_char_limit`.
    pub full_summary: Option<String>,
    pub clauses: Vec<ClauseSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub contract: ContractData,
    pub scan: ScanReport,
    pub quality: QualityReport,
    pub repair: RepairReport,
    pub map_source: Option<MapSource>,
    pub highlights: Vec<HighlightRequest>,
    pub summaries: DocumentSummaries,
}

pub struct ContractPipeline<M: GenerativeModel> {
    cfg: PipelineConfig,
    model: M,
    gate: QualityGate,
    summaries: bool,
}

impl<M: GenerativeModel> ContractPipeline<M> {
    pub fn new(cfg: PipelineConfig, model: M) -> CoreResult<Self> {
        cfg.validate()?;
        let gate = QualityGate::new(cfg.quality.clone());
        Ok(Self {
            cfg,
            model,
            gate,
            summaries: false,
        })
    }

    /// Also request free-text summaries from the model (one call per chunk plus one overall).
    pub fn with_summaries(mut self, enabled: bool) -> Self {
        self.summaries = enabled;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Rule-based pass only; never calls the model.
    pub fn scan(&self, text: &str) -> CoreResult<ScanReport> {
        scan_document(text, &self.cfg.chunking, &self.cfg.scanner)
    }

    /// Full analysis. Returns the first fatal error; there is no partial report.
    pub fn analyze(&self, doc: &SourceDocument, analysis_date: &str) -> CoreResult<AnalysisReport> {
        if doc.needs_ocr {
            info!(file = %doc.file_name, "document text is short; OCR may be needed upstream");
        }
        let scan = self.scan(&doc.text)?;

        let prompt = extraction_prompt(&doc.text, self.cfg.extraction.prompt_char_limit);
        let raw_ai = generate_or_marker(&self.model, &prompt, &self.cfg.ai);

        let ctx = ReconcileContext {
            document_text: &doc.text,
            total_pages: doc.page_count,
            analysis_date,
            file_name: &doc.file_name,
            file_size: doc.file_size,
        };
        let rec = reconcile(&raw_ai, &ctx, &self.cfg)?;

        let quality = self.gate.evaluate(&rec.contract, &raw_ai, &doc.text);
        self.gate.enforce(&quality)?;

        let highlights = build_highlight_requests(&rec.contract, &self.cfg.mapping);
        let summaries = if self.summaries {
            self.summarize(&doc.text, &scan)
        } else {
            DocumentSummaries::default()
        };

        info!(
            file = %doc.file_name,
            score = quality.score,
            meter = scan.risk_meter.value,
            highlights = highlights.len(),
            "analysis complete"
        );
        Ok(AnalysisReport {
            contract: rec.contract,
            scan,
            quality,
            repair: rec.repair,
            map_source: rec.map_source,
            highlights,
            summaries,
        })
    }

    /// Each chunk prompt carries the previous chunk's summary as context. Failed calls keep the
    /// unavailable marker in place of the summary.
    pub fn summarize(&self, text: &str, scan: &ScanReport) -> DocumentSummaries {
        let full_summary = (text.chars().count() <= self.cfg.extraction.full_summary_char_limit).then(|| {
            let raw = generate_or_marker(&self.model, &full_summary_prompt(text), &self.cfg.ai);
            if is_unavailable(&raw) { raw } else { clean_ai_text(&raw) }
        });

        let mut clauses = Vec::with_capacity(scan.chunks.len());
        let mut context: Option<String> = None;
        for (chunk, assessment) in scan.chunks.iter().zip(&scan.assessments) {
            let raw = generate_or_marker(&self.model, &chunk_prompt(&chunk.text, context.as_deref()), &self.cfg.ai);
            let summary = if is_unavailable(&raw) { raw } else { clean_ai_text(&raw) };
            context = (!is_unavailable(&summary))
                .then(|| summary.chars().take(SUMMARY_CONTEXT_CHARS).collect());
            clauses.push(ClauseSummary {
                chunk_index: chunk.index,
                risk_level: assessment.risk_level,
                summary,
            });
        }
        DocumentSummaries { full_summary, clauses }
    }
}
