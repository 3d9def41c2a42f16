use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Explicit pipeline configuration. Nothing in the core reads ambient process state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunking: ChunkingConfig,
    pub scanner: ScannerConfig,
    pub extraction: ExtractionConfig,
    pub quality: QualityConfig,
    pub mapping: MappingConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 6000,
            overlap: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Scan chunks on the rayon pool; results are still reassembled in chunk order.
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extracted text shorter than this (after trimming) is an OCR-fallback hint.
    pub ocr_min_chars: usize,
    pub prompt_char_limit: usize,
    pub full_summary_char_limit: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr_min_chars: 100,
            prompt_char_limit: 25_000,
            full_summary_char_limit: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_score: u32,
    /// Reject on BLOCKER findings even when the weighted score passes.
    pub strict_blockers: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_score: 70,
            strict_blockers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub max_risk_regions: usize,
    pub clause_highlight_opacity: f32,
    pub text_highlight_opacity: f32,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            max_risk_regions: 5,
            clause_highlight_opacity: 0.3,
            text_highlight_opacity: 0.4,
        }
    }
}

/// Passed verbatim to the generative model collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.1,
            max_output_tokens: 16_384,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: PipelineConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.chunking.max_chars == 0 {
            return Err(CoreError::Config("chunking.max_chars must be > 0".to_string()));
        }
        if self.chunking.max_chars <= self.chunking.overlap {
            return Err(CoreError::Config(format!(
                "chunking.max_chars ({}) must exceed chunking.overlap ({})",
                self.chunking.max_chars, self.chunking.overlap
            )));
        }
        if self.quality.min_score > 100 {
            return Err(CoreError::Config(format!(
                "quality.min_score must be within 0..=100, got {}",
                self.quality.min_score
            )));
        }
        for (name, v) in [
            ("mapping.clause_highlight_opacity", self.mapping.clause_highlight_opacity),
            ("mapping.text_highlight_opacity", self.mapping.text_highlight_opacity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(CoreError::Config(format!("{} must be within 0..=1, got {}", name, v)));
            }
        }
        if self.mapping.max_risk_regions == 0 {
            return Err(CoreError::Config(
                "mapping.max_risk_regions must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = PipelineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.chunking.max_chars, 6000);
        assert_eq!(cfg.quality.min_score, 70);
    }

    #[test]
    fn overlap_not_below_window_is_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.chunking.overlap = cfg.chunking.max_chars;
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"chunking":{"max_chars":500},"quality":{"min_score":80}}"#)
                .unwrap();
        assert_eq!(cfg.chunking.max_chars, 500);
        assert_eq!(cfg.chunking.overlap, 1000);
        assert_eq!(cfg.quality.min_score, 80);
        assert!(cfg.quality.strict_blockers);
        // 500 <= 1000 overlap
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("pipeline.json");
        std::fs::write(&p, r#"{"chunking":{"max_chars":800,"overlap":100}}"#).unwrap();
        let cfg = PipelineConfig::from_json_file(&p).unwrap();
        assert_eq!(cfg.chunking.max_chars, 800);
    }
}
