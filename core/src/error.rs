use std::fmt;
use thiserror::Error;

/// Entity classes whose minimum-count or validity contract can fail reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityClass {
    Parties,
    Timeline,
    Risks,
    KeyTerms,
    Products,
}

impl EntityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityClass::Parties => "parties",
            EntityClass::Timeline => "timeline events",
            EntityClass::Risks => "risks",
            EntityClass::KeyTerms => "key terms",
            EntityClass::Products => "products",
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("reconciliation failed for {entity}: {reason}")]
    Reconciliation { entity: EntityClass, reason: String },

    #[error(
        "quality gate rejected document (score {score} < {threshold}): {}",
        .violations.join("; ")
    )]
    QualityGateRejection {
        score: u32,
        threshold: u32,
        violations: Vec<String>,
    },

    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    pub fn reconciliation(entity: EntityClass, reason: impl Into<String>) -> Self {
        CoreError::Reconciliation {
            entity,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable kind, used in the error artifact.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::InvalidInput(_) => "INVALID_INPUT",
            CoreError::Config(_) => "CONFIG",
            CoreError::Parse(_) => "PARSE_ERROR",
            CoreError::Reconciliation { .. } => "RECONCILIATION_ERROR",
            CoreError::QualityGateRejection { .. } => "QUALITY_GATE_REJECTION",
            CoreError::CollaboratorUnavailable(_) => "COLLABORATOR_UNAVAILABLE",
            CoreError::Io(_) => "IO",
            CoreError::Json(_) => "JSON",
            CoreError::Csv(_) => "CSV",
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
