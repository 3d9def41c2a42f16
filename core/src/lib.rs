pub mod adapters;
pub mod chunking;
pub mod config;
pub mod determinism;
pub mod extract;
pub mod mapping;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod scanner;
pub mod validator;

pub mod error;

pub use config::PipelineConfig;
pub use error::{CoreError, CoreResult};
pub use pipeline::{AnalysisReport, ContractPipeline, SourceDocument};
