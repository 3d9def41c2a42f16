use crate::adapters::interface::GenerativeModel;
use crate::config::AiConfig;
use crate::error::{CoreError, CoreResult};
use std::path::Path;

/// Replays a stored model response for every prompt, or reports the model as unavailable.
#[derive(Debug, Clone)]
pub struct RecordedResponse {
    response: Option<String>,
}

impl RecordedResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }

    pub fn from_file(path: &Path) -> CoreResult<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    pub fn unavailable() -> Self {
        Self { response: None }
    }
}

impl GenerativeModel for RecordedResponse {
    fn generate(&self, _prompt: &str, cfg: &AiConfig) -> CoreResult<String> {
        match &self.response {
            Some(r) => {
                tracing::debug!(model = %cfg.model, bytes = r.len(), "replaying recorded response");
                Ok(r.clone())
            }
            None => Err(CoreError::CollaboratorUnavailable(
                "no recorded response configured".to_string(),
            )),
        }
    }
}
