// Numan Thabit 2025

use thiserror::Error;

/// Fixed message raised when `batch_service` is missing or empty.
pub const MISSING_BATCH_SERVICE: &str = "batch_service must name the batch endpoint service";

/// Configuration shared by every batching integration point.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Name of the server-side batch endpoint service.
    pub batch_service: String,
}

impl BatchConfig {
    /// Configuration pointing at the given batch endpoint service.
    pub fn new(batch_service: impl Into<String>) -> Self {
        Self {
            batch_service: batch_service.into(),
        }
    }

    /// Fail fast when the batch endpoint is not configured.
    ///
    /// Called at construction by every integration point; a bad config is
    /// fatal to setup, never deferred to call time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_service.trim().is_empty() {
            return Err(ConfigError::MissingBatchService);
        }
        Ok(())
    }
}

/// Setup-time configuration failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `batch_service` was missing or empty.
    #[error("batch_service must name the batch endpoint service")]
    MissingBatchService,
}
