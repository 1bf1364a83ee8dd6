// src/infra/errors.rs — Error types for the aggregator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    // Source errors (transient, never retried by the pipeline)
    #[error("Source '{source_id}' unavailable: {message}")]
    SourceUnavailable { source_id: String, message: String },

    #[error("Source '{source_id}' timed out after {timeout_ms}ms")]
    SourceTimeout { source_id: String, timeout_ms: u64 },

    // Pipeline errors
    #[error("Generation failed for '{source_id}': {source}")]
    PartialGenerationFailure {
        source_id: String,
        source: Box<AggregatorError>,
    },

    #[error("Arbitration failed: {source}")]
    ArbitrationFailure { source: Box<AggregatorError> },

    // Storage
    #[error("Persistence failed: {0}")]
    PersistenceFailure(String),

    // User errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AggregatorError {
    /// Backend hiccups a caller may reasonably retry the whole aggregation for.
    pub fn is_transient(&self) -> bool {
        match self {
            AggregatorError::SourceUnavailable { .. } | AggregatorError::SourceTimeout { .. } => {
                true
            }
            AggregatorError::PartialGenerationFailure { source, .. }
            | AggregatorError::ArbitrationFailure { source } => source.is_transient(),
            _ => false,
        }
    }

    /// Identifier of the primary source that sank the aggregation, if any.
    pub fn failed_source(&self) -> Option<&str> {
        match self {
            AggregatorError::PartialGenerationFailure { source_id, .. } => Some(source_id),
            _ => None,
        }
    }

    pub fn persistence(err: impl std::fmt::Display) -> Self {
        AggregatorError::PersistenceFailure(err.to_string())
    }
}
