use thiserror::Error;

use crate::filter::error::FilterError;
use crate::preview::types::PipelineState;

/// Invalid capture setup. Fatal for the `configure` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid capture dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid frame-rate range {min}..={max} fps")]
    InvalidFpsRange { min: u32, max: u32 },
}

/// Pipeline API used in the wrong lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("pipeline is not configured")]
    NotConfigured,

    #[error("pipeline is not streaming (state: {0})")]
    NotStreaming(PipelineState),

    #[error("pipeline must be stopped before reconfiguring")]
    Streaming,
}

/// Frame source failure.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("frame source '{name}' failed: {message}")]
    Capture { name: String, message: String },
}

/// Errors surfaced to pipeline callers.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("filter failed on {consecutive} consecutive frames: {source}")]
    FilterFailing {
        consecutive: u32,
        #[source]
        source: FilterError,
    },
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;
