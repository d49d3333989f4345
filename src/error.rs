//! Error types for pipeline construction and offline rendering.
//!
//! The tick path itself never fails: queues degrade lossily and starvation is
//! reported as empty results. Everything here is raised at the API boundary.

use thiserror::Error;

/// Errors raised when building or configuring a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A queue was asked to hold zero items.
    #[error("{queue} queue capacity must be greater than zero")]
    ZeroCapacity {
        /// Which queue was misconfigured.
        queue: &'static str,
    },

    /// A numeric setting is out of its legal range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The selected backend exists but has no implementation.
    #[error("{kind} backend '{name}' is not available")]
    BackendUnavailable {
        /// Backend family ("phoneme" or "voice").
        kind: &'static str,
        /// Backend name as configured.
        name: String,
    },

    /// The TOML configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;
