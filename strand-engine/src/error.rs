//! Engine construction errors.
//!
//! Failures inside a running chain are [`strand0::Fault`]s carried in the
//! result channel, never these.

use thiserror::Error;

/// Errors from building an [`Engine`](crate::Engine) or its configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration JSON could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
