//! Engine configuration.

use crate::error::EngineError;
use crate::fork::OutputMode;
use serde::{Deserialize, Serialize};
use strand0::Millis;

/// Beat used when a fork sets a gate but no beat.
pub const DEFAULT_BEAT: Millis = Millis::from_millis(100);

/// Engine-wide defaults. Every field is optional in JSON.
///
/// ```
/// use strand_engine::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{"fork": {"max": 4, "beat": 250}}"#).unwrap();
/// assert_eq!(config.fork.max, Some(4));
/// assert_eq!(config.fork.beat.as_millis(), 250);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Defaults for [`ForkJob`](crate::ForkJob) fields left unset.
    pub fork: ForkDefaults,
}

/// Fork defaults.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForkDefaults {
    /// Concurrency bound. `None` is unbounded.
    pub max: Option<usize>,
    /// Gate re-evaluation interval when a job sets a gate without a beat.
    pub beat: Millis,
    /// Where map results land.
    pub output: OutputMode,
}

impl Default for ForkDefaults {
    fn default() -> Self {
        Self {
            max: None,
            beat: DEFAULT_BEAT,
            output: OutputMode::default(),
        }
    }
}

impl EngineConfig {
    /// Parse from JSON and validate.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.fork.max == Some(0) {
            return Err(EngineError::InvalidConfig("fork.max must be at least 1".into()));
        }
        if self.fork.beat == Millis::ZERO {
            return Err(EngineError::InvalidConfig("fork.beat must be non-zero".into()));
        }
        Ok(())
    }
}
