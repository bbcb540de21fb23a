//! Millisecond intervals as they appear in config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An interval written as a bare millisecond count, so `"beat": 100`
/// round-trips through JSON unchanged.
///
/// ```
/// use strand0::Millis;
///
/// let beat: Millis = serde_json::from_str("250").unwrap();
/// assert_eq!(beat.to_std(), std::time::Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millis(u64);

impl Millis {
    /// No time at all.
    pub const ZERO: Self = Self(0);

    /// Wrap a millisecond count.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// The raw count.
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// The same interval as a timer duration.
    pub fn to_std(self) -> Duration {
        Duration::from_millis(self.0)
    }
}
