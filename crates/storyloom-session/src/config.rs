//! Session engine configuration.

use std::time::Duration;

use storyloom_core::{MAX_IMPROVISATIONS, Settings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long the preparer waits for duration metadata before giving up
    /// on highlighting for a turn.
    pub duration_wait: Duration,

    /// Improvisations accepted per story.
    pub max_improvisations: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&Settings::with_defaults())
    }
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            duration_wait: Duration::from_millis(settings.effective_duration_wait_ms()),
            max_improvisations: MAX_IMPROVISATIONS,
        }
    }
}
