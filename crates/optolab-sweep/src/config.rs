use std::time::Duration;

use crate::history::DEFAULT_HISTORY_DEPTH;

/// Where a sweep continues after a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumePolicy {
    /// Restart from the oldest index in the overlap history.
    #[default]
    Rewind,
    /// Continue with the index that was about to be issued.
    Continue,
}

/// Configuration for [`crate::SweepController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// How often the pause wait re-checks the flags. Default: 10 ms.
    pub pause_poll: Duration,
    /// Give up with [`crate::SweepError::PauseTimeout`] after pausing this
    /// long. `None` waits indefinitely. Default: `None`.
    pub pause_timeout: Option<Duration>,
    /// Recently issued indices kept for rewinding. Default: 5.
    pub history_depth: usize,
    /// Default: [`ResumePolicy::Rewind`].
    pub resume_policy: ResumePolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            pause_poll: Duration::from_millis(10),
            pause_timeout: None,
            history_depth: DEFAULT_HISTORY_DEPTH,
            resume_policy: ResumePolicy::Rewind,
        }
    }
}
