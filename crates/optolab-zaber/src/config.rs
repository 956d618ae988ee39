use std::time::Duration;

/// Timing used by [`crate::Actuator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorConfig {
    /// How long to wait for every expected reply. Long moves reply only when
    /// they finish, so this must exceed the slowest full-travel move.
    /// `None` waits forever. Default: 30 s.
    pub reply_timeout: Option<Duration>,
    /// Sleep between polls of the input buffer while waiting. Default: 5 ms.
    pub poll_interval: Duration,
    /// Wait after a broadcast renumber before counting replies. Default: 1 s.
    pub renumber_settle: Duration,
    /// Wait after a status request before reading replies. Default: 20 ms.
    pub status_settle: Duration,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Some(Duration::from_secs(30)),
            poll_interval: Duration::from_millis(5),
            renumber_settle: Duration::from_secs(1),
            status_settle: Duration::from_millis(20),
        }
    }
}

impl ActuatorConfig {
    /// Config with every sleep removed, for in-process simulations.
    pub fn immediate() -> Self {
        Self {
            reply_timeout: Some(Duration::from_millis(200)),
            poll_interval: Duration::ZERO,
            renumber_settle: Duration::ZERO,
            status_settle: Duration::ZERO,
        }
    }
}
