use std::time::Duration;

/// Boxed error from a step action, device, or sink.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that end a sweep early. Cancellation is not one of them; see
/// [`crate::SweepOutcome::Cancelled`].
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// Bounds or step cannot describe a finite fixed-point range.
    #[error("invalid sweep range: {0}")]
    InvalidRange(String),

    /// The sweep stayed paused longer than the configured limit.
    #[error("sweep paused for longer than {0:?}")]
    PauseTimeout(Duration),

    /// The step action failed; no further steps were issued.
    #[error("step at index {index} failed: {source}")]
    Step { index: i64, source: BoxError },

    /// The data sink failed to finish.
    #[error("data sink failed: {0}")]
    Sink(#[source] BoxError),
}

impl SweepError {
    /// Index of the failed step, when a step failed.
    pub fn step_index(&self) -> Option<i64> {
        match self {
            SweepError::Step { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
