use serde::Serialize;

use crate::controller::SweepOutcome;

/// Progress notifications sent from the sweep worker.
///
/// `depth` is 0 for a plain or outer sweep and 1 for the inner loop of a
/// [`crate::NestedSweep`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SweepEvent {
    Started { depth: usize, steps: usize },
    Step { depth: usize, index: i64, value: f64 },
    Paused { depth: usize, before: i64 },
    Resumed { depth: usize, next: i64 },
    Finished {
        depth: usize,
        outcome: SweepOutcome,
        steps: usize,
    },
}
