use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

/// Lifecycle of a sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepState {
    Idle,
    Running,
    Paused,
    Stopping,
    Stopped,
}

impl SweepState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SweepState::Running,
            2 => SweepState::Paused,
            3 => SweepState::Stopping,
            4 => SweepState::Stopped,
            _ => SweepState::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            SweepState::Idle => 0,
            SweepState::Running => 1,
            SweepState::Paused => 2,
            SweepState::Stopping => 3,
            SweepState::Stopped => 4,
        }
    }
}

#[derive(Debug, Default)]
struct Flags {
    paused: AtomicBool,
    killed: AtomicBool,
    state: AtomicU8,
}

/// Shared pause/resume/kill handle for a running sweep.
///
/// Clones refer to the same flags, so a control thread can hold one while
/// the worker runs the sweep. Kill wins over pause.
#[derive(Debug, Clone, Default)]
pub struct SweepControl {
    flags: Arc<Flags>,
}

impl SweepControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the sweep to pause before its next step.
    pub fn pause(&self) {
        if !self.flags.paused.swap(true, Ordering::SeqCst) {
            info!("sweep pause requested");
        }
    }

    /// Let a paused sweep continue.
    pub fn resume(&self) {
        if self.flags.paused.swap(false, Ordering::SeqCst) {
            info!("sweep resume requested");
        }
    }

    /// Stop the sweep at the next check. Cannot be undone for this run.
    pub fn kill(&self) {
        if !self.flags.killed.swap(true, Ordering::SeqCst) {
            info!("sweep kill requested");
            if self.state() != SweepState::Stopped {
                self.set_state(SweepState::Stopping);
            }
        }
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::SeqCst)
    }

    pub fn is_killed(&self) -> bool {
        self.flags.killed.load(Ordering::SeqCst)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SweepState {
        SweepState::from_u8(self.flags.state.load(Ordering::SeqCst))
    }

    /// Clear pause and kill so the handle can drive another run.
    pub fn reset(&self) {
        self.flags.paused.store(false, Ordering::SeqCst);
        self.flags.killed.store(false, Ordering::SeqCst);
        self.set_state(SweepState::Idle);
    }

    pub(crate) fn set_state(&self, state: SweepState) {
        self.flags.state.store(state.as_u8(), Ordering::SeqCst);
    }
}
