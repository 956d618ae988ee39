//! Pausable, killable parameter sweeps.
//!
//! A [`SweepController`] walks an inclusive [`SweepRange`] of fixed-point
//! integer indices and invokes a step action for each one. A cloneable
//! [`SweepControl`] handle lets another thread pause, resume, or kill the run.
//! Resuming re-issues the last few steps (see [`OverlapHistory`]) so hardware
//! that was still settling when the pause arrived is not skipped.
//!
//! [`NestedSweep`] runs an inner sweep at every outer step with both levels
//! honouring the same control handle. [`drive`] and [`drive_nested`] connect
//! a sweep to any [`Device`] and [`DataSink`].

pub mod config;
pub mod control;
pub mod controller;
pub mod device;
pub mod error;
pub mod event;
pub mod history;
pub mod nested;
pub mod range;

pub use config::{ResumePolicy, SweepConfig};
pub use control::{SweepControl, SweepState};
pub use controller::{SweepController, SweepOutcome};
pub use device::{drive, drive_nested, DataSink, Device, StepRecord};
pub use error::{Result, SweepError};
pub use event::SweepEvent;
pub use history::{OverlapHistory, DEFAULT_HISTORY_DEPTH};
pub use nested::NestedSweep;
pub use range::{SweepRange, MILLI};
