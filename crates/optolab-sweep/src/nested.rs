use std::sync::mpsc::Sender;

use tracing::debug;

use crate::config::{ResumePolicy, SweepConfig};
use crate::control::SweepControl;
use crate::controller::{StepExit, SweepController, SweepOutcome};
use crate::error::{BoxError, Result, SweepError};
use crate::event::SweepEvent;
use crate::range::SweepRange;

/// An outer sweep that runs a full inner sweep at each of its steps.
///
/// Both levels share one [`SweepControl`]. A kill seen by the inner loop
/// cancels the outer loop at once, even on its last step. The inner loop pauses in
/// place ([`ResumePolicy::Continue`]); the outer loop rewinds per its config.
pub struct NestedSweep {
    outer: SweepRange,
    inner: SweepRange,
    control: SweepControl,
    config: SweepConfig,
    events: Option<Sender<SweepEvent>>,
}

impl NestedSweep {
    pub fn new(outer: SweepRange, inner: SweepRange) -> Self {
        Self::with_control(outer, inner, SweepControl::new())
    }

    pub fn with_control(outer: SweepRange, inner: SweepRange, control: SweepControl) -> Self {
        Self {
            outer,
            inner,
            control,
            config: SweepConfig::default(),
            events: None,
        }
    }

    /// Configuration for the outer loop. The inner loop copies it with
    /// [`ResumePolicy::Continue`].
    pub fn with_config(mut self, config: SweepConfig) -> Self {
        self.config = config;
        self
    }

    /// Send events from both levels to `events`.
    pub fn with_events(mut self, events: Sender<SweepEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn control(&self) -> &SweepControl {
        &self.control
    }

    pub fn outer(&self) -> &SweepRange {
        &self.outer
    }

    pub fn inner(&self) -> &SweepRange {
        &self.inner
    }

    /// Run the sweep. `outer_action` gets each outer index before its inner
    /// sweep; `inner_action` gets `(outer_index, inner_index)`.
    pub fn run<O, I, E>(&mut self, mut outer_action: O, mut inner_action: I) -> Result<SweepOutcome>
    where
        O: FnMut(i64) -> std::result::Result<(), E>,
        I: FnMut(i64, i64) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        let inner_range = self.inner;
        let inner_config = SweepConfig {
            resume_policy: ResumePolicy::Continue,
            ..self.config.clone()
        };
        let control = self.control.clone();
        let events = self.events.clone();

        let mut outer = SweepController::with_control(self.outer, control.clone())
            .with_config(self.config.clone());
        if let Some(tx) = &events {
            outer = outer.with_events(tx.clone());
        }

        outer.run_with(|outer_index| {
            outer_action(outer_index).map_err(|err| SweepError::Step {
                index: outer_index,
                source: err.into(),
            })?;

            let mut inner = SweepController::with_control(inner_range, control.clone())
                .with_config(inner_config.clone())
                .with_depth(1);
            if let Some(tx) = &events {
                inner = inner.with_events(tx.clone());
            }

            let outcome = inner.run_with(|inner_index| {
                inner_action(outer_index, inner_index)
                    .map(|()| StepExit::Continue)
                    .map_err(|err| SweepError::Step {
                        index: inner_index,
                        source: err.into(),
                    })
            })?;
            debug!(outer_index, ?outcome, "inner sweep finished");
            Ok(match outcome {
                SweepOutcome::Completed => StepExit::Continue,
                SweepOutcome::Cancelled => StepExit::Cancelled,
            })
        })
    }
}

impl std::fmt::Debug for NestedSweep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NestedSweep")
            .field("outer", &self.outer)
            .field("inner", &self.inner)
            .field("state", &self.control.state())
            .finish()
    }
}
