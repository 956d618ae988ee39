use std::sync::mpsc::Sender;
use std::thread;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ResumePolicy, SweepConfig};
use crate::control::{SweepControl, SweepState};
use crate::error::{BoxError, Result, SweepError};
use crate::event::SweepEvent;
use crate::history::OverlapHistory;
use crate::range::SweepRange;

/// How a sweep that returned `Ok` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Every index was issued.
    Completed,
    /// A kill was observed; no step ran after it.
    Cancelled,
}

impl SweepOutcome {
    pub fn is_cancelled(self) -> bool {
        self == SweepOutcome::Cancelled
    }
}

enum PauseExit {
    Resumed,
    Killed,
}

/// What a step asks the loop to do next.
pub(crate) enum StepExit {
    Continue,
    /// The step saw a kill partway through and did not finish.
    Cancelled,
}

/// Runs one sweep over a [`SweepRange`].
///
/// Before every step the controller checks for a kill, then for a pause.
/// While paused it polls until resumed or killed. On resume with
/// [`ResumePolicy::Rewind`] the next index issued is the oldest one in the
/// overlap history, so up to `history_depth` steps run again.
pub struct SweepController {
    range: SweepRange,
    control: SweepControl,
    config: SweepConfig,
    history: OverlapHistory,
    events: Option<Sender<SweepEvent>>,
    depth: usize,
}

impl SweepController {
    /// Create a controller with its own control handle and default config.
    pub fn new(range: SweepRange) -> Self {
        Self::with_control(range, SweepControl::new())
    }

    /// Create a controller driven by an existing control handle.
    pub fn with_control(range: SweepRange, control: SweepControl) -> Self {
        let config = SweepConfig::default();
        Self {
            range,
            control,
            history: OverlapHistory::new(config.history_depth),
            config,
            events: None,
            depth: 0,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: SweepConfig) -> Self {
        self.history = OverlapHistory::new(config.history_depth);
        self.config = config;
        self
    }

    /// Send progress events to `events`. A closed receiver is ignored.
    pub fn with_events(mut self, events: Sender<SweepEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub(crate) fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Handle for pausing, resuming, or killing this sweep.
    pub fn control(&self) -> &SweepControl {
        &self.control
    }

    pub fn range(&self) -> &SweepRange {
        &self.range
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Indices issued most recently in the last run.
    pub fn history(&self) -> &OverlapHistory {
        &self.history
    }

    /// Run the sweep, calling `action` with each index in turn.
    ///
    /// Returns [`SweepOutcome::Cancelled`] when killed. An action failure
    /// stops the sweep and is returned as [`SweepError::Step`].
    pub fn run<F, E>(&mut self, mut action: F) -> Result<SweepOutcome>
    where
        F: FnMut(i64) -> std::result::Result<(), E>,
        E: Into<BoxError>,
    {
        self.run_with(|index| {
            action(index)
                .map(|()| StepExit::Continue)
                .map_err(|err| SweepError::Step {
                    index,
                    source: err.into(),
                })
        })
    }

    pub(crate) fn run_with<F>(&mut self, mut action: F) -> Result<SweepOutcome>
    where
        F: FnMut(i64) -> Result<StepExit>,
    {
        let top_level = self.depth == 0;
        self.history.clear();
        if top_level {
            self.control.set_state(SweepState::Running);
            info!(
                start = self.range.start(),
                end = self.range.end(),
                step = self.range.step(),
                "sweep started"
            );
        }
        self.emit(SweepEvent::Started {
            depth: self.depth,
            steps: self.range.len(),
        });

        let mut steps = 0usize;
        let mut next = Some(self.range.start());

        while let Some(mut index) = next {
            if self.control.is_killed() {
                return Ok(self.finish(SweepOutcome::Cancelled, steps));
            }

            if self.control.is_paused() {
                match self.wait_while_paused(index) {
                    Ok(PauseExit::Killed) => {
                        return Ok(self.finish(SweepOutcome::Cancelled, steps))
                    }
                    Ok(PauseExit::Resumed) => {
                        if self.config.resume_policy == ResumePolicy::Rewind {
                            if let Some(oldest) = self.history.oldest() {
                                index = oldest;
                            }
                        }
                        info!(next = index, "sweep resumed");
                        self.emit(SweepEvent::Resumed {
                            depth: self.depth,
                            next: index,
                        });
                    }
                    Err(err) => {
                        self.stop();
                        return Err(err);
                    }
                }
            }

            match action(index) {
                Ok(StepExit::Continue) => {}
                Ok(StepExit::Cancelled) => {
                    return Ok(self.finish(SweepOutcome::Cancelled, steps));
                }
                Err(err) => {
                    warn!(index, error = %err, "sweep step failed");
                    self.stop();
                    return Err(err);
                }
            }

            self.history.push(index);
            steps += 1;
            debug!(depth = self.depth, index, "sweep step done");
            self.emit(SweepEvent::Step {
                depth: self.depth,
                index,
                value: self.range.value_of(index),
            });

            next = self.range.next(index);
        }

        Ok(self.finish(SweepOutcome::Completed, steps))
    }

    fn wait_while_paused(&mut self, before: i64) -> Result<PauseExit> {
        self.control.set_state(SweepState::Paused);
        info!(before, "sweep paused");
        self.emit(SweepEvent::Paused {
            depth: self.depth,
            before,
        });

        let started = Instant::now();
        loop {
            if self.control.is_killed() {
                return Ok(PauseExit::Killed);
            }
            if !self.control.is_paused() {
                self.control.set_state(SweepState::Running);
                return Ok(PauseExit::Resumed);
            }
            if let Some(limit) = self.config.pause_timeout {
                if started.elapsed() >= limit {
                    return Err(SweepError::PauseTimeout(limit));
                }
            }
            thread::sleep(self.config.pause_poll);
        }
    }

    fn finish(&mut self, outcome: SweepOutcome, steps: usize) -> SweepOutcome {
        if self.depth == 0 {
            self.control.set_state(SweepState::Stopped);
            info!(?outcome, steps, "sweep finished");
        }
        self.emit(SweepEvent::Finished {
            depth: self.depth,
            outcome,
            steps,
        });
        outcome
    }

    fn stop(&self) {
        if self.depth == 0 {
            self.control.set_state(SweepState::Stopped);
        }
    }

    fn emit(&self, event: SweepEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

impl std::fmt::Debug for SweepController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepController")
            .field("range", &self.range)
            .field("state", &self.control.state())
            .field("config", &self.config)
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    fn fast() -> SweepConfig {
        SweepConfig {
            pause_poll: Duration::from_millis(1),
            ..SweepConfig::default()
        }
    }

    #[test]
    fn issues_every_index_in_order() {
        let mut sweep =
            SweepController::new(SweepRange::new(0.0, 2.0, 1.0).unwrap()).with_config(fast());
        let mut seen = Vec::new();
        let outcome = sweep
            .run(|index| {
                seen.push(index);
                Ok::<_, std::io::Error>(())
            })
            .unwrap();

        assert_eq!(outcome, SweepOutcome::Completed);
        assert_eq!(seen, vec![0, 1000, 2000]);
        assert_eq!(sweep.control().state(), SweepState::Stopped);
    }

    #[test]
    fn resume_rewinds_to_oldest_history_entry() {
        let mut sweep =
            SweepController::new(SweepRange::new(0.0, 4.0, 1.0).unwrap()).with_config(fast());
        let control = sweep.control().clone();
        let mut seen = Vec::new();
        let mut paused_once = false;

        sweep
            .run(|index| {
                seen.push(index);
                if index == 2000 && !paused_once {
                    paused_once = true;
                    control.pause();
                    let remote = control.clone();
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(20));
                        remote.resume();
                    });
                }
                Ok::<_, std::io::Error>(())
            })
            .unwrap();

        assert_eq!(seen, vec![0, 1000, 2000, 0, 1000, 2000, 3000, 4000]);
    }

    #[test]
    fn rewind_is_bounded_by_history_depth() {
        let mut sweep =
            SweepController::new(SweepRange::new(0.0, 8.0, 1.0).unwrap()).with_config(fast());
        let control = sweep.control().clone();
        let mut seen = Vec::new();
        let mut paused_once = false;

        sweep
            .run(|index| {
                seen.push(index);
                if index == 6000 && !paused_once {
                    paused_once = true;
                    control.pause();
                    let remote = control.clone();
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(10));
                        remote.resume();
                    });
                }
                Ok::<_, std::io::Error>(())
            })
            .unwrap();

        // History held 2000..=6000 when the pause was observed.
        assert_eq!(seen[7], 2000);
        assert_eq!(*seen.last().unwrap(), 8000);
    }

    #[test]
    fn continue_policy_does_not_rewind() {
        let config = SweepConfig {
            resume_policy: ResumePolicy::Continue,
            ..fast()
        };
        let mut sweep =
            SweepController::new(SweepRange::new(0.0, 3.0, 1.0).unwrap()).with_config(config);
        let control = sweep.control().clone();
        let mut seen = Vec::new();

        sweep
            .run(|index| {
                seen.push(index);
                if index == 1000 {
                    control.pause();
                    let remote = control.clone();
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(10));
                        remote.resume();
                    });
                }
                Ok::<_, std::io::Error>(())
            })
            .unwrap();

        assert_eq!(seen, vec![0, 1000, 2000, 3000]);
    }

    #[test]
    fn kill_during_pause_stops_without_more_steps() {
        let mut sweep =
            SweepController::new(SweepRange::new(0.0, 5.0, 1.0).unwrap()).with_config(fast());
        let control = sweep.control().clone();
        let mut seen = Vec::new();

        let outcome = sweep
            .run(|index| {
                seen.push(index);
                if index == 1000 {
                    control.pause();
                    let remote = control.clone();
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(10));
                        remote.kill();
                    });
                }
                Ok::<_, std::io::Error>(())
            })
            .unwrap();

        assert_eq!(outcome, SweepOutcome::Cancelled);
        assert_eq!(seen, vec![0, 1000]);
        assert_eq!(control.state(), SweepState::Stopped);
    }

    #[test]
    fn kill_wins_over_pause() {
        let mut sweep = SweepController::new(SweepRange::new(0.0, 5.0, 1.0).unwrap());
        sweep.control().pause();
        sweep.control().kill();
        let mut calls = 0;
        let outcome = sweep
            .run(|_| {
                calls += 1;
                Ok::<_, std::io::Error>(())
            })
            .unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(calls, 0);
    }

    #[test]
    fn step_failure_ends_the_sweep() {
        let mut sweep = SweepController::new(SweepRange::new(0.0, 5.0, 1.0).unwrap());
        let mut seen = Vec::new();
        let err = sweep
            .run(|index| {
                seen.push(index);
                if index == 2000 {
                    return Err(std::io::Error::other("device busy"));
                }
                Ok(())
            })
            .unwrap_err();

        assert_eq!(err.step_index(), Some(2000));
        assert_eq!(seen, vec![0, 1000, 2000]);
        assert_eq!(sweep.control().state(), SweepState::Stopped);
    }

    #[test]
    fn pause_timeout_fails_closed() {
        let config = SweepConfig {
            pause_timeout: Some(Duration::from_millis(20)),
            ..fast()
        };
        let mut sweep =
            SweepController::new(SweepRange::new(0.0, 5.0, 1.0).unwrap()).with_config(config);
        sweep.control().pause();
        let err = sweep
            .run(|_| Ok::<_, std::io::Error>(()))
            .unwrap_err();
        assert!(matches!(err, SweepError::PauseTimeout(_)));
    }

    #[test]
    fn events_are_delivered_over_channel() {
        let (tx, rx) = mpsc::channel();
        let mut sweep = SweepController::new(SweepRange::new(1.0, 0.0, 0.5).unwrap())
            .with_config(fast())
            .with_events(tx);
        sweep.run(|_| Ok::<_, std::io::Error>(())).unwrap();
        drop(sweep);

        let events: Vec<SweepEvent> = rx.iter().collect();
        assert_eq!(events.first(), Some(&SweepEvent::Started { depth: 0, steps: 3 }));
        let values: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                SweepEvent::Step { value, .. } => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec![1.0, 0.5, 0.0]);
        assert!(matches!(
            events.last(),
            Some(SweepEvent::Finished {
                outcome: SweepOutcome::Completed,
                steps: 3,
                ..
            })
        ));
    }
}
