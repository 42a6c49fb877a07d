//! Timer-driven fan control loop.
//!
//! A [`FanJob`] is one control cycle: read sensors, decide, and apply the
//! new level if the decision calls for it. A [`JobRunner`] fires the job on
//! a fixed interval and guarantees at most one cycle is in flight.
//!
//! # State Machine
//!
//! ```text
//!            fire()                 cycle returns, fails, or panics
//!   Idle ──────────────► Running ────────────────────────────────► Idle
//!                          │  ▲
//!                          └──┘ fire() is dropped, not queued
//! ```
//!
//! A failed cycle is logged and forgotten. The next tick starts from a fresh
//! sensor read, including the fan level the device actually reports.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::sensor::{SensorReader, SensorSnapshot};
use crate::smi::{ApplyOutcome, SmiTool};
use crate::thermal::{CoolingRegime, Evaluation, SpeedController, SpeedDecision};
use crate::tracing::prelude::*;

/// Whether a control cycle is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
}

/// How a completed cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fan level left alone.
    Unchanged { fan_level: u8 },

    /// Tool accepted the new level.
    Applied { level: u8 },

    /// Tool refused the new level. Not retried within the cycle.
    ApplyFailed { level: u8, code: Option<i32> },
}

/// One read-decide-apply cycle against a single device.
pub struct FanJob {
    reader: SensorReader,
    controller: SpeedController,
    tool: Arc<dyn SmiTool>,
}

impl FanJob {
    pub fn new(
        tool: Arc<dyn SmiTool>,
        device_id: impl Into<String>,
        controller: SpeedController,
    ) -> Self {
        // A missing fan level reads as max so the controller never believes
        // the fan is slower than it might be.
        let reader = SensorReader::new(tool.clone(), device_id, controller.curve().max_speed);

        Self {
            reader,
            controller,
            tool,
        }
    }

    pub fn reader(&self) -> &SensorReader {
        &self.reader
    }

    pub fn controller(&self) -> &SpeedController {
        &self.controller
    }

    /// Run one cycle to completion.
    ///
    /// Errors only when the tool cannot be run (or, for the read, exits
    /// unsuccessfully). A rejected write is an outcome, not an error.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let snapshot = self.reader.read().await?;
        let evaluation = self.controller.evaluate(&snapshot);
        log_evaluation(&snapshot, &evaluation);

        let level = match evaluation.decision {
            SpeedDecision::NoChange => {
                return Ok(CycleOutcome::Unchanged {
                    fan_level: snapshot.fan_level,
                });
            }
            SpeedDecision::Apply(level) => level,
        };

        info!(
            from = snapshot.fan_level,
            to = level,
            "Setting fan speed"
        );

        match self
            .tool
            .set_fan_level(self.reader.device_id(), level)
            .await?
        {
            ApplyOutcome::Applied { output } => {
                info!(level, output = %output, "Set fan speed");
                Ok(CycleOutcome::Applied { level })
            }
            ApplyOutcome::Rejected { code, output } => {
                warn!(level, ?code, output = %output, "Failed to set fan speed");
                Ok(CycleOutcome::ApplyFailed { level, code })
            }
        }
    }
}

fn log_evaluation(snapshot: &SensorSnapshot, evaluation: &Evaluation) {
    match evaluation.regime {
        CoolingRegime::FailSafe => warn!(
            edge = %snapshot.edge,
            junction = %snapshot.junction,
            memory = %snapshot.memory,
            "Failed to get temperature, failing safe to max fan speed"
        ),
        CoolingRegime::Quiet => debug!(
            temp_c = snapshot.hottest_c(),
            "Temperature at or below minimum, using min fan speed"
        ),
        CoolingRegime::Ramp => {
            if let Some(ramp) = evaluation.ramp {
                debug!(
                    temp_c = ramp.temperature_c,
                    diff_c = ramp.diff_c,
                    ratio = ramp.ratio,
                    new_speed = evaluation.candidate,
                    "Fan curve ramp"
                );
            }
        }
    }

    if evaluation.decision == SpeedDecision::NoChange {
        debug!(
            fan_level = snapshot.fan_level,
            target = evaluation.candidate,
            "Fan speed already within threshold"
        );
    }
}

/// Marks the runner `Running` for as long as it lives.
struct CycleGuard {
    state: Arc<watch::Sender<JobState>>,
}

impl CycleGuard {
    /// Move Idle to Running, or return `None` if a cycle is in flight.
    fn acquire(state: &Arc<watch::Sender<JobState>>) -> Option<Self> {
        let started = state.send_if_modified(|current| match current {
            JobState::Idle => {
                *current = JobState::Running;
                true
            }
            JobState::Running => false,
        });

        started.then(|| Self {
            state: Arc::clone(state),
        })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.state.send_replace(JobState::Idle);
    }
}

/// Fires a [`FanJob`] on a fixed interval, one cycle at a time.
pub struct JobRunner {
    job: Arc<FanJob>,
    poll_interval: Duration,
    state: Arc<watch::Sender<JobState>>,
}

impl JobRunner {
    pub fn new(job: FanJob, poll_interval: Duration) -> Self {
        let (state, _) = watch::channel(JobState::Idle);

        Self {
            job: Arc::new(job),
            poll_interval,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    /// Start a cycle unless one is already running.
    ///
    /// Returns the handle of the started cycle, or `None` when the fire was
    /// dropped. The handle always resolves successfully; cycle errors and
    /// panics are logged inside it.
    pub fn fire(&self) -> Option<JoinHandle<()>> {
        let guard = CycleGuard::acquire(&self.state)?;
        let job = Arc::clone(&self.job);

        Some(tokio::spawn(async move {
            let _guard = guard;

            // Run the body in its own task so a panic surfaces here as a
            // JoinError instead of unwinding past the guard unlogged.
            match tokio::spawn(async move { job.run_cycle().await }).await {
                Ok(Ok(outcome)) => trace!(?outcome, "Cycle complete"),
                Ok(Err(e)) => error!(error = %e, "Fan control cycle failed"),
                Err(e) => error!(error = %e, "Fan control cycle panicked"),
            }
        }))
    }

    /// Fire on every tick until cancelled, then wait for any in-flight cycle.
    pub async fn run(self, cancellation: CancellationToken) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            device = %self.job.reader().device_id(),
            interval_ms = self.poll_interval.as_millis() as u64,
            "Fan control loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    break;
                }
                _ = interval.tick() => {
                    if self.fire().is_none() {
                        trace!("Previous cycle still running, tick dropped");
                    }
                }
            }
        }

        if self.state() == JobState::Running {
            debug!("Waiting for in-flight cycle before stopping");
        }
        let mut state_rx = self.subscribe();
        let _ = state_rx.wait_for(|state| *state == JobState::Idle).await;

        info!("Fan control loop stopped");
    }
}
