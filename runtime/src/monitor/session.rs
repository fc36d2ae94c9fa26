// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! One monitoring session: counters, cycle bookkeeping and the circuit breaker.
//!
//! The session never sleeps or spawns; [`super::MonitorHandle`] drives it.
//! That keeps every transition testable by calling [`MonitorSession::run_cycle`]
//! directly.

use super::jitter::{interval_bounds, next_interval};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::events::{EventBus, LogLevel, MonitorEvent};
use crate::probe::{AvailabilityProbe, CheckResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Consecutive failed cycles that end a session.
pub const ERROR_LIMIT: u32 = 3;

/// Title of the one-shot availability notification.
pub const NOTIFICATION_TITLE: &str = "Appointment Available";

/// Counters for the running session. Zeroed on start and on stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleState {
    pub consecutive_available: u32,
    pub consecutive_errors: u32,
}

/// What the driver should do after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Wait a jittered interval, then run the next cycle.
    Continue,
    /// The breaker tripped. The session is over.
    ErrorLimit,
    /// The session stopped while the cycle ran; its result was dropped.
    Stopped,
}

pub struct MonitorSession<P> {
    config: MonitorConfig,
    probe: P,
    events: EventBus,
    state: ScheduleState,
    running: Arc<AtomicBool>,
}

impl<P: AvailabilityProbe> MonitorSession<P> {
    pub fn new(config: MonitorConfig, probe: P, events: EventBus) -> Self {
        Self {
            config,
            probe,
            events,
            state: ScheduleState::default(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The flag shared with the handle. Clearing it stops the session after
    /// the current cycle.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Enter the running state and announce the session.
    pub fn start(&mut self) {
        self.state = ScheduleState::default();
        let base = self.config.interval_secs;
        let (low, high) = interval_bounds(base);

        self.events.log("Starting monitoring...", LogLevel::Info);
        self.events
            .log(format!("Base interval: {base}s"), LogLevel::Info);
        self.events
            .log(format!("Random interval: {low} - {high}s"), LogLevel::Info);

        self.running.store(true, Ordering::SeqCst);
        self.events.running_state(true, None);
        self.events.status("Monitoring", None, None);
        info!(
            slot_type = %self.config.slot_type,
            location = %self.config.location_name,
            interval_secs = base,
            "monitoring started"
        );
    }

    /// Run one check cycle and fold its outcome into the counters.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        if !self.is_running() {
            return CycleOutcome::Stopped;
        }

        let outcome = self.probe.check().await;
        if !self.is_running() {
            debug!("session stopped during cycle, dropping result");
            return CycleOutcome::Stopped;
        }

        match outcome {
            Ok(result) => {
                self.record_result(result);
                CycleOutcome::Continue
            }
            Err(e) => self.record_failure(e),
        }
    }

    fn record_result(&mut self, result: CheckResult) {
        self.state.consecutive_errors = 0;

        match (result.found, result.available) {
            (true, Some(true)) => {
                self.state.consecutive_available += 1;
                self.events
                    .status("Monitoring", Some(true), result.earliest_time.clone());
                self.events
                    .log(format!("Status: {}", result.status), LogLevel::Success);
                if self.state.consecutive_available == 1 {
                    self.notify_available(&result);
                }
            }
            (true, Some(false)) => {
                self.state.consecutive_available = 0;
                self.events.status("Monitoring", Some(false), None);
                self.events
                    .log(format!("Status: {}", result.status), LogLevel::Info);
            }
            _ => {
                self.state.consecutive_available = 0;
                self.events.status("Monitoring", None, None);
                self.events
                    .log(format!("Status: {}", result.status), LogLevel::Warning);
            }
        }
    }

    fn notify_available(&self, result: &CheckResult) {
        let mut body = vec![
            "Detected available appointment.".to_string(),
            format!("Check time: {}", result.timestamp),
        ];
        if let Some(earliest) = &result.earliest_time {
            body.push(format!("Earliest: {earliest}"));
        }

        info!(
            location = %self.config.location_name,
            earliest = ?result.earliest_time,
            "slot available"
        );
        self.events.emit(MonitorEvent::SlotAvailable {
            title: NOTIFICATION_TITLE.to_string(),
            body: body.join("\n"),
            location: self.config.location_name.clone(),
            earliest_time: result.earliest_time.clone(),
            checked_at: result.timestamp.clone(),
        });
    }

    fn record_failure(&mut self, err: MonitorError) -> CycleOutcome {
        self.state.consecutive_errors += 1;
        warn!(
            consecutive_errors = self.state.consecutive_errors,
            transient = err.is_transient(),
            "check cycle failed: {err}"
        );
        self.events
            .log(format!("Monitor error: {err}"), LogLevel::Error);

        if self.state.consecutive_errors < ERROR_LIMIT {
            return CycleOutcome::Continue;
        }
        if !self.running.swap(false, Ordering::SeqCst) {
            return CycleOutcome::Stopped;
        }
        self.events.log(
            format!("Stopped after {ERROR_LIMIT} consecutive errors"),
            LogLevel::Error,
        );
        self.events.status("Stopped: too many errors", None, None);
        CycleOutcome::ErrorLimit
    }

    /// Draw the wait before the next cycle and announce it.
    pub fn next_wait(&self) -> Duration {
        let secs = next_interval(self.config.interval_secs);
        self.events
            .log(format!("Waiting {secs}s before next check"), LogLevel::Info);
        Duration::from_secs(secs)
    }

    /// Leave the running state, release the browser and zero the counters.
    pub async fn finish(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.probe.release().await;
        self.state = ScheduleState::default();
    }
}
