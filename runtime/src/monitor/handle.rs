// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Background driver for a monitoring session.

use super::session::{CycleOutcome, MonitorSession};
use crate::events::{EventBus, LogLevel, StopReason};
use crate::probe::AvailabilityProbe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

/// A running session. Dropping the handle leaves the session running; call
/// [`MonitorHandle::stop`] to end it.
pub struct MonitorHandle {
    id: Uuid,
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
    task: JoinHandle<()>,
    events: EventBus,
}

impl MonitorHandle {
    /// Start `session` and run its first cycle immediately.
    pub fn spawn<P>(mut session: MonitorSession<P>, events: EventBus) -> Self
    where
        P: AvailabilityProbe + 'static,
    {
        let id = Uuid::new_v4();
        session.start();
        let running = session.running_flag();
        let stop = Arc::new(Notify::new());

        let driver = tokio::spawn(drive(session, Arc::clone(&stop), events.clone(), id));
        let task = tokio::spawn(supervise(driver, Arc::clone(&running), events.clone(), id));

        Self {
            id,
            running,
            stop,
            task,
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the session and wait for its browser to be released.
    ///
    /// An in-flight cycle runs to completion and its result is dropped.
    /// Returns `false` if the session had already ended on its own.
    pub async fn stop(self, reason: StopReason) -> bool {
        let was_running = self.running.swap(false, Ordering::SeqCst);
        self.stop.notify_one();
        if let Err(e) = self.task.await {
            warn!(session = %self.id, "monitor task join failed: {e}");
        }

        if was_running {
            info!(session = %self.id, reason = %reason, "monitoring stopped");
            self.events.running_state(false, Some(reason));
            self.events.log("Monitoring stopped", LogLevel::Info);
            self.events.status("Stopped", None, None);
        }
        was_running
    }
}

async fn drive<P: AvailabilityProbe>(
    mut session: MonitorSession<P>,
    stop: Arc<Notify>,
    events: EventBus,
    id: Uuid,
) {
    loop {
        match session.run_cycle().await {
            CycleOutcome::Continue => {}
            CycleOutcome::Stopped => break,
            CycleOutcome::ErrorLimit => {
                session.finish().await;
                info!(session = %id, "monitoring stopped by error limit");
                events.running_state(false, Some(StopReason::ErrorLimit));
                return;
            }
        }
        if !session.is_running() {
            break;
        }

        let wait = session.next_wait();
        tokio::select! {
            _ = stop.notified() => break,
            _ = tokio::time::sleep(wait) => {}
        }
    }
    session.finish().await;
}

async fn supervise(driver: JoinHandle<()>, running: Arc<AtomicBool>, events: EventBus, id: Uuid) {
    let Err(e) = driver.await else {
        return;
    };
    if e.is_panic() && running.swap(false, Ordering::SeqCst) {
        error!(session = %id, "monitoring task panicked: {e}");
        events.log(format!("Start monitoring failure: {e}"), LogLevel::Error);
        events.running_state(false, Some(StopReason::StartFailure));
    }
}
