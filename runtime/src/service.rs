// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Engine facade for hosts: one-off checks, location listing and at most one
//! monitoring session at a time.

use crate::config::{EngineSettings, MonitorConfig};
use crate::error::MonitorError;
use crate::events::{EventBus, LogLevel, MonitorEvent, StopReason};
use crate::monitor::{MonitorHandle, MonitorSession};
use crate::probe::{AvailabilityProbe, CheckResult, LocationList, SiteProbe};
use crate::renderer::chromium::ChromiumLauncher;
use crate::renderer::BrowserLauncher;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::info;

pub struct MonitorService {
    events: EventBus,
    launcher: Arc<dyn BrowserLauncher>,
    settings: EngineSettings,
    session: Mutex<Option<MonitorHandle>>,
}

impl MonitorService {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, settings: EngineSettings) -> Self {
        Self {
            events: EventBus::default(),
            launcher,
            settings,
            session: Mutex::new(None),
        }
    }

    /// A service backed by a local Chromium, configured from the environment.
    pub fn from_env() -> Self {
        let settings = EngineSettings::from_env();
        let launcher = Arc::new(ChromiumLauncher::new(settings.chromium_path.clone()));
        Self::new(launcher, settings)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    fn probe(&self, config: MonitorConfig) -> SiteProbe {
        SiteProbe::new(
            config,
            self.settings.clone(),
            Arc::clone(&self.launcher),
            self.events.clone(),
        )
    }

    /// Run a single cycle with a dedicated browser. No scheduling.
    pub async fn check_once(&self, config: MonitorConfig) -> Result<CheckResult, MonitorError> {
        let mut probe = self.probe(config);
        self.events.log("Initializing browser...", LogLevel::Info);
        let result = probe.check_availability().await;
        probe.cleanup().await;

        match &result {
            Ok(check) => {
                self.events.log(
                    format!("Status: {}", check.status),
                    match check.available {
                        Some(true) => LogLevel::Success,
                        Some(false) => LogLevel::Info,
                        None => LogLevel::Warning,
                    },
                );
                self.events
                    .status("Check complete", check.available, check.earliest_time.clone());
            }
            Err(e) => {
                self.events
                    .log(format!("Check once failed: {e}"), LogLevel::Error);
                self.events.status("Check failed", None, None);
            }
        }
        result
    }

    /// List every location offered for the config's slot type.
    pub async fn fetch_locations(
        &self,
        config: MonitorConfig,
    ) -> Result<LocationList, MonitorError> {
        let mut probe = self.probe(config);
        let result = probe.fetch_locations().await;
        probe.cleanup().await;
        if let Ok(list) = &result {
            self.events.log(
                format!("Found {} locations", list.locations.len()),
                LogLevel::Info,
            );
        }
        result
    }

    /// Start a session against the live site.
    pub async fn start_monitoring(&self, config: MonitorConfig) -> Result<(), MonitorError> {
        let probe = self.probe(config.clone());
        self.start_with_probe(config, probe).await
    }

    /// Start a session with a caller-supplied probe.
    pub async fn start_with_probe<P>(
        &self,
        config: MonitorConfig,
        probe: P,
    ) -> Result<(), MonitorError>
    where
        P: AvailabilityProbe + 'static,
    {
        let mut slot = self.session.lock().await;
        if slot.as_ref().is_some_and(|h| h.is_running()) {
            return Err(MonitorError::AlreadyRunning);
        }
        // A session that ended on its own still holds a finished task.
        if let Some(finished) = slot.take() {
            finished.stop(StopReason::Manual).await;
        }

        let session = MonitorSession::new(config, probe, self.events.clone());
        let handle = MonitorHandle::spawn(session, self.events.clone());
        info!(session = %handle.id(), "monitoring session spawned");
        *slot = Some(handle);
        Ok(())
    }

    /// Stop the running session. A no-op when nothing is running.
    pub async fn stop_monitoring(&self) {
        self.stop_with(StopReason::Manual).await;
    }

    /// Stop any running session because the host is going away.
    pub async fn shutdown(&self) {
        self.stop_with(StopReason::Shutdown).await;
    }

    async fn stop_with(&self, reason: StopReason) {
        let handle = self.session.lock().await.take();
        if let Some(handle) = handle {
            handle.stop(reason).await;
        }
    }

    pub async fn is_running(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| h.is_running())
    }
}
