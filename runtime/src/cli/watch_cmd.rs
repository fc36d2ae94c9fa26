// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! `slotwatch watch`: poll until Ctrl-C or the error limit.

use crate::cli::output;
use anyhow::{bail, Result};
use slotwatch::config::MonitorConfig;
use slotwatch::events::{MonitorEvent, StopReason};
use slotwatch::service::MonitorService;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Run the watch command.
pub async fn run(config: MonitorConfig) -> Result<()> {
    let service = MonitorService::from_env();
    let mut rx = service.subscribe();
    service.start_monitoring(config).await?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let reason = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                if !output::is_quiet() && !output::is_json() {
                    eprintln!("  Stopping (waiting for the current check to finish)...");
                }
                service.shutdown().await;
                while let Ok(event) = rx.try_recv() {
                    output::print_event(&event);
                }
                break Some(StopReason::Shutdown);
            }
            event = rx.recv() => match event {
                Ok(event) => {
                    output::print_event(&event);
                    if let MonitorEvent::MonitoringState { running: false, reason } = event {
                        break reason;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("dropped {skipped} events"),
                Err(RecvError::Closed) => break None,
            }
        }
    };

    match reason {
        Some(StopReason::ErrorLimit) => bail!("monitoring stopped after repeated errors"),
        Some(StopReason::StartFailure) => bail!("monitoring task failed"),
        _ => Ok(()),
    }
}
