// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! `slotwatch check`: run a single availability check.

use crate::cli::output;
use anyhow::Result;
use slotwatch::config::MonitorConfig;
use slotwatch::service::MonitorService;

/// Run the check command.
pub async fn run(config: MonitorConfig) -> Result<()> {
    let service = MonitorService::from_env();
    let mut rx = service.subscribe();

    let spinner = output::spinner(&format!(
        "Checking {} ({})...",
        config.location_name, config.slot_type
    ));
    let result = service.check_once(config).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    if !output::is_json() {
        while let Ok(event) = rx.try_recv() {
            output::print_event(&event);
        }
    }

    let result = result?;
    if output::is_json() {
        output::print_json(&serde_json::to_value(&result)?);
    } else {
        output::print_check_result(&result);
    }
    Ok(())
}
