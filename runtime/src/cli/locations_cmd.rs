// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! `slotwatch locations`: list the locations offered for an appointment type.

use crate::cli::output;
use anyhow::Result;
use slotwatch::config::MonitorConfig;
use slotwatch::service::MonitorService;

/// Run the locations command.
pub async fn run(config: MonitorConfig) -> Result<()> {
    let service = MonitorService::from_env();
    let slot_type = config.slot_type;

    let spinner = output::spinner(&format!("Loading {slot_type} locations..."));
    let result = service.fetch_locations(config).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let list = result?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "slot_type": slot_type,
            "locations": list.locations,
            "timestamp": list.timestamp,
        }));
        return Ok(());
    }

    if list.locations.is_empty() {
        if !output::is_quiet() {
            println!("  No {slot_type} locations found on the page.");
        }
        return Ok(());
    }
    if !output::is_quiet() {
        println!("  {} {slot_type} locations:\n", list.locations.len());
    }
    for name in &list.locations {
        println!("    {name}");
    }
    Ok(())
}
