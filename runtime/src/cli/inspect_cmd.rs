// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! `slotwatch inspect <file>`: run the page heuristics on saved HTML.
//!
//! No browser is involved, so the reveal step is skipped and the earliest
//! slot is read from the target block, then from the page body.

use crate::cli::output;
use anyhow::{Context, Result};
use slotwatch::config::MonitorConfig;
use slotwatch::heuristics::snapshot::PageSnapshot;
use slotwatch::heuristics::{extract_earliest_time, extract_locations_from_raw_texts};
use slotwatch::probe::{check_result_from_snapshot, find_target};
use std::path::Path;

/// Run the inspect command.
pub async fn run(path: &Path, config: MonitorConfig) -> Result<()> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot = PageSnapshot::from_html(&html);

    let earliest = find_target(&snapshot, &config).and_then(|target| {
        extract_earliest_time(&target.raw_text)
            .or_else(|| extract_earliest_time(&snapshot.body_text))
    });
    let result = check_result_from_snapshot(&snapshot, &config, earliest);
    let locations = extract_locations_from_raw_texts(&snapshot.blocks, config.slot_type);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "file": path.display().to_string(),
            "blocks": snapshot.blocks.len(),
            "result": result,
            "locations": locations,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        println!(
            "  {}: {} text blocks\n",
            path.display(),
            snapshot.blocks.len()
        );
    }
    output::print_check_result(&result);
    if !output::is_quiet() && !locations.is_empty() {
        println!("\n  {} locations on page:", config.slot_type);
        for name in &locations {
            println!("    {name}");
        }
    }
    Ok(())
}
