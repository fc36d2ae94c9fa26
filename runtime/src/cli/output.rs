// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Terminal rendering for CLI commands.
//!
//! Global flags are mirrored into `SLOTWATCH_*` environment variables by
//! `main`, so every command can check them without threading arguments.

use indicatif::{ProgressBar, ProgressStyle};
use slotwatch::events::{LogLevel, MonitorEvent};
use slotwatch::probe::CheckResult;
use std::time::Duration;

pub fn is_json() -> bool {
    std::env::var_os("SLOTWATCH_JSON").is_some()
}

pub fn is_quiet() -> bool {
    std::env::var_os("SLOTWATCH_QUIET").is_some()
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

/// A stderr spinner, or `None` in quiet/JSON mode.
pub fn spinner(message: &str) -> Option<ProgressBar> {
    if is_quiet() || is_json() {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    Some(bar)
}

fn level_marker(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => " ",
        LogLevel::Success => "+",
        LogLevel::Warning => "!",
        LogLevel::Error => "x",
    }
}

/// Render one engine event.
///
/// JSON mode prints every event as one compact line. Human mode prints log
/// lines and notifications; quiet mode drops `info` lines.
pub fn print_event(event: &MonitorEvent) {
    if is_json() {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
        return;
    }

    match event {
        MonitorEvent::Log {
            timestamp,
            message,
            level,
        } => {
            if is_quiet() && *level == LogLevel::Info {
                return;
            }
            println!("  [{timestamp}] {} {message}", level_marker(*level));
        }
        MonitorEvent::SlotAvailable { title, body, .. } => {
            println!();
            println!("  *** {title} ***");
            for line in body.lines() {
                println!("      {line}");
            }
            println!();
        }
        MonitorEvent::Status { .. } | MonitorEvent::MonitoringState { .. } => {}
    }
}

/// Human summary of a single check.
pub fn print_check_result(result: &CheckResult) {
    let verdict = match result.available {
        Some(true) => "available",
        Some(false) => "unavailable",
        None => "unknown",
    };
    println!("  {}", result.status);
    println!("    Availability: {verdict}");
    if let Some(earliest) = &result.earliest_time {
        println!("    Earliest:     {earliest}");
    }
    println!("    Checked at:   {}", result.timestamp);
}
