// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the slotwatch binary.

pub mod check_cmd;
pub mod inspect_cmd;
pub mod locations_cmd;
pub mod output;
pub mod watch_cmd;

use anyhow::Result;
use clap::{Args, ValueEnum};
use slotwatch::config::{MonitorConfig, SlotType, DEFAULT_INTERVAL_SECS, DEFAULT_LOCATION};

/// Appointment type as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlotTypeArg {
    /// Written (permit) test
    Permit,
    /// Road test
    RoadTest,
}

impl From<SlotTypeArg> for SlotType {
    fn from(arg: SlotTypeArg) -> Self {
        match arg {
            SlotTypeArg::Permit => SlotType::Permit,
            SlotTypeArg::RoadTest => SlotType::RoadTest,
        }
    }
}

/// Which appointments to look at.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Appointment type
    #[arg(long = "type", value_enum, default_value_t = SlotTypeArg::Permit)]
    pub slot_type: SlotTypeArg,

    /// Location display name (substring match, case-insensitive)
    #[arg(long, default_value = DEFAULT_LOCATION)]
    pub location: String,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,
}

impl TargetArgs {
    pub fn into_config(self, interval_secs: u64) -> Result<MonitorConfig> {
        Ok(MonitorConfig::new(
            self.slot_type.into(),
            &self.location,
            !self.headed,
            interval_secs,
        )?)
    }

    pub fn into_check_config(self) -> Result<MonitorConfig> {
        self.into_config(DEFAULT_INTERVAL_SECS)
    }
}
