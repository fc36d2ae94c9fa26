// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Monitoring configuration.
//!
//! [`MonitorConfig`] is fixed for the lifetime of one monitoring session.
//! [`EngineSettings`] holds browser timings and is read from the environment.

use crate::error::MonitorError;
use crate::text::normalize;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Location watched when the operator does not name one.
pub const DEFAULT_LOCATION: &str = "Louisville(Bowman) Regional Test Site";

/// Base poll interval when none is given.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

const ROAD_TEST_URL: &str = "https://telegov.egov.com/ksp/AppointmentWizard/55";
const PERMIT_URL: &str = "https://telegov.egov.com/ksp/AppointmentWizard/56";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Kind of appointment being watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    /// Written permit test.
    #[default]
    Permit,
    /// Driving road test.
    RoadTest,
}

impl SlotType {
    /// Name the booking site uses for this type.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Permit => "Written Test",
            Self::RoadTest => "Road Test",
        }
    }

    /// Booking page listing locations for this type.
    pub fn url(self) -> &'static str {
        match self {
            Self::Permit => PERMIT_URL,
            Self::RoadTest => ROAD_TEST_URL,
        }
    }

    /// Case-insensitive pattern marking a block as belonging to this type.
    pub fn type_pattern(self) -> &'static Regex {
        static ROAD: OnceLock<Regex> = OnceLock::new();
        static WRITTEN: OnceLock<Regex> = OnceLock::new();
        match self {
            Self::RoadTest => ROAD.get_or_init(|| {
                Regex::new(r"(?i)Road Test(?:ing)?").expect("road test regex is valid")
            }),
            Self::Permit => WRITTEN.get_or_init(|| {
                Regex::new(r"(?i)Written Test(?:ing)?").expect("written test regex is valid")
            }),
        }
    }
}

impl std::fmt::Display for SlotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Immutable per-session monitoring configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub slot_type: SlotType,
    /// Normalized display name of the target location.
    pub location_name: String,
    pub headless: bool,
    /// Base poll interval in seconds, at least 1.
    pub interval_secs: u64,
}

impl MonitorConfig {
    /// Validate and build a config. An empty location resolves to
    /// [`DEFAULT_LOCATION`].
    pub fn new(
        slot_type: SlotType,
        location_name: &str,
        headless: bool,
        interval_secs: u64,
    ) -> Result<Self, MonitorError> {
        if interval_secs < 1 {
            return Err(MonitorError::InvalidConfig(
                "interval must be at least 1 second".to_string(),
            ));
        }
        let mut location_name = normalize(location_name);
        if location_name.is_empty() {
            location_name = DEFAULT_LOCATION.to_string();
        }
        Ok(Self {
            slot_type,
            location_name,
            headless,
            interval_secs,
        })
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            slot_type: SlotType::default(),
            location_name: DEFAULT_LOCATION.to_string(),
            headless: true,
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

/// Browser timings and launch options.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub navigation_timeout: Duration,
    /// Pause after the document loads while the site renders its location list.
    pub settle_delay: Duration,
    /// Upper bound on waiting for the reveal action to change the location card.
    pub reveal_timeout: Duration,
    /// Fixed pause used when the reveal wait times out.
    pub reveal_fallback_delay: Duration,
    pub user_agent: String,
    pub chromium_path: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_millis(35_000),
            settle_delay: Duration::from_millis(1_200),
            reveal_timeout: Duration::from_millis(9_000),
            reveal_fallback_delay: Duration::from_millis(1_200),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chromium_path: None,
        }
    }
}

impl EngineSettings {
    /// Read overrides from `SLOTWATCH_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            navigation_timeout: read_env_millis(
                "SLOTWATCH_NAV_TIMEOUT_MS",
                defaults.navigation_timeout,
            ),
            settle_delay: read_env_millis("SLOTWATCH_SETTLE_MS", defaults.settle_delay),
            reveal_timeout: read_env_millis("SLOTWATCH_REVEAL_TIMEOUT_MS", defaults.reveal_timeout),
            reveal_fallback_delay: read_env_millis(
                "SLOTWATCH_REVEAL_FALLBACK_MS",
                defaults.reveal_fallback_delay,
            ),
            user_agent: read_env_string("SLOTWATCH_USER_AGENT")
                .filter(|ua| !ua.is_empty())
                .unwrap_or(defaults.user_agent),
            chromium_path: read_env_string("SLOTWATCH_CHROMIUM_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }
}

fn read_env_millis(name: &str, default_value: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default_value)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string())
}
