// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the monitoring engine.
//!
//! A location that cannot be found, or a block with no usable signal, is not
//! an error: those come back as a [`crate::probe::CheckResult`] with
//! `available == None`. Errors here are failed cycles and rejected requests.

/// All errors the engine reports.
#[derive(thiserror::Error, Debug)]
pub enum MonitorError {
    #[error("Monitoring already running")]
    AlreadyRunning,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Browser unavailable: {0}")]
    BrowserUnavailable(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Page script failed: {0}")]
    Script(String),

    #[error("Unexpected page script result: {0}")]
    UnexpectedScriptResult(String),
}

impl MonitorError {
    /// Whether the failure comes from the page or the network and may clear
    /// up on the next cycle.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Navigation { .. } | Self::Script(_) | Self::UnexpectedScriptResult(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = MonitorError::Navigation {
            url: "https://example.test".to_string(),
            reason: "navigation timed out after 35000ms".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Navigation to https://example.test failed: navigation timed out after 35000ms"
        );
        assert_eq!(MonitorError::AlreadyRunning.to_string(), "Monitoring already running");
    }

    #[test]
    fn test_transient() {
        assert!(MonitorError::Script("boom".into()).is_transient());
        assert!(!MonitorError::AlreadyRunning.is_transient());
        assert!(!MonitorError::BrowserUnavailable("missing".into()).is_transient());
    }
}
