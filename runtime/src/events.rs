// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Slotwatch event bus: one-way notifications from the engine.
//!
//! The EventBus is a `tokio::sync::broadcast` channel that carries
//! [`MonitorEvent`] values. Any number of hosts can subscribe independently.
//! When no subscribers exist, events are silently dropped; the engine never
//! depends on delivery.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Severity of an operator-facing log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Why a monitoring session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Operator asked to stop.
    Manual,
    /// Too many consecutive failed cycles.
    ErrorLimit,
    /// The host process is shutting down.
    Shutdown,
    /// The session's driver task died unexpectedly.
    StartFailure,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::ErrorLimit => "error_limit",
            Self::Shutdown => "shutdown",
            Self::StartFailure => "start_failure",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every event the engine emits. Serialized to JSON for `--json` output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MonitorEvent {
    /// An operator-facing log line.
    Log {
        timestamp: String,
        message: String,
        level: LogLevel,
    },
    /// Latest status snapshot.
    Status {
        status: String,
        /// `Some(true)` available, `Some(false)` unavailable, `None` unknown.
        availability: Option<bool>,
        last_check: String,
        earliest_time: Option<String>,
    },
    /// A session started or stopped.
    MonitoringState {
        running: bool,
        reason: Option<StopReason>,
    },
    /// A slot just became available. Emitted once per availability streak.
    SlotAvailable {
        title: String,
        body: String,
        location: String,
        earliest_time: Option<String>,
        checked_at: String,
    },
}

/// The central event bus.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MonitorEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers. Silently ignores if no subscribers.
    pub fn emit(&self, event: MonitorEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    /// Emit a [`MonitorEvent::Log`] stamped with the current time.
    pub fn log(&self, message: impl Into<String>, level: LogLevel) {
        self.emit(MonitorEvent::Log {
            timestamp: now_timestamp(),
            message: message.into(),
            level,
        });
    }

    /// Emit a [`MonitorEvent::Status`] stamped with the current time.
    pub fn status(
        &self,
        status: impl Into<String>,
        availability: Option<bool>,
        earliest_time: Option<String>,
    ) {
        self.emit(MonitorEvent::Status {
            status: status.into(),
            availability,
            last_check: now_timestamp(),
            earliest_time,
        });
    }

    pub fn running_state(&self, running: bool, reason: Option<StopReason>) {
        self.emit(MonitorEvent::MonitoringState { running, reason });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Local wall-clock time as `YYYY-MM-DD HH:MM:SS`.
pub fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = MonitorEvent::Status {
            status: "Monitoring".to_string(),
            availability: None,
            last_check: "2026-03-14 09:25:00".to_string(),
            earliest_time: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Status\""));
        assert!(json.contains("\"availability\":null"));
    }

    #[test]
    fn test_stop_reason_serialization() {
        let event = MonitorEvent::MonitoringState {
            running: false,
            reason: Some(StopReason::ErrorLimit),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"error_limit\""));
        assert_eq!(StopReason::Manual.to_string(), "manual");
    }

    #[test]
    fn test_event_bus_emit_no_subscribers() {
        let bus = EventBus::new(16);
        bus.log("nobody listening", LogLevel::Info);
    }

    #[test]
    fn test_event_bus_subscribe_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.log("Browser closed", LogLevel::Info);

        match rx.try_recv().unwrap() {
            MonitorEvent::Log { message, level, .. } => {
                assert_eq!(message, "Browser closed");
                assert_eq!(level, LogLevel::Info);
            }
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_format() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert_eq!(&ts[13..14], ":");
    }
}
