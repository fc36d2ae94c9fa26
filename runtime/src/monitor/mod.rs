// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Monitoring scheduler.
//!
//! A [`MonitorSession`] owns the counters and the probe for one session;
//! a [`MonitorHandle`] runs it on a background task with jittered waits
//! between cycles and stops it on request.

pub mod handle;
pub mod jitter;
pub mod session;

pub use handle::MonitorHandle;
pub use jitter::{interval_bounds, jitter_span, next_interval};
pub use session::{CycleOutcome, MonitorSession, ScheduleState, ERROR_LIMIT, NOTIFICATION_TITLE};
