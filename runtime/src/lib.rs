// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Slotwatch runtime library: appointment-slot monitoring engine.
//!
//! Page heuristics are pure functions over text blocks (`heuristics`); the
//! browser only supplies that text (`renderer`, `probe`). The scheduler
//! (`monitor`) polls with jittered waits behind a circuit breaker, and
//! `service` is the facade hosts talk to. Everything observable leaves the
//! engine through the `events` bus.

pub mod config;
pub mod error;
pub mod events;
pub mod heuristics;
pub mod monitor;
pub mod probe;
pub mod renderer;
pub mod service;
pub mod text;
