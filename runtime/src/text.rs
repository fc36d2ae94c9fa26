// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Whitespace normalization shared by every heuristic.

/// Collapse every whitespace run to a single space and trim both ends.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize`] for optional input; `None` yields an empty string.
pub fn normalize_opt(value: Option<&str>) -> String {
    value.map(normalize).unwrap_or_default()
}
