// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Location display-name extraction.
//!
//! A location card renders as `<name><address><phone> Get Directions <action>`
//! with no separators between name and address once whitespace is collapsed.

use crate::text::normalize;
use regex::Regex;
use std::sync::OnceLock;

fn directions_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Get Directions").expect("directions regex is valid"))
}

fn find_location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^.*?\bFind Location\b").expect("find-location regex is valid")
    })
}

fn typed_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(.*?-\s*(?:Road Test(?:ing)?|Written Test(?:ing)?))(?:\d|\(|$)")
            .expect("typed location regex is valid")
    })
}

/// Extract a location's display name from its card text.
///
/// Returns the name including its slot-type suffix when one is present
/// (`"X Site - Road Testing"`); otherwise everything before the first digit,
/// since addresses start with a house number.
pub fn extract_location_name(raw_text: &str) -> Option<String> {
    let text = normalize(raw_text);
    if text.is_empty() {
        return None;
    }

    // An empty prefix (card starts with the link) falls back to the whole text.
    let before_directions = directions_re()
        .split(&text)
        .next()
        .filter(|head| !head.is_empty())
        .unwrap_or(&text);

    let candidate = find_location_re().replace(before_directions, "");
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    if let Some(name) = typed_name_re().captures(candidate).and_then(|c| c.get(1)) {
        return Some(normalize(name.as_str()));
    }

    let untyped = match candidate.find(|c: char| c.is_ascii_digit()) {
        Some(idx) => &candidate[..idx],
        None => candidate,
    };
    let untyped = normalize(untyped);
    if untyped.is_empty() {
        None
    } else {
        Some(untyped)
    }
}
