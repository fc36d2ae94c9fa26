// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Availability classifier for a single location text block.
//!
//! The booking site renders one call-to-action per location: either a
//! "No Availability" label, or "Check Earliest Availability" /
//! "Select In Person Appointment" controls. When both show up in one block
//! the negative signal wins.

use crate::text::normalize;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn negative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)No Availability").expect("negative signal regex is valid"))
}

fn positive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Check Earliest Availability|Select In Person Appointment")
            .expect("positive signal regex is valid")
    })
}

/// Signals found in one block of page text.
///
/// A block with neither signal has `available == false` but stays
/// distinguishable from an explicit "No Availability" block through the two
/// flags. Callers must not collapse those cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub has_negative_signal: bool,
    pub has_positive_signal: bool,
    pub available: bool,
}

impl Availability {
    /// Either signal is present.
    pub fn has_status_hint(&self) -> bool {
        self.has_negative_signal || self.has_positive_signal
    }

    /// Tri-state verdict: `Some(true)` available, `Some(false)` explicitly
    /// unavailable, `None` when the block carries no usable signal.
    pub fn verdict(&self) -> Option<bool> {
        if self.available {
            Some(true)
        } else if self.has_negative_signal {
            Some(false)
        } else {
            None
        }
    }
}

/// Classify one raw text block.
pub fn classify(raw_text: &str) -> Availability {
    let text = normalize(raw_text);
    let has_negative_signal = negative_re().is_match(&text);
    let has_positive_signal = positive_re().is_match(&text);
    Availability {
        has_negative_signal,
        has_positive_signal,
        available: has_positive_signal && !has_negative_signal,
    }
}

/// A raw block together with its classification and slot-type match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedBlock {
    /// Normalized block text.
    pub raw_text: String,
    pub has_negative_signal: bool,
    pub has_positive_signal: bool,
    pub available: bool,
    /// The slot-type pattern ("Road Test", "Written Test") occurs in the text.
    pub type_matches: bool,
}

impl ClassifiedBlock {
    /// Classify `raw_text`, recording whether `type_pattern` matches it.
    pub fn new(raw_text: &str, type_pattern: &Regex) -> Self {
        let raw_text = normalize(raw_text);
        let availability = classify(&raw_text);
        let type_matches = type_pattern.is_match(&raw_text);
        Self {
            raw_text,
            has_negative_signal: availability.has_negative_signal,
            has_positive_signal: availability.has_positive_signal,
            available: availability.available,
            type_matches,
        }
    }

    pub fn availability(&self) -> Availability {
        Availability {
            has_negative_signal: self.has_negative_signal,
            has_positive_signal: self.has_positive_signal,
            available: self.available,
        }
    }

    pub fn has_status_hint(&self) -> bool {
        self.availability().has_status_hint()
    }
}
