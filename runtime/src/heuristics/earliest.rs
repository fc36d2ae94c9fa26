// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Earliest-slot extraction from free text.
//!
//! Patterns are tried in a fixed priority order and the first one that
//! matches wins; they are never combined into a single alternation.

use crate::text::normalize;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const MONTH: &str = "(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Oct|Nov|Dec)";

/// The date/time shapes the booking site is known to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotPattern {
    /// `February 26, 16 available.` (the site puts a slot count where a year would be).
    MonthDayCount,
    /// `March 14, 2026 at 9:25 AM`
    MonthDayYearTime,
    /// `03/14/2026 9:25 AM`
    NumericDateTime,
    /// `March 14, 2026`
    MonthDayYear,
}

impl SlotPattern {
    /// Every pattern, highest priority first.
    pub const PRIORITY: [SlotPattern; 4] = [
        SlotPattern::MonthDayCount,
        SlotPattern::MonthDayYearTime,
        SlotPattern::NumericDateTime,
        SlotPattern::MonthDayYear,
    ];

    fn source(self) -> String {
        match self {
            Self::MonthDayCount => format!(r"(?i-u)\b({MONTH}\s+\d{{1,2}},\s+\d+\s+available\.?)\b"),
            Self::MonthDayYearTime => format!(
                r"(?i-u)\b({MONTH}\s+\d{{1,2}},\s+\d{{4}}\s*(?:at\s*)?\d{{1,2}}:\d{{2}}\s*(?:AM|PM))\b"
            ),
            Self::NumericDateTime => {
                r"(?i-u)\b(\d{1,2}/\d{1,2}/\d{4}\s+\d{1,2}:\d{2}\s*(?:AM|PM))\b".to_string()
            }
            Self::MonthDayYear => format!(r"(?i-u)\b({MONTH}\s+\d{{1,2}},\s+\d{{4}})\b"),
        }
    }

    fn regex(self) -> &'static Regex {
        static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
        let all = COMPILED.get_or_init(|| {
            Self::PRIORITY
                .iter()
                .map(|p| Regex::new(&p.source()).expect("slot pattern regex is valid"))
                .collect()
        });
        &all[self as usize]
    }

    /// Match this single pattern against already-normalized text.
    pub fn find(self, text: &str) -> Option<String> {
        self.regex()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| normalize(m.as_str()))
    }
}

/// A successful extraction and the pattern that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarliestMatch {
    pub pattern: SlotPattern,
    pub text: String,
}

/// Run the patterns in priority order and return the first match.
pub fn match_earliest(raw_text: &str) -> Option<EarliestMatch> {
    let text = normalize(raw_text);
    if text.is_empty() {
        return None;
    }
    SlotPattern::PRIORITY.iter().find_map(|&pattern| {
        pattern
            .find(&text)
            .map(|text| EarliestMatch { pattern, text })
    })
}

/// Pull a human-readable earliest slot out of `raw_text`.
pub fn extract_earliest_time(raw_text: &str) -> Option<String> {
    match_earliest(raw_text).map(|m| m.text)
}
