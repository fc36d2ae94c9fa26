// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Block selection over one page read.
//!
//! A page read yields the text of every `div`, so the same location shows up
//! in its own card and again inside every wrapping container. Selection narrows
//! the candidates step by step and prefers short, clearly-signalled blocks.

use super::classify::ClassifiedBlock;
use super::location::extract_location_name;
use crate::config::SlotType;
use crate::text::normalize;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Priority of a candidate block; lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusRank {
    /// Positive signal only.
    Available = 0,
    /// Negative signal only.
    Unavailable = 1,
    /// Both signals.
    Conflicting = 2,
    /// Neither signal.
    Silent = 3,
}

impl StatusRank {
    pub fn of(block: &ClassifiedBlock) -> Self {
        match (block.has_positive_signal, block.has_negative_signal) {
            (true, false) => Self::Available,
            (false, true) => Self::Unavailable,
            (true, true) => Self::Conflicting,
            (false, false) => Self::Silent,
        }
    }
}

fn needle_pattern(needle: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Pick the block that best represents `location_needle` for `slot_type`.
///
/// 1. keep blocks containing the needle (case-insensitive),
/// 2. narrow to blocks mentioning the slot type, if any do,
/// 3. narrow to blocks with an availability signal, if any do,
/// 4. take the lowest [`StatusRank`], breaking ties by shortest text.
///
/// An empty needle or no containing block yields `None`.
pub fn pick_best_target_block<S: AsRef<str>>(
    blocks: &[S],
    location_needle: &str,
    slot_type: SlotType,
) -> Option<ClassifiedBlock> {
    let needle = normalize(location_needle);
    if needle.is_empty() {
        return None;
    }
    let location_re = needle_pattern(&needle)?;
    let type_re = slot_type.type_pattern();

    let candidates: Vec<ClassifiedBlock> = blocks
        .iter()
        .map(|b| normalize(b.as_ref()))
        .filter(|text| location_re.is_match(text))
        .map(|text| ClassifiedBlock::new(&text, type_re))
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let typed: Vec<&ClassifiedBlock> = candidates.iter().filter(|c| c.type_matches).collect();
    let typed_pool: Vec<&ClassifiedBlock> = if typed.is_empty() {
        candidates.iter().collect()
    } else {
        typed
    };

    let hinted: Vec<&ClassifiedBlock> = typed_pool
        .iter()
        .copied()
        .filter(|c| c.has_status_hint())
        .collect();
    let final_pool = if hinted.is_empty() { typed_pool } else { hinted };

    // min_by_key keeps the first of equal keys, matching a left fold that
    // only replaces on strictly better candidates.
    final_pool
        .into_iter()
        .min_by_key(|c| (StatusRank::of(c), c.raw_text.len()))
        .cloned()
}

/// Every distinct location offered for `slot_type` on one page read.
///
/// Only location cards (blocks with both "Get Directions" and the slot-type
/// pattern) are considered. Names are deduplicated case-insensitively keeping
/// the first-seen casing, then sorted case-insensitively.
pub fn extract_locations_from_raw_texts<S: AsRef<str>>(
    blocks: &[S],
    slot_type: SlotType,
) -> Vec<String> {
    let type_re = slot_type.type_pattern();
    let mut seen = HashSet::new();
    let mut locations = Vec::new();

    for block in blocks {
        let text = normalize(block.as_ref());
        if text.is_empty()
            || !text.to_lowercase().contains("get directions")
            || !type_re.is_match(&text)
        {
            continue;
        }
        let Some(name) = extract_location_name(&text) else {
            continue;
        };
        if seen.insert(name.to_lowercase()) {
            locations.push(name);
        }
    }

    locations.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    locations
}
