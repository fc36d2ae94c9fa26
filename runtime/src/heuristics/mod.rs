// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Text heuristics over rendered page text.
//!
//! Everything here is a pure function of strings: the browser layer hands
//! over the text of each `div`, and these modules turn it into an
//! availability verdict, a location list, and an earliest-slot string.

pub mod classify;
pub mod earliest;
pub mod location;
pub mod selection;
pub mod snapshot;

pub use classify::{classify, Availability, ClassifiedBlock};
pub use earliest::{extract_earliest_time, match_earliest, EarliestMatch, SlotPattern};
pub use location::extract_location_name;
pub use selection::{extract_locations_from_raw_texts, pick_best_target_block, StatusRank};
