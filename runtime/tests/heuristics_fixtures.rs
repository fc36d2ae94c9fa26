//! Page heuristics against saved booking-page markup.
//!
//! The fixture mirrors the site's layout: a column wrapper, a list wrapper,
//! and one card per location, so every card's text also appears inside two
//! containers.

use slotwatch::config::{MonitorConfig, SlotType, DEFAULT_LOCATION};
use slotwatch::heuristics::snapshot::PageSnapshot;
use slotwatch::heuristics::{
    classify, extract_earliest_time, extract_location_name, extract_locations_from_raw_texts,
    pick_best_target_block, StatusRank,
};
use slotwatch::probe::{check_result_from_snapshot, STATUS_NOT_FOUND};

const BOOKING_PAGE: &str = r##"<!DOCTYPE html>
<html>
<body>
  <div id="locationListColumn">
    <div id="locationsDiv">
      <div class="card">Catlettsburg Regional Testing Site - Road Testing<br>2900 Louisa St<br>Catlettsburg, KY 41129 (606) 385-1531
        <a href="#">Get Directions</a>
        <a href="javascript:CheckAvailability(12)">Check Earliest Availability</a>
      </div>
      <div class="card">Louisville(Bowman) Regional Test Site - Road Test<br>3501 Roger E Schupp St
        <a href="#">Get Directions</a>
        <span>No Availability</span>
      </div>
      <div class="card">Hazard Regional Testing Site - Written Testing<br>100 Main St
        <a href="#">Get Directions</a>
        <a href="#">Select In Person Appointment</a>
      </div>
    </div>
  </div>
</body>
</html>"##;

const REVEALED_PAGE: &str = r##"<html><body>
  <div id="locationsDiv">
    <div class="card">Catlettsburg Regional Testing Site - Road Testing<br>2900 Louisa St
      <a href="#">Get Directions</a>
      <a href="javascript:CheckAvailability(12)">Check Earliest Availability</a>
      <p>Earliest: February 26, 16 available.</p>
    </div>
  </div>
  <footer>Questions? Call 03/14/2026 9:25 AM</footer>
</body></html>"##;

fn road_test(location: &str) -> MonitorConfig {
    MonitorConfig::new(SlotType::RoadTest, location, true, 60).unwrap()
}

#[test]
fn test_snapshot_reads_every_div() {
    let snapshot = PageSnapshot::from_html(BOOKING_PAGE);
    assert_eq!(snapshot.blocks.len(), 5);
    assert!(snapshot.blocks[2].starts_with("Catlettsburg Regional Testing Site - Road Testing2900"));
    assert!(snapshot.body_text.contains("Select In Person Appointment"));
}

#[test]
fn test_available_card_beats_containers() {
    let snapshot = PageSnapshot::from_html(BOOKING_PAGE);
    let target = pick_best_target_block(
        &snapshot.blocks,
        "Catlettsburg Regional Testing Site",
        SlotType::RoadTest,
    )
    .unwrap();
    assert_eq!(StatusRank::of(&target), StatusRank::Available);
    assert!(target.raw_text.starts_with("Catlettsburg"));
    assert!(!target.raw_text.contains("Louisville"));
}

#[test]
fn test_default_location_is_unavailable() {
    let snapshot = PageSnapshot::from_html(BOOKING_PAGE);
    let result = check_result_from_snapshot(&snapshot, &road_test(""), None);
    assert!(result.found);
    assert_eq!(result.available, Some(false));
    assert_eq!(
        result.status,
        format!("No appointment available ({DEFAULT_LOCATION})")
    );
}

#[test]
fn test_unknown_location() {
    let snapshot = PageSnapshot::from_html(BOOKING_PAGE);
    let result = check_result_from_snapshot(&snapshot, &road_test("Paducah"), None);
    assert!(!result.found);
    assert_eq!(result.available, None);
    assert_eq!(result.status, STATUS_NOT_FOUND);
}

#[test]
fn test_permit_card_uses_in_person_signal() {
    let snapshot = PageSnapshot::from_html(BOOKING_PAGE);
    let config = MonitorConfig::new(SlotType::Permit, "hazard regional", true, 60).unwrap();
    let result = check_result_from_snapshot(
        &snapshot,
        &config,
        Some("March 14, 2026".to_string()),
    );
    assert_eq!(result.available, Some(true));
    assert_eq!(result.earliest_time.as_deref(), Some("March 14, 2026"));
}

#[test]
fn test_locations_per_slot_type() {
    let snapshot = PageSnapshot::from_html(BOOKING_PAGE);
    assert_eq!(
        extract_locations_from_raw_texts(&snapshot.blocks, SlotType::RoadTest),
        [
            "Catlettsburg Regional Testing Site - Road Testing",
            "Louisville(Bowman) Regional Test Site - Road Test",
        ]
    );
    // Wrappers are named after their first card, so check permits per card.
    assert_eq!(
        extract_locations_from_raw_texts(&snapshot.blocks[2..], SlotType::Permit),
        ["Hazard Regional Testing Site - Written Testing"]
    );
}

#[test]
fn test_locations_dedup_and_sort() {
    let blocks = [
        "B Site - Road Test100 Main St Get DirectionsNo Availability",
        "A Site - Road Test200 Main St Get DirectionsCheck Earliest Availability Select In Person Appointment",
        "A Site - Road Test200 Main St Get DirectionsCheck Earliest Availability Select In Person Appointment",
        "Some unrelated container text",
    ];
    assert_eq!(
        extract_locations_from_raw_texts(&blocks, SlotType::RoadTest),
        ["A Site - Road Test", "B Site - Road Test"]
    );
}

#[test]
fn test_revealed_card_prefers_card_text() {
    let snapshot = PageSnapshot::from_html(REVEALED_PAGE);
    let target = pick_best_target_block(&snapshot.blocks, "Catlettsburg", SlotType::RoadTest)
        .unwrap();
    assert_eq!(
        extract_earliest_time(&target.raw_text).as_deref(),
        Some("February 26, 16 available")
    );
    // The page-wide scan finds the card's slot first too.
    assert_eq!(
        extract_earliest_time(&snapshot.body_text).as_deref(),
        Some("February 26, 16 available")
    );
}

#[test]
fn test_classifier_cases() {
    let open = classify("A Site Check Earliest Availability");
    assert!(open.available);

    let closed = classify("A Site No Availability");
    assert!(!closed.available);
    assert!(closed.has_negative_signal);

    let silent = classify("A Site loading");
    assert!(!silent.available);
    assert!(!silent.has_negative_signal && !silent.has_positive_signal);
    assert_ne!(silent, closed);
}

#[test]
fn test_location_name_from_card() {
    assert_eq!(
        extract_location_name(
            "Catlettsburg Regional Testing Site - Road Testing2900 Louisa St Catlettsburg, KY 41129 \
             (606) 385-1531 Get Directions Check Earliest Availability"
        )
        .as_deref(),
        Some("Catlettsburg Regional Testing Site - Road Testing")
    );
}
