// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-page scripts.
//!
//! Each script only gathers text or pokes one control and returns plain JSON;
//! every decision about that text is made on the Rust side.

use serde::Deserialize;

/// Location cards on the booking page.
const CARD_SELECTOR: &str = "#locationsDiv > div, #locationListColumn #locationsDiv > div";

/// Text of every `div`, whitespace-collapsed, in document order.
pub const READ_BLOCKS: &str = r#"Array.from(document.querySelectorAll("div")).map((el) => (el.textContent || "").replace(/\s+/g, " ").trim())"#;

/// Rendered text of the whole body.
pub const BODY_TEXT: &str = r#"(() => {
  const txt = document.body ? document.body.innerText : "";
  return (txt || "").replace(/\s+/g, " ").trim();
})()"#;

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn find_card_fn(needle_lower: &str) -> String {
    format!(
        r#"const normalize = (txt) => (txt || "").replace(/\s+/g, " ").trim();
  const needle = {needle};
  const cards = Array.from(document.querySelectorAll({selector}));
  const card = cards.find((item) => normalize(item.textContent).toLowerCase().includes(needle));"#,
        needle = js_string(needle_lower),
        selector = js_string(CARD_SELECTOR),
    )
}

/// Trigger "Check Earliest Availability" on the card containing `needle_lower`.
///
/// Prefers calling the page's own `CheckAvailability(id)` with the id from
/// the link target, falling back to a click. Returns a [`RevealMeta`].
pub fn reveal(needle_lower: &str) -> String {
    format!(
        r#"(() => {{
  {find_card}
  if (!card) {{
    return {{ clicked: false }};
  }}
  const beforeText = normalize(card.textContent);
  const link = card.querySelector("a[href^='javascript:CheckAvailability(']");
  if (!link) {{
    return {{ clicked: false, beforeText }};
  }}
  const href = link.getAttribute("href") || "";
  const idMatch = href.match(/CheckAvailability\((\d+)\)/i);
  const appointmentId = idMatch ? Number(idMatch[1]) : null;
  if (appointmentId && typeof window.CheckAvailability === "function") {{
    window.CheckAvailability(appointmentId);
  }} else if (typeof link.click === "function") {{
    link.click();
  }} else {{
    link.dispatchEvent(new MouseEvent("click", {{ bubbles: true }}));
  }}
  return {{ clicked: true, appointmentId, beforeText }};
}})()"#,
        find_card = find_card_fn(needle_lower),
    )
}

/// Predicate: the card's text changed from `before_text` and now mentions
/// availability.
pub fn reveal_settled(needle_lower: &str, before_text: &str) -> String {
    format!(
        r#"(() => {{
  {find_card}
  if (!card) {{
    return false;
  }}
  const current = normalize(card.textContent);
  if (!current || current === {before}) {{
    return false;
  }}
  const lower = current.toLowerCase();
  return lower.includes("available") || lower.includes("no availability");
}})()"#,
        find_card = find_card_fn(needle_lower),
        before = js_string(before_text),
    )
}

/// Current text of the card containing `needle_lower`, or `""`.
pub fn card_text(needle_lower: &str) -> String {
    format!(
        r#"(() => {{
  {find_card}
  return card ? normalize(card.textContent) : "";
}})()"#,
        find_card = find_card_fn(needle_lower),
    )
}

/// What [`reveal`] reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealMeta {
    pub clicked: bool,
    #[serde(default)]
    pub appointment_id: Option<u64>,
    #[serde(default)]
    pub before_text: Option<String>,
}
