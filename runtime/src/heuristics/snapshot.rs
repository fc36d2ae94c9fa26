// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page snapshots: the text blocks one page read produces.
//!
//! A live read comes from the browser (`document.querySelectorAll("div")`);
//! an offline read parses saved HTML with `scraper` into the same shape, so
//! the heuristics never care where the text came from.
//!
//! `scraper` types are `!Send`; parse inside a sync function and hand back
//! owned strings.

use crate::text::normalize;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Normalized text of every `div`, in document order, plus the page body text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub blocks: Vec<String>,
    pub body_text: String,
}

impl PageSnapshot {
    /// Build a snapshot from already-extracted block texts.
    pub fn from_blocks<S: AsRef<str>>(blocks: &[S]) -> Self {
        let blocks: Vec<String> = blocks.iter().map(|b| normalize(b.as_ref())).collect();
        let body_text = normalize(&blocks.join(" "));
        Self { blocks, body_text }
    }

    /// Parse saved page HTML.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let mut blocks = Vec::new();
        if let Ok(sel) = Selector::parse("div") {
            for el in document.select(&sel) {
                blocks.push(normalize(&el.text().collect::<String>()));
            }
        }

        let mut body_text = String::new();
        if let Ok(sel) = Selector::parse("body") {
            if let Some(body) = document.select(&sel).next() {
                body_text = normalize(&body.text().collect::<Vec<_>>().join(" "));
            }
        }

        Self { blocks, body_text }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
