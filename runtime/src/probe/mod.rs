// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Browser interaction for one check cycle.
//!
//! [`SiteProbe`] keeps one browser alive across cycles but opens a fresh,
//! isolated context for every read and closes it on every exit path. The
//! browser only supplies text; [`check_result_from_snapshot`] and the
//! heuristics decide what it means.

pub mod scripts;

use crate::config::{EngineSettings, MonitorConfig};
use crate::error::MonitorError;
use crate::events::{now_timestamp, EventBus, LogLevel};
use crate::heuristics::snapshot::PageSnapshot;
use crate::heuristics::{
    extract_earliest_time, extract_locations_from_raw_texts, pick_best_target_block,
    ClassifiedBlock,
};
use crate::renderer::{BrowserLauncher, RenderContext, Renderer};
use async_trait::async_trait;
use scripts::RevealMeta;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Status reported when the target location is missing from the page.
pub const STATUS_NOT_FOUND: &str = "Location not found on page";

/// Outcome of one check cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The target location was found on the page.
    pub found: bool,
    /// `Some(true)` slot found, `Some(false)` explicitly none, `None` unknown.
    pub available: Option<bool>,
    pub status: String,
    pub timestamp: String,
    pub earliest_time: Option<String>,
}

/// Distinct locations offered for a slot type on one page read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationList {
    pub locations: Vec<String>,
    pub timestamp: String,
}

/// Pick the target block out of a snapshot.
pub fn find_target(snapshot: &PageSnapshot, config: &MonitorConfig) -> Option<ClassifiedBlock> {
    pick_best_target_block(&snapshot.blocks, &config.location_name, config.slot_type)
}

/// Build the cycle result for a page read.
///
/// `earliest_time` is only kept when the target is available.
pub fn check_result_from_snapshot(
    snapshot: &PageSnapshot,
    config: &MonitorConfig,
    earliest_time: Option<String>,
) -> CheckResult {
    let target = find_target(snapshot, config);
    check_result_for_target(target.as_ref(), &config.location_name, earliest_time)
}

fn check_result_for_target(
    target: Option<&ClassifiedBlock>,
    location: &str,
    earliest_time: Option<String>,
) -> CheckResult {
    let Some(target) = target else {
        return CheckResult {
            found: false,
            available: None,
            status: STATUS_NOT_FOUND.to_string(),
            timestamp: now_timestamp(),
            earliest_time: None,
        };
    };

    let availability = target.availability();
    let status = match availability.verdict() {
        Some(true) => format!("Available appointment found ({location})"),
        Some(false) => format!("No appointment available ({location})"),
        None => format!("Unknown availability status ({location})"),
    };

    CheckResult {
        found: true,
        available: availability.verdict(),
        status,
        timestamp: now_timestamp(),
        earliest_time: if availability.available {
            earliest_time
        } else {
            None
        },
    }
}

/// One full check cycle against the booking site.
///
/// The scheduler only talks to this seam, so it can be driven by a scripted
/// probe in tests.
#[async_trait]
pub trait AvailabilityProbe: Send {
    /// Run one cycle: read the page and classify the target location.
    async fn check(&mut self) -> Result<CheckResult, MonitorError>;
    /// Release the browser. Never fails.
    async fn release(&mut self);
}

/// Drives a real browser against the booking page.
pub struct SiteProbe {
    config: MonitorConfig,
    settings: EngineSettings,
    launcher: Arc<dyn BrowserLauncher>,
    renderer: Option<Arc<dyn Renderer>>,
    events: EventBus,
}

impl SiteProbe {
    pub fn new(
        config: MonitorConfig,
        settings: EngineSettings,
        launcher: Arc<dyn BrowserLauncher>,
        events: EventBus,
    ) -> Self {
        Self {
            config,
            settings,
            launcher,
            renderer: None,
            events,
        }
    }

    async fn ensure_browser(&mut self) -> Result<Arc<dyn Renderer>, MonitorError> {
        if let Some(renderer) = &self.renderer {
            return Ok(Arc::clone(renderer));
        }
        let headless = self.config.headless;
        let renderer = self
            .launcher
            .launch(headless)
            .await
            .map_err(|e| MonitorError::BrowserUnavailable(format!("{e:#}")))?;
        self.events.log(
            format!(
                "Browser initialized ({})",
                if headless { "headless" } else { "headed" }
            ),
            LogLevel::Success,
        );
        self.renderer = Some(Arc::clone(&renderer));
        Ok(renderer)
    }

    /// Open a fresh context, navigate to the slot-type page and let it settle.
    async fn open_page(&mut self) -> Result<Box<dyn RenderContext>, MonitorError> {
        let renderer = self.ensure_browser().await?;
        let mut ctx = renderer
            .new_context(&self.settings.user_agent)
            .await
            .map_err(|e| MonitorError::BrowserUnavailable(format!("{e:#}")))?;

        let url = self.config.slot_type.url();
        let timeout_ms = self.settings.navigation_timeout.as_millis() as u64;
        let settle_ms = self.settings.settle_delay.as_millis() as u64;
        let loaded = match ctx.navigate(url, timeout_ms).await {
            Ok(nav) => {
                debug!(url = %nav.final_url, load_time_ms = nav.load_time_ms, "page loaded");
                ctx.wait(settle_ms).await.map_err(|e| MonitorError::Navigation {
                    url: url.to_string(),
                    reason: format!("{e:#}"),
                })
            }
            Err(e) => Err(MonitorError::Navigation {
                url: url.to_string(),
                reason: format!("{e:#}"),
            }),
        };

        match loaded {
            Ok(()) => Ok(ctx),
            Err(e) => {
                close_quietly(ctx).await;
                Err(e)
            }
        }
    }

    /// Run one availability check.
    pub async fn check_availability(&mut self) -> Result<CheckResult, MonitorError> {
        let ctx = self.open_page().await?;
        let result = self.inspect(ctx.as_ref()).await;
        close_quietly(ctx).await;
        result
    }

    /// List every location offered for the configured slot type.
    pub async fn fetch_locations(&mut self) -> Result<LocationList, MonitorError> {
        let ctx = self.open_page().await?;
        let result = read_snapshot(ctx.as_ref()).await;
        close_quietly(ctx).await;
        let snapshot = result?;
        Ok(LocationList {
            locations: extract_locations_from_raw_texts(&snapshot.blocks, self.config.slot_type),
            timestamp: now_timestamp(),
        })
    }

    async fn inspect(&self, ctx: &dyn RenderContext) -> Result<CheckResult, MonitorError> {
        let snapshot = read_snapshot(ctx).await?;
        let Some(target) = find_target(&snapshot, &self.config) else {
            return Ok(check_result_for_target(None, &self.config.location_name, None));
        };

        let earliest_time = if target.available {
            match self.find_earliest_time(ctx).await {
                Ok(found) => found,
                Err(e) => {
                    warn!("earliest time lookup failed: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok(check_result_for_target(
            Some(&target),
            &self.config.location_name,
            earliest_time,
        ))
    }

    /// Reveal the earliest slot for the target card and read it back.
    async fn find_earliest_time(
        &self,
        ctx: &dyn RenderContext,
    ) -> Result<Option<String>, MonitorError> {
        let needle = self.config.location_name.to_lowercase();

        let value = run_script(ctx, &scripts::reveal(&needle)).await?;
        let meta: RevealMeta = serde_json::from_value(value)
            .map_err(|e| MonitorError::UnexpectedScriptResult(e.to_string()))?;
        if !meta.clicked {
            debug!("no availability control on target card");
            return Ok(None);
        }
        debug!(appointment_id = ?meta.appointment_id, "reveal triggered");

        let before = meta.before_text.unwrap_or_default();
        let timeout_ms = self.settings.reveal_timeout.as_millis() as u64;
        let settled = ctx
            .wait_for_function(&scripts::reveal_settled(&needle, &before), timeout_ms)
            .await
            .unwrap_or(false);
        if !settled {
            debug!(timeout_ms, "reveal did not change the card, using fixed delay");
            let _ = ctx
                .wait(self.settings.reveal_fallback_delay.as_millis() as u64)
                .await;
        }

        let card = run_script(ctx, &scripts::card_text(&needle)).await?;
        if let Some(found) = card.as_str().and_then(extract_earliest_time) {
            return Ok(Some(found));
        }

        let body = run_script(ctx, scripts::BODY_TEXT).await?;
        Ok(body.as_str().and_then(extract_earliest_time))
    }

    /// Close the browser, if one is running. Errors are swallowed.
    pub async fn cleanup(&mut self) {
        if let Some(renderer) = self.renderer.take() {
            let open = renderer.active_contexts();
            if open > 0 {
                warn!(open, "closing browser with contexts still open");
            }
            if let Err(e) = renderer.shutdown().await {
                debug!("browser shutdown failed: {e}");
            }
            info!("browser closed");
            self.events.log("Browser closed", LogLevel::Info);
        }
    }
}

#[async_trait]
impl AvailabilityProbe for SiteProbe {
    async fn check(&mut self) -> Result<CheckResult, MonitorError> {
        self.check_availability().await
    }

    async fn release(&mut self) {
        self.cleanup().await;
    }
}

async fn run_script(
    ctx: &dyn RenderContext,
    script: &str,
) -> Result<serde_json::Value, MonitorError> {
    ctx.execute_js(script)
        .await
        .map_err(|e| MonitorError::Script(format!("{e:#}")))
}

async fn read_snapshot(ctx: &dyn RenderContext) -> Result<PageSnapshot, MonitorError> {
    let value = run_script(ctx, scripts::READ_BLOCKS).await?;
    let blocks: Vec<String> = serde_json::from_value(value)
        .map_err(|e| MonitorError::UnexpectedScriptResult(e.to_string()))?;
    Ok(PageSnapshot::from_blocks(&blocks))
}

async fn close_quietly(ctx: Box<dyn RenderContext>) {
    if let Err(e) = ctx.close().await {
        debug!("context close failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotType;
    use crate::events::MonitorEvent;
    use crate::renderer::NavigationResult;
    use anyhow::bail;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const CARD_OPEN: &str =
        "Bowman Site - Written Test1 Main St Get Directions Check Earliest Availability";
    const CARD_CLOSED: &str = "Bowman Site - Written Test1 Main St Get Directions No Availability";
    const OTHER_CARD: &str = "Other Site - Written Test2 Elm St Get Directions No Availability";

    #[derive(Default)]
    struct FakeSite {
        blocks: Vec<String>,
        clicked: bool,
        settled: bool,
        card_after: String,
        body: String,
        fail_navigation: bool,
        fail_read: bool,
    }

    #[derive(Default)]
    struct Counters {
        launches: AtomicUsize,
        opened: AtomicUsize,
        closed: AtomicUsize,
        shutdowns: AtomicUsize,
        reveals: AtomicUsize,
    }

    struct FakeLauncher {
        site: Arc<FakeSite>,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(&self, _headless: bool) -> anyhow::Result<Arc<dyn Renderer>> {
            self.counters.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FakeRenderer {
                site: Arc::clone(&self.site),
                counters: Arc::clone(&self.counters),
            }))
        }
    }

    struct FakeRenderer {
        site: Arc<FakeSite>,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl Renderer for FakeRenderer {
        async fn new_context(&self, _user_agent: &str) -> anyhow::Result<Box<dyn RenderContext>> {
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeContext {
                site: Arc::clone(&self.site),
                counters: Arc::clone(&self.counters),
            }))
        }

        async fn shutdown(&self) -> anyhow::Result<()> {
            self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn active_contexts(&self) -> usize {
            self.counters.opened.load(Ordering::SeqCst) - self.counters.closed.load(Ordering::SeqCst)
        }
    }

    struct FakeContext {
        site: Arc<FakeSite>,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl RenderContext for FakeContext {
        async fn navigate(&mut self, url: &str, timeout_ms: u64) -> anyhow::Result<NavigationResult> {
            if self.site.fail_navigation {
                bail!("navigation timed out after {timeout_ms}ms");
            }
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 1,
            })
        }

        async fn execute_js(&self, script: &str) -> anyhow::Result<serde_json::Value> {
            let site = &self.site;
            if script == scripts::READ_BLOCKS {
                if site.fail_read {
                    bail!("Execution context was destroyed");
                }
                Ok(json!(site.blocks))
            } else if script == scripts::BODY_TEXT {
                Ok(json!(site.body))
            } else if script.contains("clicked: true") {
                self.counters.reveals.fetch_add(1, Ordering::SeqCst);
                if site.clicked {
                    Ok(json!({ "clicked": true, "appointmentId": 7, "beforeText": CARD_OPEN }))
                } else {
                    Ok(json!({ "clicked": false }))
                }
            } else if script.contains("no availability") {
                Ok(json!(site.settled))
            } else if script.contains("return card ?") {
                Ok(json!(site.card_after))
            } else {
                bail!("unexpected script")
            }
        }

        async fn wait(&self, _ms: u64) -> anyhow::Result<()> {
            Ok(())
        }

        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn probe_for(site: FakeSite) -> (SiteProbe, Arc<Counters>, EventBus) {
        let counters = Arc::new(Counters::default());
        let launcher = FakeLauncher {
            site: Arc::new(site),
            counters: Arc::clone(&counters),
        };
        let settings = EngineSettings {
            reveal_timeout: Duration::ZERO,
            ..EngineSettings::default()
        };
        let config = MonitorConfig::new(SlotType::Permit, "Bowman Site", true, 60).unwrap();
        let events = EventBus::new(64);
        let probe = SiteProbe::new(config, settings, Arc::new(launcher), events.clone());
        (probe, counters, events)
    }

    fn page(cards: &[&str]) -> Vec<String> {
        let mut blocks = vec![cards.join(" ")];
        blocks.extend(cards.iter().map(|c| c.to_string()));
        blocks
    }

    #[tokio::test]
    async fn test_available_with_earliest_from_card() {
        let (mut probe, counters, _events) = probe_for(FakeSite {
            blocks: page(&[CARD_OPEN, OTHER_CARD]),
            clicked: true,
            settled: true,
            card_after: format!("{CARD_OPEN} Earliest: March 14, 2026 at 9:25 AM"),
            ..FakeSite::default()
        });

        let result = tokio_test::assert_ok!(probe.check_availability().await);
        assert!(result.found);
        assert_eq!(result.available, Some(true));
        assert_eq!(result.status, "Available appointment found (Bowman Site)");
        assert_eq!(result.earliest_time.as_deref(), Some("March 14, 2026 at 9:25 AM"));
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_earliest_falls_back_to_body_text() {
        let (mut probe, _counters, _events) = probe_for(FakeSite {
            blocks: page(&[CARD_OPEN]),
            clicked: true,
            settled: false,
            card_after: CARD_OPEN.to_string(),
            body: "Calendar 03/14/2026 9:25 AM open".to_string(),
            ..FakeSite::default()
        });

        let result = probe.check_availability().await.unwrap();
        assert_eq!(result.earliest_time.as_deref(), Some("03/14/2026 9:25 AM"));
    }

    #[tokio::test]
    async fn test_no_reveal_control_leaves_earliest_empty() {
        let (mut probe, counters, _events) = probe_for(FakeSite {
            blocks: page(&[CARD_OPEN]),
            clicked: false,
            body: "March 14, 2026".to_string(),
            ..FakeSite::default()
        });

        let result = probe.check_availability().await.unwrap();
        assert_eq!(result.available, Some(true));
        assert_eq!(result.earliest_time, None);
        assert_eq!(counters.reveals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_skips_reveal() {
        let (mut probe, counters, _events) = probe_for(FakeSite {
            blocks: page(&[CARD_CLOSED, OTHER_CARD]),
            ..FakeSite::default()
        });

        let result = probe.check_availability().await.unwrap();
        assert!(result.found);
        assert_eq!(result.available, Some(false));
        assert_eq!(result.status, "No appointment available (Bowman Site)");
        assert_eq!(result.earliest_time, None);
        assert_eq!(counters.reveals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_location() {
        let (mut probe, _counters, _events) = probe_for(FakeSite {
            blocks: page(&[OTHER_CARD]),
            ..FakeSite::default()
        });

        let result = probe.check_availability().await.unwrap();
        assert!(!result.found);
        assert_eq!(result.available, None);
        assert_eq!(result.status, STATUS_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_navigation_failure_closes_context() {
        let (mut probe, counters, _events) = probe_for(FakeSite {
            fail_navigation: true,
            ..FakeSite::default()
        });

        let err = tokio_test::assert_err!(probe.check_availability().await);
        assert!(matches!(err, MonitorError::Navigation { .. }));
        assert!(err.is_transient());
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_read_failure_after_navigation_closes_context() {
        let (mut probe, counters, _events) = probe_for(FakeSite {
            fail_read: true,
            ..FakeSite::default()
        });

        let err = tokio_test::assert_err!(probe.check_availability().await);
        assert!(matches!(err, MonitorError::Script(_)));
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);

        tokio_test::assert_err!(probe.fetch_locations().await);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 2);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 2);

        probe.cleanup().await;
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_browser_reused_until_cleanup() {
        let (mut probe, counters, events) = probe_for(FakeSite {
            blocks: page(&[CARD_CLOSED]),
            ..FakeSite::default()
        });
        let mut rx = events.subscribe();

        probe.check_availability().await.unwrap();
        probe.check_availability().await.unwrap();
        assert_eq!(counters.launches.load(Ordering::SeqCst), 1);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 2);

        probe.cleanup().await;
        probe.cleanup().await;
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 1);

        let mut messages = Vec::new();
        while let Ok(MonitorEvent::Log { message, .. }) = rx.try_recv() {
            messages.push(message);
        }
        assert_eq!(messages, ["Browser initialized (headless)", "Browser closed"]);
    }

    #[tokio::test]
    async fn test_fetch_locations() {
        let (mut probe, counters, _events) = probe_for(FakeSite {
            blocks: page(&[OTHER_CARD, CARD_CLOSED]),
            ..FakeSite::default()
        });

        let list = probe.fetch_locations().await.unwrap();
        assert_eq!(
            list.locations,
            ["Bowman Site - Written Test", "Other Site - Written Test"]
        );
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_result_from_snapshot_drops_earliest_when_unavailable() {
        let config = MonitorConfig::new(SlotType::Permit, "Bowman Site", true, 60).unwrap();
        let snapshot = PageSnapshot::from_blocks(&[CARD_CLOSED]);
        let result =
            check_result_from_snapshot(&snapshot, &config, Some("March 14, 2026".to_string()));
        assert_eq!(result.available, Some(false));
        assert_eq!(result.earliest_time, None);
    }

    #[test]
    fn test_result_from_snapshot_unknown_status() {
        let config = MonitorConfig::new(SlotType::Permit, "Bowman Site", true, 60).unwrap();
        let snapshot = PageSnapshot::from_blocks(&["Bowman Site - Written Test loading"]);
        let result = check_result_from_snapshot(&snapshot, &config, None);
        assert!(result.found);
        assert_eq!(result.available, None);
        assert_eq!(result.status, "Unknown availability status (Bowman Site)");
    }
}
