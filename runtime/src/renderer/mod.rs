// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page reads.
//!
//! Defines the `BrowserLauncher`, `Renderer` and `RenderContext` traits that
//! abstract over the browser engine (currently Chromium via chromiumoxide).

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Interval between predicate evaluations in [`RenderContext::wait_for_function`].
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Starts browser instances.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a browser, headless or headed.
    async fn launch(&self, headless: bool) -> Result<Arc<dyn Renderer>>;
}

/// A running browser that can create isolated contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a fresh, isolated browsing context with one page.
    async fn new_context(&self, user_agent: &str) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single isolated browsing context and its page.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL and wait for the document to be constructed.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Pause for `ms` milliseconds.
    async fn wait(&self, ms: u64) -> Result<()>;
    /// Close the page and dispose of the context.
    async fn close(self: Box<Self>) -> Result<()>;

    /// Poll a boolean JS expression until it is truthy.
    ///
    /// Returns `Ok(false)` when `timeout_ms` elapses first. Script errors while
    /// polling count as "not yet".
    async fn wait_for_function(&self, predicate: &str, timeout_ms: u64) -> Result<bool> {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if let Ok(value) = self.execute_js(predicate).await {
                if is_truthy(&value) {
                    return Ok(true);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// JS truthiness for values that crossed the CDP boundary.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

/// A launcher used when Chromium is unavailable.
///
/// Every launch fails, so each cycle is reported as a failure and the
/// circuit breaker ends the session instead of hanging.
pub struct NoopLauncher;

#[async_trait]
impl BrowserLauncher for NoopLauncher {
    async fn launch(&self, _headless: bool) -> Result<Arc<dyn Renderer>> {
        Err(anyhow::anyhow!("Browser not available"))
    }
}
