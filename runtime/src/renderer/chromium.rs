// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.

use super::{BrowserLauncher, NavigationResult, RenderContext, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    // 1. explicit path (SLOTWATCH_CHROMIUM_PATH)
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.clone());
        }
    }

    // 2. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 3. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches Chromium with the flags the booking site tolerates.
pub struct ChromiumLauncher {
    chromium_path: Option<PathBuf>,
}

impl ChromiumLauncher {
    pub fn new(chromium_path: Option<PathBuf>) -> Self {
        Self { chromium_path }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, headless: bool) -> Result<Arc<dyn Renderer>> {
        let renderer = ChromiumRenderer::launch(self.chromium_path.as_ref(), headless).await?;
        Ok(Arc::new(renderer))
    }
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Arc<Mutex<Option<Browser>>>,
    handler_task: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance.
    pub async fn launch(chromium_path: Option<&PathBuf>, headless: bool) -> Result<Self> {
        let chrome_path = find_chromium(chromium_path)
            .context("Chromium not found. Install Chrome or set SLOTWATCH_CHROMIUM_PATH.")?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-sandbox")
            .arg("--disable-blink-features=AutomationControlled");
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        info!(headless, "Chromium launched");

        Ok(Self {
            browser: Arc::new(Mutex::new(Some(browser))),
            handler_task,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self, user_agent: &str) -> Result<Box<dyn RenderContext>> {
        let guard = self.browser.lock().await;
        let Some(browser) = guard.as_ref() else {
            bail!("browser already shut down");
        };

        let context_id = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .context("failed to create browser context")?
            .result
            .browser_context_id;

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build target params: {e}"))?;

        let page = match browser.new_page(target).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser
                    .execute(DisposeBrowserContextParams::new(context_id))
                    .await;
                bail!("failed to create new page: {e}");
            }
        };

        if let Err(e) = page
            .execute(SetUserAgentOverrideParams::new(user_agent))
            .await
        {
            debug!("user agent override failed: {e}");
        }

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            page,
            context_id,
            browser: Arc::clone(&self.browser),
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        let browser = self.browser.lock().await.take();
        if let Some(mut browser) = browser {
            if let Err(e) = browser.close().await {
                debug!("browser close failed: {e}");
            }
            let _ = browser.wait().await;
        }
        self.handler_task.abort();
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single isolated Chromium browser context with one page.
pub struct ChromiumContext {
    page: Page,
    context_id: BrowserContextId,
    browser: Arc<Mutex<Option<Browser>>>,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let result =
            tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_)) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        // `undefined` comes back without a value.
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn wait(&self, ms: u64) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumContext {
            page,
            context_id,
            browser,
            active_count,
        } = *self;
        active_count.fetch_sub(1, Ordering::Relaxed);
        if let Err(e) = page.close().await {
            debug!("page close failed: {e}");
        }
        let guard = browser.lock().await;
        if let Some(browser) = guard.as_ref() {
            if let Err(e) = browser
                .execute(DisposeBrowserContextParams::new(context_id))
                .await
            {
                debug!("browser context dispose failed: {e}");
            }
        }
        Ok(())
    }
}
