//! Rendered fetcher backed by a headless Chromium (CDP).
//!
//! Used when the plain HTTP body fails the quality gate, typically on
//! single-page apps that hydrate in the browser. Collects real navigation
//! timing (TTFB, FCP, LCP, load events) from the page's performance API.

use std::time::Duration;

#[cfg(feature = "browser")]
use std::sync::Arc;

#[cfg(feature = "browser")]
use anyhow::{Context, Result};
#[cfg(feature = "browser")]
use chrono::Utc;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use serde::Deserialize;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

use crate::models::{FetchMethod, FetchResult};
#[cfg(feature = "browser")]
use crate::models::PerformanceMetrics;

#[cfg(feature = "browser")]
use super::http::USER_AGENT;

/// Base delay for retry backoff (doubles per attempt).
#[cfg(feature = "browser")]
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// Quiet window before the page is considered settled.
#[cfg(feature = "browser")]
const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Extra wait for late-binding content after the page settles.
#[cfg(feature = "browser")]
const LATE_CONTENT_DELAY: Duration = Duration::from_secs(2);

/// Rendered fetcher. The browser instance is lazily launched and shared;
/// callers acquire it exclusively for the duration of one page.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    timeout: Duration,
    max_retries: u32,
    browser: Option<Arc<Mutex<Browser>>>,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Create a new rendered fetcher.
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        Self {
            timeout,
            max_retries,
            browser: None,
        }
    }

    /// Find a Chrome executable on this machine.
    fn find_chrome() -> Result<std::path::PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found; install it or run with fetcher.mode = \"http\""
        ))
    }

    /// Launch the browser if not already running.
    async fn ensure_browser(&mut self) -> Result<()> {
        if self.browser.is_some() {
            return Ok(());
        }

        let chrome_path = Self::find_chrome()?;
        info!("Launching headless browser");

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        // Spawn handler task
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        self.browser = Some(Arc::new(Mutex::new(browser)));
        Ok(())
    }

    /// Fetch and render a URL, retrying transport and timeout errors.
    pub async fn fetch(&mut self, url: &str) -> FetchResult {
        let mut last_error = String::new();

        for attempt in 0..self.max_retries.max(1) {
            if attempt > 0 {
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
                tokio::time::sleep(delay).await;
            }

            match self.fetch_once(url).await {
                Ok(result) => return result,
                Err(e) => {
                    warn!(
                        "Rendered fetch attempt {} failed for {}: {}",
                        attempt + 1,
                        url,
                        e
                    );
                    last_error = e.to_string();
                    // A dead browser cannot recover; drop it so the next
                    // attempt relaunches.
                    self.browser = None;
                }
            }
        }

        FetchResult::failed(url, FetchMethod::Rendered, last_error)
    }

    async fn fetch_once(&mut self, url: &str) -> Result<FetchResult> {
        self.ensure_browser().await?;

        let browser = self.browser.as_ref().unwrap().lock().await;
        let page = browser.new_page("about:blank").await?;

        let result = self.navigate_and_capture(&page, url).await;
        let _ = page.close().await;
        result
    }

    async fn navigate_and_capture(&self, page: &Page, url: &str) -> Result<FetchResult> {
        // Set a realistic user agent before any navigation
        page.execute(SetUserAgentOverrideParams::new(USER_AGENT.to_string()))
            .await?;

        debug!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid URL: {}", e))?;
        page.execute(nav_params).await?;

        // Wait for the document to be ready, bounded by the nav timeout.
        let ready_script = r#"
            new Promise((resolve) => {
                if (document.readyState === 'complete' || document.readyState === 'interactive') {
                    resolve(document.readyState);
                } else {
                    window.addEventListener('load', () => resolve(document.readyState));
                    setTimeout(() => resolve('timeout'), 10000);
                }
            })
        "#;
        match tokio::time::timeout(self.timeout, page.evaluate(ready_script.to_string())).await {
            Ok(Ok(result)) => {
                let state: String = result.into_value().unwrap_or_else(|_| "unknown".into());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => debug!("Could not check ready state: {}", e),
            Err(_) => return Err(anyhow::anyhow!("Timeout waiting for page ready state")),
        }

        // Quiet window, then the late-content settle delay.
        tokio::time::sleep(NETWORK_QUIET_WINDOW).await;
        tokio::time::sleep(LATE_CONTENT_DELAY).await;

        let final_url = page
            .url()
            .await?
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());
        let html = page.content().await?;
        let (performance, status_code) = self.collect_performance(page).await;

        let cert_valid = final_url.starts_with("https://");

        Ok(FetchResult {
            url: final_url,
            status_code,
            html,
            fetched_at: Utc::now(),
            performance,
            fetch_method: FetchMethod::Rendered,
            cert_valid,
            error: None,
        })
    }

    /// Pull navigation timing, paint entries, and LCP from the page.
    async fn collect_performance(&self, page: &Page) -> (PerformanceMetrics, u16) {
        #[derive(Deserialize)]
        struct PagePerf {
            ttfb: Option<f64>,
            dom_load: Option<f64>,
            page_load: Option<f64>,
            fcp: Option<f64>,
            lcp: Option<f64>,
            status: Option<u16>,
        }

        let script = r#"
            new Promise((resolve) => {
                let lcp = null;
                try {
                    const po = new PerformanceObserver((list) => {
                        const entries = list.getEntries();
                        if (entries.length) lcp = entries[entries.length - 1].startTime;
                    });
                    po.observe({ type: 'largest-contentful-paint', buffered: true });
                } catch (e) {}
                setTimeout(() => {
                    const nav = performance.getEntriesByType('navigation')[0];
                    const paint = performance.getEntriesByType('paint');
                    const fcp = paint.find(p => p.name === 'first-contentful-paint');
                    resolve({
                        ttfb: nav ? nav.responseStart - nav.requestStart : null,
                        dom_load: nav ? nav.domContentLoadedEventEnd - nav.startTime : null,
                        page_load: nav ? nav.loadEventEnd - nav.startTime : null,
                        fcp: fcp ? fcp.startTime : null,
                        lcp: lcp,
                        status: nav && nav.responseStatus ? nav.responseStatus : null,
                    });
                }, 250);
            })
        "#;

        match page.evaluate(script.to_string()).await {
            Ok(result) => match result.into_value::<PagePerf>() {
                Ok(perf) => (
                    PerformanceMetrics {
                        ttfb_ms: perf.ttfb,
                        dom_load_ms: perf.dom_load,
                        page_load_ms: perf.page_load,
                        fcp_ms: perf.fcp,
                        lcp_ms: perf.lcp,
                    },
                    perf.status.unwrap_or(200),
                ),
                Err(e) => {
                    warn!("Could not parse performance metrics: {}", e);
                    (PerformanceMetrics::default(), 200)
                }
            },
            Err(e) => {
                warn!("Could not get performance metrics: {}", e);
                (PerformanceMetrics::default(), 200)
            }
        }
    }
}

/// Stub used when the `browser` feature is disabled: every rendered fetch
/// fails and the adaptive fetcher falls back to the HTTP result.
#[cfg(not(feature = "browser"))]
pub struct BrowserFetcher;

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub fn new(_timeout: Duration, _max_retries: u32) -> Self {
        Self
    }

    pub async fn fetch(&mut self, url: &str) -> FetchResult {
        FetchResult::failed(
            url,
            FetchMethod::Rendered,
            "rendered fetching requires the `browser` feature".to_string(),
        )
    }
}
