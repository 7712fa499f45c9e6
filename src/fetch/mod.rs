//! Adaptive two-strategy fetch engine.
//!
//! Prefers the cheap HTTP path and escalates to a rendered browser fetch
//! when the HTTP body fails a content quality gate (or the host is on the
//! built-in render-required set). In hybrid mode the better of the two
//! results wins, judged by the same gate.

mod browser;
mod http;

pub use browser::BrowserFetcher;
pub use http::{HttpFetcher, USER_AGENT};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{is_render_required_host, FetchMode, FetcherConfig};
use crate::models::FetchResult;
use crate::utils::host_of;

/// Minimum gate score for an HTTP result to be accepted without rendering.
pub const QUALITY_PASS_THRESHOLD: i32 = 30;

/// Content quality assessment of a fetched body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityAssessment {
    /// 0-100.
    pub score: i32,
    pub reasons: Vec<&'static str>,
}

impl QualityAssessment {
    pub fn passes(&self) -> bool {
        self.score >= QUALITY_PASS_THRESHOLD
    }
}

/// Score how usable a fetched body is for extraction.
pub fn assess_quality(result: &FetchResult) -> QualityAssessment {
    if result.error.is_some() {
        return QualityAssessment {
            score: 0,
            reasons: vec!["fetch_error"],
        };
    }

    let html = &result.html;
    let html_lower = html.to_lowercase();
    let mut score: i32 = 100;
    let mut reasons = Vec::new();

    if html.len() < 1000 {
        score -= 30;
        reasons.push("too_short");
    }

    let js_sentinels = [
        "please enable javascript",
        "javascript is required",
        "this site requires javascript",
    ];
    if js_sentinels.iter().any(|s| html_lower.contains(s)) {
        score -= 40;
        reasons.push("js_required");
    }

    let has_structure = ["<p", "<h1", "<h2"]
        .iter()
        .any(|tag| html_lower.contains(tag));
    if !has_structure {
        score -= 30;
        reasons.push("missing_structure");
    }

    let spa_shells = ["<div id=\"root\"></div>", "<div id=\"app\"></div>"];
    let looks_like_loader = spa_shells.iter().any(|s| html_lower.contains(s))
        || (html_lower.contains("loading...") && !has_structure);
    if looks_like_loader {
        score -= 20;
        reasons.push("spa_loading_screen");
    }

    if html.len() > 10_000 {
        score += 10;
    }
    if html_lower.matches("<p").count() >= 10 {
        score += 10;
    }

    if reasons.is_empty() {
        reasons.push("good_quality");
    }

    QualityAssessment {
        score: score.clamp(0, 100),
        reasons,
    }
}

/// The adaptive fetcher. The browser is lazily launched and acquired
/// exclusively for one page at a time, so the fetcher can be shared
/// across domain-audit workers.
pub struct AdaptiveFetcher {
    mode: FetchMode,
    http: HttpFetcher,
    browser: Arc<Mutex<BrowserFetcher>>,
}

impl AdaptiveFetcher {
    pub fn new(config: &FetcherConfig) -> anyhow::Result<Self> {
        let http = HttpFetcher::new(
            Duration::from_secs(config.http_timeout_secs),
            config.max_retries,
        )?;
        let browser = BrowserFetcher::new(
            Duration::from_secs(config.render_timeout_secs),
            config.max_retries,
        );
        Ok(Self {
            mode: config.mode,
            http,
            browser: Arc::new(Mutex::new(browser)),
        })
    }

    /// Fetch a URL using the configured strategy. Never returns an Err:
    /// unrecoverable failures yield an empty result with `error` set.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        match self.mode {
            FetchMode::Http => self.http.fetch(url).await,
            FetchMode::Rendered => self.fetch_rendered(url).await,
            FetchMode::Hybrid => self.fetch_hybrid(url).await,
        }
    }

    async fn fetch_rendered(&self, url: &str) -> FetchResult {
        let mut browser = self.browser.lock().await;
        browser.fetch(url).await
    }

    async fn fetch_hybrid(&self, url: &str) -> FetchResult {
        // Known JS-heavy hosts skip the HTTP attempt entirely.
        if let Some(host) = host_of(url) {
            if is_render_required_host(&host) {
                info!("Render-required host {}, using browser", host);
                let rendered = self.fetch_rendered(url).await;
                if rendered.is_ok() {
                    return rendered;
                }
                warn!("Rendered fetch failed for {}, falling back to HTTP", url);
                return self.http.fetch(url).await;
            }
        }

        let http_result = self.http.fetch(url).await;
        let http_quality = assess_quality(&http_result);

        if http_quality.passes() {
            debug!(
                "HTTP fetch accepted for {} (quality {})",
                url, http_quality.score
            );
            return http_result;
        }

        info!(
            "HTTP content quality low for {} ({}, reasons: {:?}), rendering",
            url, http_quality.score, http_quality.reasons
        );
        let rendered = self.fetch_rendered(url).await;
        let rendered_quality = assess_quality(&rendered);

        // Return the better of the two results.
        if rendered_quality.score > http_quality.score {
            info!(
                "Rendering improved quality for {}: {} -> {}",
                url, http_quality.score, rendered_quality.score
            );
            rendered
        } else {
            http_result
        }
    }
}
