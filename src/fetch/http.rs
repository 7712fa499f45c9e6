//! Plain HTTP fetcher.
//!
//! The cheap path: a reqwest client with a realistic user agent, redirect
//! following, and retry with exponential backoff. Only TTFB is measurable
//! without a browser.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use tracing::{debug, warn};

use crate::models::{FetchMethod, FetchResult, PerformanceMetrics};

/// Base delay for retry backoff (doubles per attempt).
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36 (compatible; aeoscope/0.3)";

/// HTTP fetcher with retry and timing.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher.
    pub fn new(timeout: Duration, max_retries: u32) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            client,
            max_retries,
        })
    }

    /// Fetch a URL, retrying transport errors with exponential backoff.
    /// Exhausted retries produce an empty result with `error` set rather
    /// than an Err; downstream extraction and scoring still run.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let mut last_error = String::new();

        for attempt in 0..self.max_retries.max(1) {
            if attempt > 0 {
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt - 1);
                tokio::time::sleep(delay).await;
            }

            match self.fetch_once(url).await {
                Ok(result) => return result,
                Err(e) => {
                    warn!("HTTP fetch attempt {} failed for {}: {}", attempt + 1, url, e);
                    last_error = e.to_string();
                }
            }
        }

        FetchResult::failed(url, FetchMethod::Http, last_error)
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchResult, reqwest::Error> {
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await?;

        let ttfb = start.elapsed().as_secs_f64() * 1000.0;
        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        // A completed https response implies the TLS chain verified.
        let cert_valid = final_url.starts_with("https://");

        let html = response.text().await?;
        let total = start.elapsed().as_secs_f64() * 1000.0;

        debug!("Fetched {} (status {}, {} bytes)", final_url, status, html.len());

        Ok(FetchResult {
            url: final_url,
            status_code: status,
            html,
            fetched_at: Utc::now(),
            performance: PerformanceMetrics {
                ttfb_ms: Some(ttfb),
                dom_load_ms: None,
                page_load_ms: Some(total),
                fcp_ms: None,
                lcp_ms: None,
            },
            fetch_method: FetchMethod::Http,
            cert_valid,
            error: None,
        })
    }
}
