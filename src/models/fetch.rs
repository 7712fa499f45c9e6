//! Fetch result models shared by the HTTP and rendered fetchers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a page was retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMethod {
    #[default]
    Http,
    Rendered,
}

impl FetchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Rendered => "rendered",
        }
    }
}

/// Timing metrics collected during a fetch. All values are milliseconds;
/// `None` means the metric is unavailable for the fetch method used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub ttfb_ms: Option<f64>,
    pub dom_load_ms: Option<f64>,
    pub page_load_ms: Option<f64>,
    pub fcp_ms: Option<f64>,
    pub lcp_ms: Option<f64>,
}

/// Outcome of fetching a single URL.
///
/// `url` is the final post-redirect URL; it is the canonical URL used in
/// every downstream output. A transport failure leaves `html` empty and
/// `error` populated; extraction still runs and yields a near-empty page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub url: String,
    pub status_code: u16,
    pub html: String,
    pub fetched_at: DateTime<Utc>,
    pub performance: PerformanceMetrics,
    pub fetch_method: FetchMethod,
    /// True when the TLS handshake completed with a valid-looking chain.
    pub cert_valid: bool,
    pub error: Option<String>,
}

impl FetchResult {
    /// Result for a fetch that failed after all retries.
    pub fn failed(url: &str, method: FetchMethod, error: String) -> Self {
        Self {
            url: url.to_string(),
            status_code: 0,
            html: String::new(),
            fetched_at: Utc::now(),
            performance: PerformanceMetrics::default(),
            fetch_method: method,
            cert_valid: false,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
