//! Configuration management for aeoscope.
//!
//! Settings are loaded from an optional TOML file plus environment
//! overrides. Built-in data tables (render-required hosts, authoritative
//! hosts) are read-only after process init.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Hosts known to ship an empty shell over HTTP and hydrate in the browser.
/// Matched against the registrable domain (www stripped, parent match).
pub const RENDER_REQUIRED_HOSTS: &[&str] = &[
    // News & media
    "medium.com",
    "substack.com",
    "buzzfeed.com",
    "vox.com",
    // Health & wellness
    "healthline.com",
    "webmd.com",
    "mayoclinic.org",
    // E-commerce & platforms
    "amazon.com",
    "etsy.com",
    "shopify.com",
    // Social & content platforms
    "blogger.com",
    "wordpress.com",
    "wix.com",
    "squarespace.com",
    "notion.so",
    // Modern web apps
    "vercel.app",
    "netlify.app",
    "github.io",
];

/// Hosts treated as inherently authoritative for the authority scorer.
pub const AUTHORITATIVE_HOSTS: &[&str] = &[
    "wikipedia.org",
    "britannica.com",
    "nature.com",
    "sciencedirect.com",
    "nih.gov",
    "who.int",
    "un.org",
    "ieee.org",
    "acm.org",
];

/// Fetch strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Try HTTP first, escalate to rendered on poor content quality.
    #[default]
    Hybrid,
    /// Plain HTTP only.
    Http,
    /// Headless browser only.
    Rendered,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Http => "http",
            Self::Rendered => "rendered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hybrid" => Some(Self::Hybrid),
            "http" => Some(Self::Http),
            "rendered" => Some(Self::Rendered),
            _ => None,
        }
    }
}

/// Fetcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Fetch strategy (default: hybrid).
    #[serde(default)]
    pub mode: FetchMode,
    /// Timeout for plain HTTP fetches, in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    /// Navigation timeout for rendered fetches, in seconds.
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,
    /// Retries on transport errors and timeouts.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_http_timeout() -> u64 {
    10
}
fn default_render_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::default(),
            http_timeout_secs: default_http_timeout(),
            render_timeout_secs: default_render_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Domain audit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Maximum pages per domain audit. 0 = unlimited (capped by hard ceiling).
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Concurrent page audit workers (clamped to 1..=10).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-page overall timeout, in seconds.
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,
    /// Job fails if no page completes within this window, in seconds.
    #[serde(default = "default_stall_timeout")]
    pub stall_timeout_secs: u64,
}

/// Absolute ceiling on pages per domain audit, even when max_pages is 0.
pub const MAX_PAGES_CEILING: usize = 1000;

/// Hard cap on concurrent page workers.
pub const CONCURRENCY_CEILING: usize = 10;

fn default_max_pages() -> usize {
    100
}
fn default_concurrency() -> usize {
    3
}
fn default_page_timeout() -> u64 {
    60
}
fn default_stall_timeout() -> u64 {
    300
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            page_timeout_secs: default_page_timeout(),
            stall_timeout_secs: default_stall_timeout(),
        }
    }
}

impl DomainConfig {
    /// Effective page budget: 0 means unlimited, which still honors the
    /// hard ceiling.
    pub fn effective_max_pages(&self) -> usize {
        if self.max_pages == 0 {
            MAX_PAGES_CEILING
        } else {
            self.max_pages.min(MAX_PAGES_CEILING)
        }
    }

    /// Worker count clamped to the allowed range.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, CONCURRENCY_CEILING)
    }
}

/// Job retention configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Seconds a terminal job is retained for late result fetches.
    #[serde(default = "default_job_ttl")]
    pub ttl_seconds: u64,
}

fn default_job_ttl() -> u64 {
    3600
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_job_ttl(),
        }
    }
}

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// A configured answer engine used for the optional AI-citation category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Chat-completions endpoint (OpenAI-compatible).
    pub endpoint: String,
    /// Model identifier sent in requests.
    pub model: String,
    /// Bearer token, if the endpoint requires one.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Top-level application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub domain: DomainConfig,
    #[serde(default)]
    pub job: JobConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Named answer engines. Empty disables the AI-citation category.
    #[serde(default)]
    pub llm_engines: HashMap<String, EngineConfig>,
}

impl Settings {
    /// Load settings from a TOML file, falling back to defaults when the
    /// file is absent.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = match path {
            Some(p) if p.exists() => {
                let raw = std::fs::read_to_string(p)?;
                toml::from_str(&raw)?
            }
            _ => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Apply recognized environment overrides.
    fn apply_env(&mut self) {
        if let Ok(mode) = std::env::var("AEOSCOPE_FETCH_MODE") {
            if let Some(m) = FetchMode::parse(&mode) {
                self.fetcher.mode = m;
            }
        }
        if let Ok(v) = std::env::var("AEOSCOPE_MAX_PAGES") {
            if let Ok(n) = v.parse() {
                self.domain.max_pages = n;
            }
        }
        if let Ok(v) = std::env::var("AEOSCOPE_CONCURRENCY") {
            if let Ok(n) = v.parse() {
                self.domain.concurrency = n;
            }
        }
        if let Ok(v) = std::env::var("AEOSCOPE_JOB_TTL") {
            if let Ok(n) = v.parse() {
                self.job.ttl_seconds = n;
            }
        }
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.fetcher.mode = mode;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.domain.max_pages = max_pages;
        self
    }
}

/// True when the host (or a parent domain of it) is in the render-required
/// set.
pub fn is_render_required_host(host: &str) -> bool {
    host_in_list(host, RENDER_REQUIRED_HOSTS)
}

/// True when the host is on the built-in authoritative list.
pub fn is_authoritative_host(host: &str) -> bool {
    host_in_list(host, AUTHORITATIVE_HOSTS)
}

fn host_in_list(host: &str, list: &[&str]) -> bool {
    let host = host.strip_prefix("www.").unwrap_or(host);
    if list.contains(&host) {
        return true;
    }
    // Parent domain match (blog.medium.com -> medium.com)
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        let parent = parts[parts.len() - 2..].join(".");
        if list.contains(&parent.as_str()) {
            return true;
        }
    }
    false
}
