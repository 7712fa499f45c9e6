//! URL discovery: sitemap first, BFS crawl fallback.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::fetch::USER_AGENT;
use crate::utils::{is_binary_asset, same_registrable_domain};

/// Sitemap locations probed in order.
const SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml", "/sitemap-index.xml"];

/// Paths never worth auditing.
const EXCLUDED_PATH_PATTERNS: &[&str] = &[
    "/login", "/logout", "/signin", "/signup", "/cart", "/checkout", "/account",
];

/// BFS crawl depth from the homepage.
const CRAWL_MAX_DEPTH: u32 = 2;

/// Discovers auditable URLs for a domain.
pub struct UrlDiscovery {
    client: Client,
    max_pages: usize,
}

impl UrlDiscovery {
    pub fn new(max_pages: usize) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .gzip(true)
            .build()?;
        Ok(Self { client, max_pages })
    }

    /// Discover URLs: sitemap first (order preserved), else BFS crawl.
    /// Returns at most `max_pages` URLs; an empty result means the job
    /// should fail.
    pub async fn discover(&self, domain_url: &str) -> Vec<String> {
        info!("Starting URL discovery for {}", domain_url);

        let Ok(base) = Url::parse(domain_url) else {
            return Vec::new();
        };
        let origin = format!(
            "{}://{}",
            base.scheme(),
            base.host_str().unwrap_or_default()
        );

        let sitemap_urls = self.discover_from_sitemaps(&origin, domain_url).await;
        if !sitemap_urls.is_empty() {
            info!("Discovered {} URLs from sitemap", sitemap_urls.len());
            return sitemap_urls.into_iter().take(self.max_pages).collect();
        }

        info!("No sitemap found, crawling from homepage");
        self.crawl_from_homepage(domain_url).await
    }

    async fn discover_from_sitemaps(&self, origin: &str, domain_url: &str) -> Vec<String> {
        for path in SITEMAP_PATHS {
            let sitemap_url = format!("{}{}", origin, path);
            let Some(xml) = self.get_text(&sitemap_url).await else {
                continue;
            };
            let parsed = parse_sitemap(&xml);
            if parsed.pages.is_empty() && parsed.sitemaps.is_empty() {
                continue;
            }

            let mut urls: Vec<String> = Vec::new();
            let mut seen: HashSet<String> = HashSet::new();
            for url in &parsed.pages {
                if same_registrable_domain(url, domain_url) && seen.insert(url.clone()) {
                    urls.push(url.clone());
                }
            }

            // Sitemap indexes are recursed exactly one level deep.
            for child in parsed.sitemaps.iter().take(16) {
                if urls.len() >= self.max_pages {
                    break;
                }
                if let Some(child_xml) = self.get_text(child).await {
                    for url in parse_sitemap(&child_xml).pages {
                        if same_registrable_domain(&url, domain_url) && seen.insert(url.clone()) {
                            urls.push(url);
                        }
                    }
                }
            }

            if !urls.is_empty() {
                return urls;
            }
        }
        Vec::new()
    }

    /// BFS from the homepage, following same-domain anchors to depth 2.
    async fn crawl_from_homepage(&self, start_url: &str) -> Vec<String> {
        let mut discovered: Vec<String> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<(String, u32)> = VecDeque::new();
        frontier.push_back((start_url.to_string(), 0));

        while let Some((url, depth)) = frontier.pop_front() {
            if discovered.len() >= self.max_pages {
                break;
            }
            if !visited.insert(url.clone()) {
                continue;
            }

            let Some(html) = self.get_text(&url).await else {
                continue;
            };
            discovered.push(url.clone());

            if depth >= CRAWL_MAX_DEPTH {
                continue;
            }
            for link in extract_crawl_links(&html, &url, start_url) {
                if !visited.contains(&link)
                    && !frontier.iter().any(|(u, _)| u == &link)
                {
                    frontier.push_back((link, depth + 1));
                }
            }
        }

        discovered
    }

    async fn get_text(&self, url: &str) -> Option<String> {
        match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => resp.text().await.ok(),
            Ok(resp) => {
                debug!("Fetch of {} returned HTTP {}", url, resp.status());
                None
            }
            Err(e) => {
                debug!("Fetch of {} failed: {}", url, e);
                None
            }
        }
    }
}

/// Parsed sitemap content: page URLs and nested sitemap URLs.
#[derive(Debug, Default)]
pub struct SitemapContent {
    pub pages: Vec<String>,
    pub sitemaps: Vec<String>,
}

/// Event-parse a sitemap document. `<url><loc>` entries are pages,
/// `<sitemap><loc>` entries are nested sitemaps.
pub fn parse_sitemap(xml: &str) -> SitemapContent {
    let mut out = SitemapContent::default();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut in_sitemap_entry = false;
    let mut in_url_entry = false;
    let mut in_loc = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(ref e)) => {
                match local_name(e.name().as_ref()) {
                    "sitemap" => in_sitemap_entry = true,
                    "url" => in_url_entry = true,
                    "loc" => in_loc = true,
                    _ => {}
                }
            }
            Ok(quick_xml::events::Event::Text(ref e)) => {
                if in_loc {
                    let loc = e.unescape().unwrap_or_default().trim().to_string();
                    if loc.starts_with("http://") || loc.starts_with("https://") {
                        if in_sitemap_entry {
                            out.sitemaps.push(loc);
                        } else if in_url_entry {
                            out.pages.push(loc);
                        }
                    }
                }
            }
            Ok(quick_xml::events::Event::End(ref e)) => {
                match local_name(e.name().as_ref()) {
                    "sitemap" => in_sitemap_entry = false,
                    "url" => in_url_entry = false,
                    "loc" => in_loc = false,
                    _ => {}
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    out
}

fn local_name(name: &[u8]) -> &str {
    let s = std::str::from_utf8(name).unwrap_or("");
    s.rsplit(':').next().unwrap_or(s)
}

/// Extract crawlable same-domain links from a page.
pub fn extract_crawl_links(html: &str, current_url: &str, base_url: &str) -> Vec<String> {
    let dom = Html::parse_document(html);
    let sel = Selector::parse("a[href]").unwrap();
    let Ok(current) = Url::parse(current_url) else {
        return Vec::new();
    };

    let mut links: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for a in dom.select(&sel) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let Ok(mut absolute) = current.join(href) else {
            continue;
        };
        absolute.set_fragment(None);
        let link = absolute.to_string();

        if !same_registrable_domain(&link, base_url) {
            continue;
        }
        if is_binary_asset(&link) {
            continue;
        }
        let path_lower = absolute.path().to_lowercase();
        if EXCLUDED_PATH_PATTERNS.iter().any(|p| path_lower.starts_with(p)) {
            continue;
        }
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}
