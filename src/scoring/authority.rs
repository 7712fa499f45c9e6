//! Authority & provenance scoring (18 points): who wrote it, when, and
//! what it cites.

use chrono::Utc;

use crate::config::is_authoritative_host;
use crate::models::{CategoryScore, PageModel};
use crate::utils::host_of;

use super::{profiles, CategoryScorer};

pub struct AuthorityScorer;

const MAX: f64 = 18.0;

impl CategoryScorer for AuthorityScorer {
    fn key(&self) -> &'static str {
        profiles::AUTHORITY
    }

    fn max(&self) -> f64 {
        MAX
    }

    fn score(&self, page: &PageModel) -> CategoryScore {
        CategoryScore::from_parts(
            MAX,
            &[
                ("domain_trust", domain_trust(page)),
                ("author_information", author(page)),
                ("publication_dates", dates(page)),
                ("citations_sources", citations(page)),
                ("organization_info", organization(page)),
            ],
        )
    }
}

/// Domain trust (max 4): HTTPS plus an authoritative TLD or host.
fn domain_trust(page: &PageModel) -> f64 {
    if !page.is_https {
        return 0.0;
    }
    let authoritative = host_of(&page.url)
        .map(|h| h.ends_with(".gov") || h.ends_with(".edu") || is_authoritative_host(&h))
        .unwrap_or(false);
    if authoritative {
        4.0
    } else {
        2.0
    }
}

/// Author (max 4): structured beats byline-only.
fn author(page: &PageModel) -> f64 {
    if !page.author.found {
        return 0.0;
    }
    if page.author.sources.iter().any(|s| s == "jsonld") {
        4.0
    } else {
        2.0
    }
}

/// Dates (max 4): recency of publication plus a modified date.
fn dates(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;

    if let Some(published) = page.dates.published_at() {
        let days = (Utc::now() - published).num_days();
        score += if days <= 365 {
            3.0
        } else if days <= 730 {
            2.0
        } else if days <= 1825 {
            1.0
        } else {
            0.0
        };
    }
    if page.dates.modified.is_some() {
        score += 1.0;
    }

    score.min(4.0)
}

/// Citations (max 5): external links, inline markers, references block.
fn citations(page: &PageModel) -> f64 {
    let mut score =
        page.external_links.len() as f64 * 0.5 + page.inline_citation_count as f64;
    if page.has_references_section {
        score += 1.0;
    }
    score.min(5.0)
}

/// Organization (max 3): present and complete Organization schema.
fn organization(page: &PageModel) -> f64 {
    let complete = page
        .schema_validations
        .iter()
        .any(|v| v.schema_type == "Organization" && v.is_complete());
    if complete {
        3.0
    } else {
        0.0
    }
}
