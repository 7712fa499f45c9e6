//! Technical & UX scoring (10 points): speed, mobile readiness, semantic
//! markup, linking, and meta hygiene.

use crate::models::{CategoryScore, PageModel};

use super::{profiles, CategoryScorer};

pub struct TechnicalScorer;

const MAX: f64 = 10.0;

impl CategoryScorer for TechnicalScorer {
    fn key(&self) -> &'static str {
        profiles::TECHNICAL
    }

    fn max(&self) -> f64 {
        MAX
    }

    fn score(&self, page: &PageModel) -> CategoryScore {
        CategoryScore::from_parts(
            MAX,
            &[
                ("page_performance", performance(page)),
                ("mobile_friendliness", mobile(page)),
                ("semantic_html", semantic_html(page)),
                ("internal_linking", internal_linking(page)),
                ("meta_description", meta_description(page)),
            ],
        )
    }
}

/// LCP tiers (max 3). HTTP-mode fetches have no LCP and score zero here.
fn performance(page: &PageModel) -> f64 {
    match page.performance.lcp_ms {
        Some(lcp) if lcp <= 2500.0 => 3.0,
        Some(lcp) if lcp <= 4000.0 => 2.0,
        Some(lcp) if lcp <= 6000.0 => 1.0,
        _ => 0.0,
    }
}

/// Mobile (max 2): viewport meta and a responsive CSS signal.
fn mobile(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;
    if page.meta.viewport.is_some() {
        score += 1.0;
    }
    if page.has_responsive_css {
        score += 1.0;
    }
    score
}

/// Semantic HTML (max 2): layout tags plus a sane heading hierarchy.
fn semantic_html(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;
    if page.semantic_tag_count >= 2 {
        score += 1.0;
    }
    if page.valid_heading_hierarchy {
        score += 1.0;
    }
    score
}

/// Internal linking (max 2).
fn internal_linking(page: &PageModel) -> f64 {
    (page.internal_links_count as f64 * 0.2).min(2.0)
}

/// Meta description in the 50-160 char sweet spot (max 1).
fn meta_description(page: &PageModel) -> f64 {
    match page.meta.description.as_deref() {
        Some(d) if (50..=160).contains(&d.len()) => 1.0,
        _ => 0.0,
    }
}
