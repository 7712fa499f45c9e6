//! Structured data scoring (15 points): schema presence, quality, and
//! social metadata.

use crate::models::{CategoryScore, PageModel};

use super::{profiles, CategoryScorer};

pub struct StructuredDataScorer;

const MAX: f64 = 15.0;

/// Core types most pages should carry at least one of.
const CORE_TYPES: &[&str] = &[
    "Article",
    "BlogPosting",
    "NewsArticle",
    "WebPage",
    "Person",
    "Organization",
    "WebSite",
];

/// Rich answer-engine-friendly types.
const RICH_TYPES: &[&str] = &["FAQPage", "HowTo", "QAPage", "BreadcrumbList"];

impl CategoryScorer for StructuredDataScorer {
    fn key(&self) -> &'static str {
        profiles::STRUCTURED_DATA
    }

    fn max(&self) -> f64 {
        MAX
    }

    fn score(&self, page: &PageModel) -> CategoryScore {
        let mut basic = basic_presence(page);
        let quality = schema_quality(page);
        let advanced = advanced_features(page);
        let social = social_metadata(page);

        // Fallback: a schema-less page that still carries a real title,
        // description, and heading structure earns pity points under
        // basic presence. Any earned point forfeits the fallback.
        if basic == 0.0 && quality == 0.0 && advanced == 0.0 && social == 0.0 {
            let title_ok = page.title.len() > 10;
            let desc_ok = page
                .meta
                .description
                .as_deref()
                .map(|d| d.len() > 30)
                .unwrap_or(false);
            let headings_ok = page.headings.len() >= 5;
            if title_ok && desc_ok && headings_ok {
                basic = 3.0;
            }
        }

        CategoryScore::from_parts(
            MAX,
            &[
                ("basic_presence", basic),
                ("schema_quality", quality),
                ("advanced_features", advanced),
                ("social_metadata", social),
            ],
        )
    }
}

/// Basic presence (max 5): any machine-readable markup at all.
fn basic_presence(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;
    if !page.jsonld.is_empty() {
        score += 3.0;
    }
    if page.meta.og.contains_key("title") || page.meta.og.contains_key("description") {
        score += 2.0;
    }
    if page.microdata_present || page.rdfa_present {
        score += 2.0;
    }
    score.min(5.0)
}

/// Schema quality (max 5): the right types, filled in properly.
fn schema_quality(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;

    if CORE_TYPES.iter().any(|t| page.has_schema_type(t)) {
        score += 3.0;
    }
    if RICH_TYPES.iter().any(|t| page.has_schema_type(t)) {
        score += 2.0;
    }

    if !page.schema_validations.is_empty() {
        let complete = page
            .schema_validations
            .iter()
            .filter(|v| v.is_complete())
            .count();
        let ratio = complete as f64 / page.schema_validations.len() as f64;
        if ratio >= 0.7 {
            score += 2.0;
        }
    }

    score.min(5.0)
}

/// Advanced features (max 3): FAQ depth and breadcrumbs.
fn advanced_features(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;
    if page.faq_schema.valid_count >= 3 {
        score += 2.0;
    }
    if page.has_schema_type("BreadcrumbList") {
        score += 1.0;
    }
    score.min(3.0)
}

/// Social metadata (max 2): complete OpenGraph and a Twitter card.
fn social_metadata(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;
    let og_complete = ["title", "description", "image"]
        .iter()
        .all(|k| page.meta.og.contains_key(*k));
    if og_complete {
        score += 1.0;
    }
    if page.meta.twitter.contains_key("card") {
        score += 1.0;
    }
    score
}
