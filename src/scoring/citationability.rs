//! Citationability scoring (12 points): how quotable the page is.

use crate::models::{CategoryScore, PageModel};

use super::{profiles, CategoryScorer};

pub struct CitationabilityScorer;

const MAX: f64 = 12.0;

impl CategoryScorer for CitationabilityScorer {
    fn key(&self) -> &'static str {
        profiles::CITATIONABILITY
    }

    fn max(&self) -> f64 {
        MAX
    }

    fn score(&self, page: &PageModel) -> CategoryScore {
        CategoryScore::from_parts(
            MAX,
            &[
                ("fact_density", fact_density(page)),
                ("structured_data_blocks", structured_blocks(page)),
                ("https_security", security(page)),
                ("trust_hygiene", trust_hygiene(page)),
            ],
        )
    }
}

/// Fact density (max 4): statistics and definitions an engine can lift.
fn fact_density(page: &PageModel) -> f64 {
    (page.statistic_sentences as f64 * 0.2 + page.definition_count as f64 * 0.3).min(4.0)
}

/// Structured blocks (max 3): substantial tables and lists.
fn structured_blocks(page: &PageModel) -> f64 {
    let deep_tables = page.tables.iter().filter(|t| t.rows.len() >= 3).count();
    let long_lists = page.lists.iter().filter(|l| l.items.len() >= 4).count();
    (deep_tables as f64 * 0.5 + long_lists as f64 * 0.2).min(3.0)
}

/// Security (max 2): HTTPS with a valid-looking certificate chain.
fn security(page: &PageModel) -> f64 {
    if page.is_https && page.cert_valid {
        2.0
    } else {
        0.0
    }
}

/// Trust hygiene (max 3): no intrusive overlays, clear provenance.
fn trust_hygiene(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;
    if !page.has_intrusive_markers {
        score += 1.0;
    }
    if page.author.found || page.has_references_section {
        score += 2.0;
    }
    score
}
