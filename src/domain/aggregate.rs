//! Domain-level aggregation of page audits.
//!
//! The domain overall is the arithmetic mean of per-page overall scores,
//! never a re-score of averaged sub-scores (non-linear sub-rules would
//! distort). Per-category page scores are sorted by URL for stable
//! output regardless of worker completion order.

use std::collections::BTreeMap;

use crate::models::{
    CategoryAggregate, DomainAudit, Grade, PageAudit, PageRef, PageScore,
};
use crate::scoring::geo::GeoPage;

/// Aggregate successful page audits into a domain audit. `geo_pages`
/// carries the per-page signals for the brand-level GEO pass.
pub fn aggregate(
    domain: &str,
    pages_attempted: usize,
    audits: Vec<PageAudit>,
    geo_pages: &[GeoPage],
) -> DomainAudit {
    let pages_successful = audits.len();

    if audits.is_empty() {
        return DomainAudit {
            domain: domain.to_string(),
            pages_audited: pages_attempted,
            pages_successful: 0,
            overall_score: 0.0,
            grade: Grade::F,
            breakdown: BTreeMap::new(),
            page_results: vec![],
            best_page: None,
            worst_page: None,
            geo_score: None,
        };
    }

    let overall_score = audits.iter().map(|a| a.overall_score).sum::<f64>() / audits.len() as f64;
    let overall_score = (overall_score * 10.0).round() / 10.0;

    // Per-category aggregation.
    let mut breakdown: BTreeMap<String, CategoryAggregate> = BTreeMap::new();
    let category_keys: Vec<String> = audits
        .iter()
        .flat_map(|a| a.breakdown.keys().cloned())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    for key in category_keys {
        let mut page_scores: Vec<PageScore> = audits
            .iter()
            .filter_map(|a| {
                a.breakdown.get(&key).map(|score| PageScore {
                    url: a.url.clone(),
                    score: score.raw,
                })
            })
            .collect();
        if page_scores.is_empty() {
            continue;
        }
        let max = audits
            .iter()
            .find_map(|a| a.breakdown.get(&key).map(|s| s.max))
            .unwrap_or(0.0);
        let mean = page_scores.iter().map(|p| p.score).sum::<f64>() / page_scores.len() as f64;
        let mean = (mean * 10.0).round() / 10.0;

        let best_page = page_scores
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap().then(b.url.cmp(&a.url)))
            .map(|p| p.url.clone());
        let worst_page = page_scores
            .iter()
            .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap().then(b.url.cmp(&a.url)))
            .map(|p| p.url.clone());

        // Stable output order regardless of completion order.
        page_scores.sort_by(|a, b| a.url.cmp(&b.url));

        breakdown.insert(
            key,
            CategoryAggregate {
                mean,
                max,
                percentage: if max > 0.0 {
                    ((mean / max) * 1000.0).round() / 10.0
                } else {
                    0.0
                },
                page_scores,
                best_page,
                worst_page,
            },
        );
    }

    let best_page = audits
        .iter()
        .max_by(|a, b| {
            a.overall_score
                .partial_cmp(&b.overall_score)
                .unwrap()
                .then(b.url.cmp(&a.url))
        })
        .map(|a| PageRef {
            url: a.url.clone(),
            overall_score: a.overall_score,
        });
    let worst_page = audits
        .iter()
        .min_by(|a, b| {
            a.overall_score
                .partial_cmp(&b.overall_score)
                .unwrap()
                .then(b.url.cmp(&a.url))
        })
        .map(|a| PageRef {
            url: a.url.clone(),
            overall_score: a.overall_score,
        });

    let geo_score = Some(crate::scoring::geo::score_domain(domain, geo_pages));

    DomainAudit {
        domain: domain.to_string(),
        pages_audited: pages_attempted,
        pages_successful,
        overall_score,
        grade: Grade::from_score(overall_score),
        breakdown,
        page_results: audits,
        best_page,
        worst_page,
        geo_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryScore, ContentClassification};

    fn audit(url: &str, overall: f64, answerability: f64) -> PageAudit {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(
            "answerability".to_string(),
            CategoryScore::from_parts(30.0, &[("direct_answer_presence", answerability)]),
        );
        PageAudit {
            url: url.to_string(),
            overall_score: overall,
            grade: Grade::from_score(overall),
            content_classification: ContentClassification::default(),
            breakdown,
            recommendations: vec![],
            fetched_at: None,
        }
    }

    #[test]
    fn test_overall_is_arithmetic_mean() {
        let audits = vec![
            audit("https://e.com/b", 40.0, 5.0),
            audit("https://e.com/a", 60.0, 10.0),
            audit("https://e.com/c", 80.0, 12.0),
        ];
        let result = aggregate("https://e.com", 3, audits, &[]);
        assert_eq!(result.overall_score, 60.0);
        assert_eq!(result.grade, Grade::CPlus);
        assert_eq!(result.pages_successful, 3);
    }

    #[test]
    fn test_page_scores_sorted_by_url() {
        let audits = vec![
            audit("https://e.com/zebra", 40.0, 5.0),
            audit("https://e.com/alpha", 60.0, 10.0),
            audit("https://e.com/mid", 80.0, 12.0),
        ];
        let result = aggregate("https://e.com", 3, audits, &[]);
        let urls: Vec<&str> = result.breakdown["answerability"]
            .page_scores
            .iter()
            .map(|p| p.url.as_str())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://e.com/alpha",
                "https://e.com/mid",
                "https://e.com/zebra"
            ]
        );
    }

    #[test]
    fn test_best_and_worst_pages() {
        let audits = vec![
            audit("https://e.com/low", 20.0, 2.0),
            audit("https://e.com/high", 90.0, 25.0),
        ];
        let result = aggregate("https://e.com", 2, audits, &[]);
        assert_eq!(result.best_page.as_ref().unwrap().url, "https://e.com/high");
        assert_eq!(result.worst_page.as_ref().unwrap().url, "https://e.com/low");
        // Best page beats every other page.
        for page in &result.page_results {
            assert!(result.best_page.as_ref().unwrap().overall_score >= page.overall_score);
        }
    }

    #[test]
    fn test_no_successes_grades_f() {
        let result = aggregate("https://e.com", 4, vec![], &[]);
        assert_eq!(result.pages_audited, 4);
        assert_eq!(result.pages_successful, 0);
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.grade, Grade::F);
        assert!(result.geo_score.is_none());
    }
}
