//! Content-aware scoring engine.
//!
//! Seven weighted categories, each behind a single capability: given a
//! `PageModel`, produce a `CategoryScore`. The calculator applies the
//! content-type weight matrix, renormalizes so the weighted maxes sum to
//! 100, and grades. Deterministic: the same model and configuration
//! always produce the same audit.

pub mod ai_citation;
mod answerability;
mod authority;
mod citationability;
mod content_quality;
pub mod geo;
pub mod profiles;
mod structured_data;
mod technical;

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{
    CategoryScore, ContentClassification, Grade, PageAudit, PageModel, Recommendation,
};

pub use answerability::AnswerabilityScorer;
pub use authority::AuthorityScorer;
pub use citationability::CitationabilityScorer;
pub use content_quality::ContentQualityScorer;
pub use structured_data::StructuredDataScorer;
pub use technical::TechnicalScorer;

/// A category scorer: pure function from page model to category score.
pub trait CategoryScorer: Send + Sync {
    fn key(&self) -> &'static str;
    fn max(&self) -> f64;
    fn score(&self, page: &PageModel) -> CategoryScore;
}

/// Recommendations with a gap below this many points are not worth
/// surfacing.
const RECOMMENDATION_MIN_GAP: f64 = 2.0;

/// Top-N recommendations kept per audit.
const RECOMMENDATION_LIMIT: usize = 10;

/// Orchestrates the category scorers into a `PageAudit`.
pub struct ScoreCalculator {
    scorers: Vec<Box<dyn CategoryScorer>>,
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self {
            scorers: vec![
                Box::new(AnswerabilityScorer),
                Box::new(StructuredDataScorer),
                Box::new(AuthorityScorer),
                Box::new(ContentQualityScorer),
                Box::new(CitationabilityScorer),
                Box::new(TechnicalScorer),
            ],
        }
    }

    /// Score a page. `ai_citation` is the pre-computed optional category;
    /// None removes it from the weighting entirely.
    pub fn calculate(
        &self,
        page: &PageModel,
        classification: &ContentClassification,
        ai_citation: Option<CategoryScore>,
    ) -> PageAudit {
        let content_type = classification.content_type;
        let mut breakdown: BTreeMap<String, CategoryScore> = BTreeMap::new();

        for scorer in &self.scorers {
            let score = scorer.score(page);
            debug!(
                "{}: {:.1}/{:.1} for {}",
                scorer.key(),
                score.raw,
                score.max,
                page.url
            );
            breakdown.insert(scorer.key().to_string(), score);
        }
        if let Some(ai) = ai_citation {
            breakdown.insert(profiles::AI_CITATION.to_string(), ai);
        }

        // Weighted sum, renormalized so the weighted maxes total 100.
        let weighted_max: f64 = breakdown
            .iter()
            .map(|(key, score)| score.max * profiles::weight(key, content_type))
            .sum();
        let overall_score = if weighted_max > 0.0 {
            let weighted_raw: f64 = breakdown
                .iter()
                .map(|(key, score)| score.raw * profiles::weight(key, content_type))
                .sum();
            (weighted_raw / weighted_max * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let overall_score = (overall_score * 10.0).round() / 10.0;

        let grade = Grade::from_score(overall_score);
        let recommendations = build_recommendations(&breakdown);

        PageAudit {
            url: page.url.clone(),
            overall_score,
            grade,
            content_classification: classification.clone(),
            breakdown,
            recommendations,
            fetched_at: page.fetched_at,
        }
    }
}

/// Gap-based recommendations, highest priority first.
fn build_recommendations(breakdown: &BTreeMap<String, CategoryScore>) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = breakdown
        .iter()
        .filter_map(|(key, score)| {
            let gap = score.max - score.raw;
            if gap < RECOMMENDATION_MIN_GAP || score.max == 0.0 {
                return None;
            }
            Some(Recommendation {
                category: key.clone(),
                title: format!("Improve {}", humanize(key)),
                current_score: score.raw,
                max_score: score.max,
                potential_gain: (gap * 10.0).round() / 10.0,
                priority: ((gap / score.max) * 100.0).round() as u32,
            })
        })
        .collect();

    recommendations.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.category.cmp(&b.category))
    });
    recommendations.truncate(RECOMMENDATION_LIMIT);
    recommendations
}

fn humanize(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, ContentType, Heading, Paragraph};

    fn classification(ct: ContentType) -> ContentClassification {
        ContentClassification {
            content_type: ct,
            confidence: Confidence::High,
            signals_matched: vec![],
        }
    }

    fn modest_page() -> PageModel {
        let mut page = PageModel {
            url: "https://example.com/guide".into(),
            is_https: true,
            cert_valid: true,
            word_count: 900,
            ..Default::default()
        };
        page.headings = vec![
            Heading {
                level: 1,
                text: "Guide".into(),
                id: None,
            },
            Heading {
                level: 2,
                text: "What is it?".into(),
                id: None,
            },
            Heading {
                level: 2,
                text: "Details".into(),
                id: None,
            },
        ];
        page.paragraphs = vec![Paragraph {
            text: "word ".repeat(100).trim().into(),
            word_count: 100,
            has_emphasis: true,
        }];
        page
    }

    #[test]
    fn test_overall_in_range_and_graded() {
        let audit = ScoreCalculator::new().calculate(
            &modest_page(),
            &classification(ContentType::Informational),
            None,
        );
        assert!(audit.overall_score >= 0.0 && audit.overall_score <= 100.0);
        assert_eq!(audit.grade, Grade::from_score(audit.overall_score));
        assert_eq!(audit.breakdown.len(), 6);
    }

    #[test]
    fn test_deterministic() {
        let page = modest_page();
        let calc = ScoreCalculator::new();
        let c = classification(ContentType::Informational);
        let a = calc.calculate(&page, &c, None);
        let b = calc.calculate(&page, &c, None);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_empty_page_scores_low_not_crash() {
        let page = PageModel::default();
        let audit = ScoreCalculator::new().calculate(
            &page,
            &ContentClassification::default(),
            None,
        );
        assert!(audit.overall_score >= 0.0);
        assert_eq!(audit.grade, Grade::F);
    }

    #[test]
    fn test_weighting_changes_overall() {
        // A page strong in answerability should score higher when
        // classified informational (x1.3) than experiential (x0.5).
        let mut page = modest_page();
        page.questions = (0..10)
            .map(|i| crate::models::Question {
                text: format!("Q{}?", i),
                source: crate::models::QuestionSource::Heading,
                answer: Some("An answer".into()),
            })
            .collect();
        let calc = ScoreCalculator::new();
        let info = calc.calculate(&page, &classification(ContentType::Informational), None);
        let exp = calc.calculate(&page, &classification(ContentType::Experiential), None);
        assert!(info.overall_score > exp.overall_score);
    }

    #[test]
    fn test_ai_citation_included_when_present() {
        let page = modest_page();
        let ai = CategoryScore::from_parts(5.0, &[("citation_rate", 3.0)]);
        let audit = ScoreCalculator::new().calculate(
            &page,
            &classification(ContentType::Informational),
            Some(ai),
        );
        assert_eq!(audit.breakdown.len(), 7);
        assert!(audit.breakdown.contains_key(profiles::AI_CITATION));
    }

    #[test]
    fn test_recommendations_sorted_and_capped() {
        let audit = ScoreCalculator::new().calculate(
            &PageModel::default(),
            &ContentClassification::default(),
            None,
        );
        assert!(!audit.recommendations.is_empty());
        assert!(audit.recommendations.len() <= 10);
        for pair in audit.recommendations.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
        assert!(audit.recommendations[0].title.starts_with("Improve "));
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("structured_data"), "Structured Data");
        assert_eq!(humanize("answerability"), "Answerability");
    }
}
