//! Audit result models: classification, category scores, page and domain
//! audits, and the brand-level GEO score.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four content types used as a weighting axis (never a gate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Informational,
    Experiential,
    Transactional,
    Navigational,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Experiential => "experiential",
            Self::Transactional => "transactional",
            Self::Navigational => "navigational",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "informational" => Some(Self::Informational),
            "experiential" => Some(Self::Experiential),
            "transactional" => Some(Self::Transactional),
            "navigational" => Some(Self::Navigational),
            _ => None,
        }
    }

    pub const ALL: [ContentType; 4] = [
        Self::Informational,
        Self::Experiential,
        Self::Transactional,
        Self::Navigational,
    ];
}

/// Classifier confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Output of the content classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentClassification {
    pub content_type: ContentType,
    pub confidence: Confidence,
    pub signals_matched: Vec<String>,
}

impl Default for ContentClassification {
    fn default() -> Self {
        Self {
            content_type: ContentType::Informational,
            confidence: Confidence::Low,
            signals_matched: Vec::new(),
        }
    }
}

/// One category's score with named sub-scores.
///
/// Invariants: `0 <= raw <= max` and the sub-scores sum to `raw` within
/// 0.5. Both are enforced by `from_parts`, which rescales proportionally
/// when component maxima overshoot the category max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub raw: f64,
    pub max: f64,
    pub percentage: f64,
    pub sub_scores: BTreeMap<String, f64>,
}

impl CategoryScore {
    /// Build a category score from named components, clamping to `max`.
    pub fn from_parts(max: f64, parts: &[(&str, f64)]) -> Self {
        let mut sub_scores: BTreeMap<String, f64> = parts
            .iter()
            .map(|(name, v)| (name.to_string(), v.max(0.0)))
            .collect();
        let mut raw: f64 = sub_scores.values().sum();
        if raw > max && raw > 0.0 {
            let scale = max / raw;
            for v in sub_scores.values_mut() {
                *v = round1(*v * scale);
            }
            raw = sub_scores.values().sum();
            // Rounding drift stays inside the 0.5 tolerance; pin raw to max.
            raw = raw.min(max);
        }
        let raw = round1(raw);
        let percentage = if max > 0.0 {
            round1(raw / max * 100.0)
        } else {
            0.0
        };
        Self {
            raw,
            max,
            percentage,
            sub_scores,
        }
    }

    /// A zeroed score, used when a category cannot be computed.
    pub fn zero(max: f64) -> Self {
        Self::from_parts(max, &[])
    }
}

/// Letter grade derived from an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::APlus
        } else if score >= 85.0 {
            Self::A
        } else if score >= 80.0 {
            Self::AMinus
        } else if score >= 75.0 {
            Self::BPlus
        } else if score >= 70.0 {
            Self::B
        } else if score >= 65.0 {
            Self::BMinus
        } else if score >= 60.0 {
            Self::CPlus
        } else if score >= 55.0 {
            Self::C
        } else if score >= 50.0 {
            Self::CMinus
        } else {
            Self::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gap-based improvement recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub title: String,
    pub current_score: f64,
    pub max_score: f64,
    pub potential_gain: f64,
    /// 0-100, gap relative to the category max.
    pub priority: u32,
}

/// The canonical single-page audit result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAudit {
    pub url: String,
    pub overall_score: f64,
    pub grade: Grade,
    pub content_classification: ContentClassification,
    pub breakdown: BTreeMap<String, CategoryScore>,
    pub recommendations: Vec<Recommendation>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// A page's score within a per-category aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageScore {
    pub url: String,
    pub score: f64,
}

/// A category aggregated across a domain's pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAggregate {
    /// Mean raw score across successful pages.
    pub mean: f64,
    pub max: f64,
    pub percentage: f64,
    /// Sorted by URL for stable output.
    pub page_scores: Vec<PageScore>,
    pub best_page: Option<String>,
    pub worst_page: Option<String>,
}

/// Reference to a page by URL with its overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRef {
    pub url: String,
    pub overall_score: f64,
}

/// One of the five GEO components with its supporting evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoComponent {
    pub score: f64,
    pub max: f64,
    pub evidence: Vec<String>,
}

/// Brand-level inclusion-readiness score (independent of per-page scores).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoScore {
    pub geo_score: f64,
    pub brand_name: String,
    pub pages_analyzed: usize,
    pub components: BTreeMap<String, GeoComponent>,
    pub summary: String,
    pub recommended_actions: Vec<String>,
}

/// Aggregated domain audit, immutable once the job reaches a terminal
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainAudit {
    pub domain: String,
    pub pages_audited: usize,
    pub pages_successful: usize,
    pub overall_score: f64,
    pub grade: Grade,
    pub breakdown: BTreeMap<String, CategoryAggregate>,
    pub page_results: Vec<PageAudit>,
    pub best_page: Option<PageRef>,
    pub worst_page: Option<PageRef>,
    pub geo_score: Option<GeoScore>,
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
