//! The extracted page model.
//!
//! `PageModel` is a closed record: extractors each produce a slice of it
//! and the extraction entry point is the only writer. Once built it is
//! never mutated; scorers read it immutably, which is what makes the
//! calculator deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fetch::{FetchMethod, PerformanceMetrics};

/// A heading in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// 1-6.
    pub level: u8,
    pub text: String,
    pub id: Option<String>,
}

/// A main-content paragraph (blocks under 20 characters are skipped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub word_count: usize,
    pub has_emphasis: bool,
}

/// An ordered or unordered list with at least two items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListBlock {
    pub ordered: bool,
    pub items: Vec<String>,
    pub parent_heading: Option<String>,
}

/// A data table with at least two rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub caption: Option<String>,
}

/// A content image (tracking pixels and icons are filtered out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Empty or generic alt text ("image", "photo", "picture").
    pub decorative: bool,
}

impl ImageInfo {
    pub fn has_alt(&self) -> bool {
        !self.alt.trim().is_empty()
    }
}

/// Where a question was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Heading,
    Inline,
    FaqSchema,
}

/// A question the page poses (and possibly answers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub source: QuestionSource,
    /// Sibling content up to the next heading, capped at 500 chars.
    pub answer: Option<String>,
}

/// Typed direct-answer block patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerPatternKind {
    Tldr,
    DefinitionBox,
    Callout,
    Blockquote,
}

/// A detected direct-answer block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPattern {
    pub kind: AnswerPatternKind,
    pub text: String,
}

/// A question/answer pair from FAQPage schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqPair {
    pub question: String,
    pub answer: String,
    /// Both `name` and `acceptedAnswer.text` non-empty.
    pub valid: bool,
}

/// FAQPage schema summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaqSchema {
    pub found: bool,
    pub pairs: Vec<FaqPair>,
    pub valid_count: usize,
}

/// Required-fields validation of one JSON-LD object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaValidation {
    pub schema_type: String,
    pub required: Vec<String>,
    pub missing: Vec<String>,
    /// present / required, 1.0 when nothing is required.
    pub completeness: f64,
}

impl SchemaValidation {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Merged author signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub found: bool,
    pub name: Option<String>,
    pub url: Option<String>,
    pub bio: Option<String>,
    /// Which detectors fired: "jsonld", "meta", "byline".
    pub sources: Vec<String>,
}

/// Publication and modification dates with provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateInfo {
    /// ISO-8601, normalized.
    pub published: Option<String>,
    pub modified: Option<String>,
    /// Which detectors fired: "jsonld", "meta", "time_tag", "unparseable".
    pub sources: Vec<String>,
}

impl DateInfo {
    /// Parsed publication date (dates are stored normalized RFC 3339).
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Parsed modification date.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Most recent known date, for freshness checks.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.modified_at().or_else(|| self.published_at())
    }
}

/// Document metadata from the head.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub viewport: Option<String>,
    pub og: BTreeMap<String, String>,
    pub twitter: BTreeMap<String, String>,
    /// Explicit `<meta name="aeo:content-type">` override.
    pub aeo_content_type: Option<String>,
}

/// Everything the extractors learned about a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageModel {
    pub url: String,
    pub status_code: u16,
    pub fetched_at: Option<DateTime<Utc>>,
    pub fetch_method: FetchMethod,

    pub title: String,
    pub meta: PageMeta,

    // Structure
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<Paragraph>,
    pub lists: Vec<ListBlock>,
    pub tables: Vec<TableBlock>,
    pub images: Vec<ImageInfo>,
    pub code_block_count: usize,
    pub emphasis_count: usize,
    pub semantic_tag_count: usize,
    pub valid_heading_hierarchy: bool,

    // Semantics
    pub questions: Vec<Question>,
    pub answer_patterns: Vec<AnswerPattern>,
    pub main_keywords: Vec<String>,
    pub statistic_sentences: usize,
    pub definition_count: usize,

    // Structured data
    pub jsonld: Vec<serde_json::Value>,
    pub jsonld_errors: Vec<String>,
    pub schema_types: Vec<String>,
    pub schema_validations: Vec<SchemaValidation>,
    pub microdata_present: bool,
    pub rdfa_present: bool,
    pub faq_schema: FaqSchema,

    // Authority
    pub author: AuthorInfo,
    pub dates: DateInfo,
    pub external_links: Vec<String>,
    pub internal_links_count: usize,
    pub inline_citation_count: usize,
    pub has_references_section: bool,

    // Technical
    pub word_count: usize,
    pub is_https: bool,
    pub cert_valid: bool,
    pub has_responsive_css: bool,
    pub has_intrusive_markers: bool,
    pub performance: PerformanceMetrics,
}

impl PageModel {
    /// Count headings at a given level.
    pub fn heading_count(&self, level: u8) -> usize {
        self.headings.iter().filter(|h| h.level == level).count()
    }

    /// Combined h2 + h3 count, used by several scorers.
    pub fn section_heading_count(&self) -> usize {
        self.heading_count(2) + self.heading_count(3)
    }

    /// True when any schema type matches (exact match on `@type`).
    pub fn has_schema_type(&self, name: &str) -> bool {
        self.schema_types.iter().any(|t| t == name)
    }

    /// Non-decorative images.
    pub fn informational_image_count(&self) -> usize {
        self.images.iter().filter(|i| !i.decorative).count()
    }
}
