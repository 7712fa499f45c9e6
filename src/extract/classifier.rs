//! Content type classification.
//!
//! Signals are consulted in strict priority order, stopping at the first
//! confident match: explicit meta tag, then schema types, then URL path,
//! then content heuristics. The result is advisory input to scoring, not
//! a gate.

use crate::models::{Confidence, ContentClassification, ContentType, PageModel};

/// Schema.org types mapped to content types.
const SCHEMA_TYPE_MAP: &[(&str, ContentType)] = &[
    // Informational
    ("Article", ContentType::Informational),
    ("BlogPosting", ContentType::Informational),
    ("NewsArticle", ContentType::Informational),
    ("HowTo", ContentType::Informational),
    ("FAQPage", ContentType::Informational),
    ("QAPage", ContentType::Informational),
    ("TechArticle", ContentType::Informational),
    ("ScholarlyArticle", ContentType::Informational),
    // Experiential
    ("Event", ContentType::Experiential),
    ("Place", ContentType::Experiential),
    ("TouristAttraction", ContentType::Experiential),
    ("LodgingBusiness", ContentType::Experiential),
    ("Restaurant", ContentType::Experiential),
    ("LocalBusiness", ContentType::Experiential),
    ("TravelAction", ContentType::Experiential),
    ("Trip", ContentType::Experiential),
    // Transactional
    ("Product", ContentType::Transactional),
    ("Offer", ContentType::Transactional),
    ("Service", ContentType::Transactional),
    ("Order", ContentType::Transactional),
    // Navigational
    ("CollectionPage", ContentType::Navigational),
    ("ItemList", ContentType::Navigational),
    ("WebSite", ContentType::Navigational),
];

const EXPERIENTIAL_URL_PATTERNS: &[&str] = &[
    "/experience", "/event", "/tour", "/visit", "/trip", "/travel", "/attraction", "/place",
    "/story", "/journey",
];

const TRANSACTIONAL_URL_PATTERNS: &[&str] = &[
    "/product", "/shop", "/store", "/buy", "/pricing", "/plans", "/checkout", "/cart",
];

const INFORMATIONAL_URL_PATTERNS: &[&str] = &[
    "/blog", "/article", "/guide", "/how-to", "/tutorial", "/faq", "/help", "/learn", "/docs",
    "/wiki",
];

const NAVIGATIONAL_URL_PATTERNS: &[&str] = &["/category", "/archive", "/index", "/sitemap", "/tag"];

const EXPERIENTIAL_KEYWORDS: &[&str] = &[
    "experience", "journey", "story", "adventure", "explore", "discover", "visit", "tour",
    "trip", "travel", "event", "celebration", "memories", "atmosphere", "immerse",
];

const INFORMATIONAL_KEYWORDS: &[&str] = &[
    "how to", "guide", "tutorial", "learn", "understand", "explain", "definition", "what is",
    "steps", "tips", "advice", "faq", "question", "answer", "instruction",
];

const TRANSACTIONAL_KEYWORDS: &[&str] = &[
    "buy", "purchase", "price", "cost", "order", "cart", "checkout", "add to cart", "book now",
    "reserve", "subscription", "shipping", "payment", "discount", "sale",
];

/// Classify a page's content type.
pub fn classify(page: &PageModel, main_text: &str) -> ContentClassification {
    let mut signals = Vec::new();

    // 1. Explicit meta tag always wins.
    if let Some(explicit) = page
        .meta
        .aeo_content_type
        .as_deref()
        .and_then(ContentType::parse)
    {
        signals.push(format!("meta_tag:{}", explicit.as_str()));
        return ContentClassification {
            content_type: explicit,
            confidence: Confidence::High,
            signals_matched: signals,
        };
    }

    // 2. Schema types: high confidence when a single dominant mapping.
    let mapped: Vec<ContentType> = page
        .schema_types
        .iter()
        .filter_map(|t| {
            SCHEMA_TYPE_MAP
                .iter()
                .find(|(name, _)| name == t)
                .map(|(_, ct)| *ct)
        })
        .collect();
    if let Some(first) = mapped.first() {
        let dominant = mapped.iter().all(|ct| ct == first);
        signals.push(format!("schema:{}", first.as_str()));
        return ContentClassification {
            content_type: *first,
            confidence: if dominant {
                Confidence::High
            } else {
                Confidence::Medium
            },
            signals_matched: signals,
        };
    }

    // 3. URL path patterns.
    let url_lower = page.url.to_lowercase();
    let url_match = [
        (EXPERIENTIAL_URL_PATTERNS, ContentType::Experiential),
        (TRANSACTIONAL_URL_PATTERNS, ContentType::Transactional),
        (INFORMATIONAL_URL_PATTERNS, ContentType::Informational),
        (NAVIGATIONAL_URL_PATTERNS, ContentType::Navigational),
    ]
    .iter()
    .find_map(|(patterns, ct)| {
        patterns
            .iter()
            .find(|p| url_lower.contains(*p))
            .map(|p| (*p, *ct))
    });
    if let Some((pattern, ct)) = url_match {
        signals.push(format!("url:{}", pattern));
        return ContentClassification {
            content_type: ct,
            confidence: Confidence::Medium,
            signals_matched: signals,
        };
    }

    // 4. Content heuristics: keyword histogram plus structural hints.
    let text_lower = main_text.to_lowercase();
    let mut scores = [0usize; 4];
    scores[idx(ContentType::Experiential)] = keyword_score(&text_lower, EXPERIENTIAL_KEYWORDS);
    scores[idx(ContentType::Informational)] = keyword_score(&text_lower, INFORMATIONAL_KEYWORDS);
    scores[idx(ContentType::Transactional)] = keyword_score(&text_lower, TRANSACTIONAL_KEYWORDS);

    for ct in ContentType::ALL {
        if scores[idx(ct)] > 0 {
            signals.push(format!("heuristic:{}:{}", ct.as_str(), scores[idx(ct)]));
        }
    }

    if let Some(structural) = structural_hint(page) {
        signals.push(format!("structure:{}", structural.as_str()));
        scores[idx(structural)] += 1;
    }

    let best = ContentType::ALL
        .into_iter()
        .max_by_key(|ct| scores[idx(*ct)])
        .unwrap_or_default();
    let best_score = scores[idx(best)];

    if best_score == 0 {
        // No signal at all: the default.
        return ContentClassification::default();
    }

    ContentClassification {
        content_type: best,
        confidence: if best_score >= 2 {
            Confidence::Medium
        } else {
            Confidence::Low
        },
        signals_matched: signals,
    }
}

fn idx(ct: ContentType) -> usize {
    match ct {
        ContentType::Informational => 0,
        ContentType::Experiential => 1,
        ContentType::Transactional => 2,
        ContentType::Navigational => 3,
    }
}

/// Keyword hits normalized to 0-3.
fn keyword_score(text: &str, keywords: &[&str]) -> usize {
    let hits: usize = keywords.iter().map(|k| text.matches(k).count()).sum();
    (hits / 3).min(3)
}

/// Structural hints from the extracted model.
fn structural_hint(page: &PageModel) -> Option<ContentType> {
    if page.images.len() > 10 {
        return Some(ContentType::Experiential);
    }
    let question_headings = page
        .questions
        .iter()
        .filter(|q| q.source == crate::models::QuestionSource::Heading)
        .count();
    if question_headings >= 3 || (page.section_heading_count() > 5 && page.lists.len() > 3) {
        return Some(ContentType::Informational);
    }
    if page.internal_links_count + page.external_links.len() > 50 {
        return Some(ContentType::Navigational);
    }
    None
}
