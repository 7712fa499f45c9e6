//! GEO (Generative Engine Optimization) scoring.
//!
//! A brand-level inclusion-readiness score, independent of per-page AEO
//! scores. Five additive components, each scanning only the already
//! extracted page models: no new fetching happens here.
//!
//! GEO (0-100) = Brand Foundation (30) + Topic Coverage (25)
//!             + Consistency (20) + AI Recall (15) + Trust (10)

use std::collections::BTreeMap;

use tracing::info;

use crate::models::{
    ContentType, GeoComponent, GeoScore, PageAudit, PageModel,
};
use crate::utils::truncate_chars;

/// Component maxima.
const MAX_BRAND_FOUNDATION: f64 = 30.0;
const MAX_TOPIC_COVERAGE: f64 = 25.0;
const MAX_CONSISTENCY: f64 = 20.0;
const MAX_AI_RECALL: f64 = 15.0;
const MAX_TRUST: f64 = 10.0;

/// Brand names that read as generic and are harder for engines to recall.
const GENERIC_BRAND_WORDS: &[&str] = &[
    "company", "business", "services", "solutions", "group", "corp", "inc",
];

/// Per-page signals the GEO scorer consumes.
#[derive(Debug, Clone)]
pub struct GeoPage {
    pub url: String,
    pub summary: String,
    pub content_type: ContentType,
    pub aeo_score: f64,
    pub has_author: bool,
    pub has_org_schema: bool,
    pub has_dates: bool,
}

impl GeoPage {
    /// Distill the signals from an extracted model and its audit.
    pub fn from_audit(model: &PageModel, audit: &PageAudit) -> Self {
        let mut summary = String::new();
        summary.push_str(&model.title);
        if let Some(desc) = &model.meta.description {
            summary.push(' ');
            summary.push_str(desc);
        }
        if let Some(first) = model.paragraphs.first() {
            summary.push(' ');
            summary.push_str(truncate_chars(&first.text, 300));
        }

        Self {
            url: model.url.clone(),
            summary,
            content_type: audit.content_classification.content_type,
            aeo_score: audit.overall_score,
            has_author: model.author.found,
            has_org_schema: model.has_schema_type("Organization"),
            has_dates: model.dates.published.is_some() || model.dates.modified.is_some(),
        }
    }

    fn is_knowledge(&self) -> bool {
        self.content_type == ContentType::Informational
    }

    fn is_experiential(&self) -> bool {
        self.content_type == ContentType::Experiential
    }
}

/// Compute the GEO score for a site from its audited pages.
pub fn score_domain(site_url: &str, pages: &[GeoPage]) -> GeoScore {
    if pages.is_empty() {
        return empty_score("No pages analyzed");
    }

    let brand_name = extract_brand_name(site_url);
    info!(
        "Calculating GEO score for {} ({} pages)",
        site_url,
        pages.len()
    );

    let mut components = BTreeMap::new();
    components.insert(
        "brand_foundation".to_string(),
        brand_foundation(pages, &brand_name),
    );
    components.insert(
        "topic_coverage".to_string(),
        topic_coverage(pages),
    );
    components.insert(
        "consistency".to_string(),
        consistency(pages, &brand_name),
    );
    components.insert("ai_recall".to_string(), ai_recall(pages, &brand_name));
    components.insert("trust".to_string(), trust(pages, site_url));

    let geo_score: f64 = components.values().map(|c| c.score).sum();
    let geo_score = (geo_score * 10.0).round() / 10.0;

    let summary = build_summary(pages, &components, &brand_name, geo_score);
    let recommended_actions = build_recommendations(&components);

    GeoScore {
        geo_score,
        brand_name,
        pages_analyzed: pages.len(),
        components,
        summary,
        recommended_actions,
    }
}

/// Brand name from the site URL: first domain label, capitalized.
fn extract_brand_name(site_url: &str) -> String {
    let stripped = site_url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    let label = stripped
        .split(['/', '.'])
        .next()
        .unwrap_or("unknown");
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Unknown".to_string(),
    }
}

/// Component 1 (30): can an engine define the brand clearly?
fn brand_foundation(pages: &[GeoPage], brand_name: &str) -> GeoComponent {
    let mut score: f64 = 0.0;
    let mut evidence = Vec::new();
    let brand_lower = brand_name.to_lowercase();

    // Canonical "What is X" page.
    let mut has_canonical = false;
    for page in pages {
        let url_lower = page.url.to_lowercase();
        let summary_lower = page.summary.to_lowercase();
        if ["/about", "/who-we-are", "/what-is"]
            .iter()
            .any(|p| url_lower.contains(p))
        {
            has_canonical = true;
            score += 10.0;
            evidence.push(format!("Found canonical brand page: {}", page.url));
            break;
        }
        if summary_lower.contains(&brand_lower)
            && (summary_lower.contains("about") || summary_lower.contains("what is"))
        {
            has_canonical = true;
            score += 8.0;
            evidence.push(format!("Found brand definition content: {}", page.url));
            break;
        }
    }
    if !has_canonical {
        evidence.push("Missing: no clear 'About' or brand definition page".to_string());
    }

    // Organization schema ubiquity.
    let org_count = pages.iter().filter(|p| p.has_org_schema).count();
    if org_count > 0 {
        score += (org_count as f64 * 4.0).min(8.0);
        evidence.push(format!("Organization schema on {} page(s)", org_count));
    } else {
        evidence.push("Missing: no Organization schema markup".to_string());
    }

    // Brand mention ubiquity.
    let mentions = pages
        .iter()
        .filter(|p| p.summary.to_lowercase().contains(&brand_lower))
        .count();
    let ratio = mentions as f64 / pages.len() as f64;
    score += (ratio * 7.0).floor();
    evidence.push(format!(
        "Brand mentioned in {}/{} pages ({:.0}%)",
        mentions,
        pages.len(),
        ratio * 100.0
    ));

    // Knowledge-intent pages.
    let knowledge = pages.iter().filter(|p| p.is_knowledge()).count();
    score += match knowledge {
        n if n >= 5 => 5.0,
        n if n >= 3 => 4.0,
        n if n >= 1 => 2.0,
        _ => 0.0,
    };
    if knowledge > 0 {
        evidence.push(format!("{} knowledge-focused page(s)", knowledge));
    } else {
        evidence.push("Missing: no knowledge-focused pages (guides, FAQs)".to_string());
    }

    GeoComponent {
        score: score.min(MAX_BRAND_FOUNDATION),
        max: MAX_BRAND_FOUNDATION,
        evidence,
    }
}

/// Component 2 (25): does the brand cover its topic space?
fn topic_coverage(pages: &[GeoPage]) -> GeoComponent {
    let mut score: f64 = 0.0;
    let mut evidence = Vec::new();

    let topics = extract_topics(pages);

    // Topic diversity.
    score += match topics.len() {
        n if n >= 8 => {
            evidence.push(format!("Strong topic coverage: {} distinct topics", n));
            10.0
        }
        n if n >= 5 => {
            evidence.push(format!("Good topic coverage: {} distinct topics", n));
            7.0
        }
        n if n >= 3 => {
            evidence.push(format!("Moderate topic coverage: {} topics", n));
            4.0
        }
        n => {
            evidence.push(format!("Limited topic coverage: only {} topics", n));
            2.0
        }
    };

    // Hub-and-spoke depth.
    let mut multi_topic_count = 0usize;
    let mut covered_total = 0usize;
    for topic in &topics {
        let covering = pages
            .iter()
            .filter(|p| {
                p.url.to_lowercase().contains(topic)
                    || p.summary.to_lowercase().contains(topic)
            })
            .count();
        if covering > 1 {
            multi_topic_count += 1;
            covered_total += covering;
        }
    }
    let mut depth_score: f64 = if multi_topic_count > 0 {
        let avg_depth = covered_total as f64 / multi_topic_count as f64;
        if avg_depth >= 3.0 {
            evidence.push(format!(
                "Excellent topic depth: {} topics with multiple pages",
                multi_topic_count
            ));
            10.0
        } else {
            evidence.push(format!(
                "Good topic depth: {} topics with 2+ pages",
                multi_topic_count
            ));
            7.0
        }
    } else {
        evidence.push("Weak: most topics covered by single pages only".to_string());
        2.0
    };
    let has_knowledge = pages.iter().any(|p| p.is_knowledge());
    let has_experiential = pages.iter().any(|p| p.is_experiential());
    if has_experiential && !has_knowledge {
        depth_score = (depth_score - 2.0).max(0.0);
        evidence.push("Experiential content lacks knowledge anchors".to_string());
    }
    score += depth_score;

    // Intent mix.
    score += if has_knowledge && has_experiential {
        evidence.push("Balanced content mix: knowledge + experiential".to_string());
        5.0
    } else if has_knowledge || has_experiential {
        evidence.push("Single-intent content mix".to_string());
        3.0
    } else {
        evidence.push("Limited intent diversity".to_string());
        1.0
    };

    GeoComponent {
        score: score.min(MAX_TOPIC_COVERAGE),
        max: MAX_TOPIC_COVERAGE,
        evidence,
    }
}

/// Topic keywords from URL path segments and recurring summary words.
fn extract_topics(pages: &[GeoPage]) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    let stop = [
        "this", "that", "with", "from", "have", "been", "were", "said", "each", "which",
        "their", "about", "would", "there", "https", "http", "page", "pages",
    ];

    for page in pages {
        // Path segments.
        if let Ok(url) = url::Url::parse(&page.url) {
            for segment in url.path().split('/') {
                let seg = segment.to_lowercase();
                if seg.len() > 3 && !stop.contains(&seg.as_str()) && !topics.contains(&seg) {
                    topics.push(seg);
                }
            }
        }
        // Recurring summary words.
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for word in page
            .summary
            .to_lowercase()
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| w.len() >= 4 && !stop.contains(w))
        {
            *counts.entry(word.to_string()).or_default() += 1;
        }
        for (word, count) in counts {
            if count > 1 && !topics.contains(&word) {
                topics.push(word);
            }
        }
    }

    topics.truncate(15);
    topics
}

/// Component 3 (20): semantic consistency across pages.
fn consistency(pages: &[GeoPage], brand_name: &str) -> GeoComponent {
    let max = MAX_CONSISTENCY;
    if pages.len() < 2 {
        return GeoComponent {
            score: 10.0,
            max,
            evidence: vec!["Single page - consistency not applicable".to_string()],
        };
    }

    let mut score: f64 = 0.0;
    let mut evidence = Vec::new();
    let brand_lower = brand_name.to_lowercase();

    // Brand mention coverage.
    let mentions = pages
        .iter()
        .filter(|p| p.summary.to_lowercase().contains(&brand_lower))
        .count();
    let ratio = mentions as f64 / pages.len() as f64;
    score += if ratio >= 0.8 {
        evidence.push(format!(
            "Excellent brand consistency: {:.0}% of pages mention the brand",
            ratio * 100.0
        ));
        8.0
    } else if ratio >= 0.5 {
        evidence.push(format!("Good brand consistency: {:.0}%", ratio * 100.0));
        5.0
    } else {
        evidence.push(format!(
            "Weak brand consistency: only {:.0}% of pages",
            ratio * 100.0
        ));
        2.0
    };

    // Tone proxy: summary-length variance within same-intent groups.
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for page in pages {
        groups
            .entry(page.content_type.as_str())
            .or_default()
            .push(page.summary.len() as f64);
    }
    let mut consistent_tone = true;
    for lengths in groups.values() {
        if lengths.len() > 1 {
            let avg = lengths.iter().sum::<f64>() / lengths.len() as f64;
            let variance =
                lengths.iter().map(|l| (l - avg).powi(2)).sum::<f64>() / lengths.len() as f64;
            if variance.sqrt() > avg * 0.5 {
                consistent_tone = false;
            }
        }
    }
    score += if consistent_tone {
        evidence.push("Consistent content tone across pages".to_string());
        7.0
    } else {
        evidence.push("Moderate tone consistency (variation detected)".to_string());
        4.0
    };

    // Quality outliers.
    let avg_aeo = pages.iter().map(|p| p.aeo_score).sum::<f64>() / pages.len() as f64;
    let outliers = pages
        .iter()
        .filter(|p| (p.aeo_score - avg_aeo).abs() > 30.0)
        .count();
    score += match outliers {
        0 => {
            evidence.push("No quality outliers - consistent standard".to_string());
            5.0
        }
        1 => {
            evidence.push("Mostly consistent quality across pages".to_string());
            3.0
        }
        n => {
            evidence.push(format!("Quality inconsistency: {} outlier pages", n));
            1.0
        }
    };

    GeoComponent {
        score: score.min(max),
        max,
        evidence,
    }
}

/// Component 4 (15): likelihood of implicit recall by engines.
fn ai_recall(pages: &[GeoPage], brand_name: &str) -> GeoComponent {
    let mut score: f64 = 0.0;
    let mut evidence = Vec::new();

    // Comparative / list content.
    let comparative = pages
        .iter()
        .filter(|p| {
            let s = p.summary.to_lowercase();
            ["compare", " vs ", "versus", "best", "top", "list", "guide"]
                .iter()
                .any(|w| s.contains(w))
        })
        .count();
    score += match comparative {
        n if n >= 3 => {
            evidence.push(format!("{} pages with comparative/list content", n));
            6.0
        }
        n if n >= 1 => {
            evidence.push(format!("{} comparative page(s)", n));
            3.0
        }
        _ => {
            evidence.push("Missing: no comparative or list-style content".to_string());
            0.0
        }
    };

    // Distinct brand naming.
    let distinct = !GENERIC_BRAND_WORDS.contains(&brand_name.to_lowercase().as_str());
    score += if distinct {
        evidence.push(format!("Distinct brand name: '{}'", brand_name));
        5.0
    } else {
        evidence.push(format!("Generic brand name: '{}'", brand_name));
        2.0
    };

    // Question-answering strength.
    let qa_pages = pages
        .iter()
        .filter(|p| p.is_knowledge() && p.aeo_score > 50.0)
        .count();
    score += match qa_pages {
        n if n >= 3 => {
            evidence.push(format!("{} pages optimized for Q&A", n));
            4.0
        }
        n if n >= 1 => {
            evidence.push(format!("{} Q&A-style page(s)", n));
            2.0
        }
        _ => {
            evidence.push("Missing: no strong question-answering content".to_string());
            0.0
        }
    };

    GeoComponent {
        score: score.min(MAX_AI_RECALL),
        max: MAX_AI_RECALL,
        evidence,
    }
}

/// Component 5 (10): would an engine feel safe including the brand?
fn trust(pages: &[GeoPage], site_url: &str) -> GeoComponent {
    let mut score: f64 = 0.0;
    let mut evidence = Vec::new();

    if site_url.starts_with("https://") || site_url.contains("localhost") {
        score += 3.0;
        evidence.push("HTTPS enabled".to_string());
    } else {
        evidence.push("No HTTPS".to_string());
    }

    let with_author = pages.iter().filter(|p| p.has_author).count();
    let author_ratio = with_author as f64 / pages.len() as f64;
    score += if author_ratio >= 0.5 {
        evidence.push(format!(
            "Strong authorship: {}/{} pages",
            with_author,
            pages.len()
        ));
        4.0
    } else if author_ratio >= 0.2 {
        evidence.push(format!(
            "Partial authorship: {}/{} pages",
            with_author,
            pages.len()
        ));
        2.0
    } else {
        evidence.push(format!(
            "Weak authorship: only {}/{} pages",
            with_author,
            pages.len()
        ));
        0.0
    };

    let with_dates = pages.iter().filter(|p| p.has_dates).count();
    let date_ratio = with_dates as f64 / pages.len() as f64;
    score += if date_ratio >= 0.5 {
        evidence.push(format!("Dates on {}/{} pages", with_dates, pages.len()));
        3.0
    } else if date_ratio >= 0.2 {
        evidence.push(format!("Some dates: {}/{} pages", with_dates, pages.len()));
        2.0
    } else {
        evidence.push(format!(
            "Missing dates: only {}/{} pages",
            with_dates,
            pages.len()
        ));
        0.0
    };

    GeoComponent {
        score: score.min(MAX_TRUST),
        max: MAX_TRUST,
        evidence,
    }
}

fn build_summary(
    pages: &[GeoPage],
    components: &BTreeMap<String, GeoComponent>,
    brand_name: &str,
    total: f64,
) -> String {
    let tone = if total >= 70.0 {
        "excellent"
    } else if total >= 50.0 {
        "strong"
    } else if total >= 30.0 {
        "moderate"
    } else {
        "limited"
    };

    let mut strengths: Vec<String> = Vec::new();
    let mut weaknesses: Vec<String> = Vec::new();
    for (name, comp) in components {
        let pct = comp.score / comp.max * 100.0;
        if pct >= 70.0 {
            strengths.push(name.replace('_', " "));
        } else if pct < 40.0 {
            weaknesses.push(name.replace('_', " "));
        }
    }

    let mut parts = vec![format!("{} shows {} GEO readiness", brand_name, tone)];
    let knowledge = pages.iter().filter(|p| p.is_knowledge()).count();
    let experiential = pages.iter().filter(|p| p.is_experiential()).count();
    if experiential > knowledge {
        parts.push("with a focus on experiential content".to_string());
    } else if knowledge > 0 {
        parts.push("with knowledge-focused content".to_string());
    }
    if !strengths.is_empty() {
        parts.push(format!(
            "particularly in {}",
            strengths[..strengths.len().min(2)].join(", ")
        ));
    }
    if !weaknesses.is_empty() {
        parts.push(format!(
            "but would benefit from improvements in {}",
            weaknesses[..weaknesses.len().min(2)].join(", ")
        ));
    }
    format!("{}.", parts.join(", "))
}

/// Actions for components under their 60% mark, capped at five.
fn build_recommendations(components: &BTreeMap<String, GeoComponent>) -> Vec<String> {
    let below = |name: &str| {
        components
            .get(name)
            .map(|c| c.score / c.max * 100.0 < 60.0)
            .unwrap_or(false)
    };

    let mut actions = Vec::new();
    if below("brand_foundation") {
        actions.push("Create a canonical 'About' or brand definition page".to_string());
        actions.push("Add Organization schema markup across key pages".to_string());
    }
    if below("topic_coverage") {
        actions.push("Expand topic coverage with knowledge-style hub pages".to_string());
        actions.push("Create content clusters (hub + spoke) for key topics".to_string());
    }
    if below("consistency") {
        actions.push("Improve brand name consistency across pages".to_string());
        actions.push("Standardize content quality and tone".to_string());
    }
    if below("ai_recall") {
        actions.push("Add comparative/list-style content (e.g. 'Best X for Y')".to_string());
        actions.push("Create Q&A-focused pages for common queries".to_string());
    }
    if below("trust") {
        actions.push("Add author information to content pages".to_string());
        actions.push("Include publication/update dates on all pages".to_string());
    }
    actions.truncate(5);
    actions
}

fn empty_score(reason: &str) -> GeoScore {
    let mut components = BTreeMap::new();
    for (name, max) in [
        ("brand_foundation", MAX_BRAND_FOUNDATION),
        ("topic_coverage", MAX_TOPIC_COVERAGE),
        ("consistency", MAX_CONSISTENCY),
        ("ai_recall", MAX_AI_RECALL),
        ("trust", MAX_TRUST),
    ] {
        components.insert(
            name.to_string(),
            GeoComponent {
                score: 0.0,
                max,
                evidence: vec![reason.to_string()],
            },
        );
    }
    GeoScore {
        geo_score: 0.0,
        brand_name: "Unknown".to_string(),
        pages_analyzed: 0,
        components,
        summary: reason.to_string(),
        recommended_actions: vec!["Audit pages before calculating a GEO score".to_string()],
    }
}
