//! Metadata extraction: head tags, author, dates, links, citations.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use scraper::Selector;
use serde_json::Value;

use crate::models::{AuthorInfo, DateInfo, PageMeta};
use crate::parse::{element_text, ParsedPage};
use crate::utils::same_registrable_domain;

use super::schema::type_names;

/// Article-like types whose author/date fields we trust.
const ARTICLE_TYPES: &[&str] = &["Article", "BlogPosting", "NewsArticle", "TechArticle"];

/// Head metadata: title, description, canonical, social tags.
pub fn extract_meta(page: &ParsedPage) -> (String, PageMeta) {
    let dom = &page.dom;
    let mut meta = PageMeta::default();

    let title_sel = Selector::parse("title").unwrap();
    let h1_sel = Selector::parse("h1").unwrap();
    let title = dom
        .select(&title_sel)
        .next()
        .map(|t| element_text(&t))
        .filter(|t| !t.is_empty())
        .or_else(|| dom.select(&h1_sel).next().map(|h| element_text(&h)))
        .unwrap_or_default();

    let meta_sel = Selector::parse("meta").unwrap();
    for tag in dom.select(&meta_sel) {
        let el = tag.value();
        let Some(content) = el.attr("content") else {
            continue;
        };
        let key = el.attr("name").or_else(|| el.attr("property"));
        let Some(key) = key else { continue };

        match key {
            "description" => meta.description = Some(content.to_string()),
            "viewport" => meta.viewport = Some(content.to_string()),
            "aeo:content-type" => meta.aeo_content_type = Some(content.to_lowercase()),
            _ => {
                if let Some(og_key) = key.strip_prefix("og:") {
                    meta.og.insert(og_key.to_string(), content.to_string());
                } else if let Some(tw_key) = key.strip_prefix("twitter:") {
                    meta.twitter.insert(tw_key.to_string(), content.to_string());
                }
            }
        }
    }

    let canonical_sel = Selector::parse("link[rel=\"canonical\"]").unwrap();
    meta.canonical = dom
        .select(&canonical_sel)
        .next()
        .and_then(|l| l.value().attr("href"))
        .map(|s| s.to_string());

    (title, meta)
}

/// Merge author signals: JSON-LD, then `<meta name=author>`, then byline
/// elements with a "By X" prefix strip.
pub fn extract_author(page: &ParsedPage, jsonld: &[Value]) -> AuthorInfo {
    let mut author = AuthorInfo::default();

    // 1. Structured author on article-like blocks.
    for block in jsonld {
        if !type_names(block).iter().any(|t| ARTICLE_TYPES.contains(&t.as_str())) {
            continue;
        }
        let Some(field) = block.get("author") else {
            continue;
        };
        let (name, url) = match field {
            Value::String(s) => (Some(s.clone()), None),
            Value::Object(obj) => (
                obj.get("name").and_then(|v| v.as_str()).map(String::from),
                obj.get("url").and_then(|v| v.as_str()).map(String::from),
            ),
            Value::Array(items) => items
                .first()
                .map(|first| match first {
                    Value::String(s) => (Some(s.clone()), None),
                    Value::Object(obj) => (
                        obj.get("name").and_then(|v| v.as_str()).map(String::from),
                        obj.get("url").and_then(|v| v.as_str()).map(String::from),
                    ),
                    _ => (None, None),
                })
                .unwrap_or((None, None)),
            _ => (None, None),
        };
        if let Some(name) = name {
            author.found = true;
            author.name = Some(name);
            author.url = url;
            author.sources.push("jsonld".to_string());
            break;
        }
    }

    // 2. Meta author tag.
    let meta_sel = Selector::parse("meta[name=\"author\"]").unwrap();
    if let Some(content) = page
        .dom
        .select(&meta_sel)
        .next()
        .and_then(|m| m.value().attr("content"))
    {
        if !content.trim().is_empty() {
            if !author.found {
                author.found = true;
                author.name = Some(content.trim().to_string());
            }
            author.sources.push("meta".to_string());
        }
    }

    // 3. Byline elements.
    let byline_sel = Selector::parse(
        "[rel=\"author\"], .author, .byline, [class*=\"author\"], [class*=\"byline\"]",
    )
    .unwrap();
    if let Some(el) = page.dom.select(&byline_sel).next() {
        let text = element_text(&el);
        let name = strip_by_prefix(&text);
        if !name.is_empty() && name.len() < 80 {
            if !author.found {
                author.found = true;
                author.name = Some(name);
            }
            author.sources.push("byline".to_string());
        }
    }

    author
}

/// Strip a leading "By " from byline text.
fn strip_by_prefix(text: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("By ")
        .or_else(|| trimmed.strip_prefix("by "))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Dates from JSON-LD, `article:*` meta tags, then `<time datetime>`.
/// Unparseable values leave the field null and tag the source.
pub fn extract_dates(page: &ParsedPage, jsonld: &[Value]) -> DateInfo {
    let mut dates = DateInfo::default();
    let mut raw_published: Option<(String, &'static str)> = None;
    let mut raw_modified: Option<(String, &'static str)> = None;

    for block in jsonld {
        let types = type_names(block);
        if types.is_empty() {
            continue;
        }
        if let Some(v) = block.get("datePublished").and_then(|v| v.as_str()) {
            raw_published.get_or_insert((v.to_string(), "jsonld"));
        }
        if let Some(v) = block.get("dateModified").and_then(|v| v.as_str()) {
            raw_modified.get_or_insert((v.to_string(), "jsonld"));
        }
    }

    let pub_sel = Selector::parse("meta[property=\"article:published_time\"]").unwrap();
    let mod_sel = Selector::parse("meta[property=\"article:modified_time\"]").unwrap();
    if raw_published.is_none() {
        if let Some(v) = page
            .dom
            .select(&pub_sel)
            .next()
            .and_then(|m| m.value().attr("content"))
        {
            raw_published = Some((v.to_string(), "meta"));
        }
    }
    if raw_modified.is_none() {
        if let Some(v) = page
            .dom
            .select(&mod_sel)
            .next()
            .and_then(|m| m.value().attr("content"))
        {
            raw_modified = Some((v.to_string(), "meta"));
        }
    }

    if raw_published.is_none() {
        let time_sel = Selector::parse("time[datetime]").unwrap();
        if let Some(v) = page
            .dom
            .select(&time_sel)
            .next()
            .and_then(|t| t.value().attr("datetime"))
        {
            raw_published = Some((v.to_string(), "time_tag"));
        }
    }

    if let Some((raw, source)) = raw_published {
        match parse_date_tolerant(&raw) {
            Some(dt) => {
                dates.published = Some(dt.to_rfc3339());
                dates.sources.push(source.to_string());
            }
            None => dates.sources.push("unparseable".to_string()),
        }
    }
    if let Some((raw, source)) = raw_modified {
        match parse_date_tolerant(&raw) {
            Some(dt) => {
                dates.modified = Some(dt.to_rfc3339());
                if !dates.sources.contains(&source.to_string()) {
                    dates.sources.push(source.to_string());
                }
            }
            None => {
                if !dates.sources.contains(&"unparseable".to_string()) {
                    dates.sources.push("unparseable".to_string());
                }
            }
        }
    }

    dates
}

/// Tolerant date parsing: ISO-8601 first, then RFC 2822, then common
/// locale formats.
pub fn parse_date_tolerant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}

/// Anchor link split: deduplicated external URLs and the internal count.
pub fn extract_links(page: &ParsedPage, base_url: &str) -> (Vec<String>, usize) {
    let sel = Selector::parse("a[href]").unwrap();
    let mut external: Vec<String> = Vec::new();
    let mut internal = 0usize;

    for a in page.dom.select(&sel) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        if href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("javascript:") {
            continue;
        }
        if href.starts_with("http://") || href.starts_with("https://") {
            if same_registrable_domain(href, base_url) {
                internal += 1;
            } else if !external.iter().any(|e| e == href) {
                external.push(href.to_string());
            }
        } else {
            // Relative links are internal by construction.
            internal += 1;
        }
    }

    (external, internal)
}

/// Look for a references/sources section by heading text.
pub fn has_references_section(page: &ParsedPage) -> bool {
    let sel = Selector::parse("h2, h3, h4").unwrap();
    let re = Regex::new(r"(?i)^(references|sources|bibliography|citations|further reading)\b")
        .unwrap();
    page.dom.select(&sel).any(|h| re.is_match(&element_text(&h)))
}

/// Count inline citation markers like `[12]` in the main content.
pub fn count_inline_citations(main_text: &str) -> usize {
    let re = Regex::new(r"\[\d{1,3}\]").unwrap();
    re.find_iter(main_text).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn test_meta_extraction() {
        let page = parse(
            "<html><head><title>My Page</title>\
             <meta name=\"description\" content=\"A useful description.\">\
             <meta name=\"viewport\" content=\"width=device-width\">\
             <meta property=\"og:title\" content=\"OG Title\">\
             <meta name=\"twitter:card\" content=\"summary\">\
             <meta name=\"aeo:content-type\" content=\"Experiential\">\
             <link rel=\"canonical\" href=\"https://example.com/page\">\
             </head><body></body></html>",
        );
        let (title, meta) = extract_meta(&page);
        assert_eq!(title, "My Page");
        assert_eq!(meta.description.as_deref(), Some("A useful description."));
        assert_eq!(meta.og.get("title").map(String::as_str), Some("OG Title"));
        assert_eq!(meta.twitter.get("card").map(String::as_str), Some("summary"));
        assert_eq!(meta.aeo_content_type.as_deref(), Some("experiential"));
        assert_eq!(meta.canonical.as_deref(), Some("https://example.com/page"));
    }

    #[test]
    fn test_author_precedence_jsonld_first() {
        let page = parse(
            "<html><head><meta name=\"author\" content=\"Meta Author\"></head>\
             <body><span class=\"byline\">By Byline Author</span></body></html>",
        );
        let jsonld = vec![serde_json::json!({
            "@type": "Article",
            "author": {"@type": "Person", "name": "Structured Author", "url": "https://example.com/ada"}
        })];
        let author = extract_author(&page, &jsonld);
        assert!(author.found);
        assert_eq!(author.name.as_deref(), Some("Structured Author"));
        assert_eq!(author.sources, vec!["jsonld", "meta", "byline"]);
    }

    #[test]
    fn test_author_byline_fallback() {
        let page = parse(
            "<html><body><div class=\"post-byline\">By Grace Hopper</div></body></html>",
        );
        let author = extract_author(&page, &[]);
        assert!(author.found);
        assert_eq!(author.name.as_deref(), Some("Grace Hopper"));
        assert_eq!(author.sources, vec!["byline"]);
    }

    #[test]
    fn test_date_parsing_formats() {
        assert!(parse_date_tolerant("2025-06-15T10:30:00Z").is_some());
        assert!(parse_date_tolerant("2025-06-15").is_some());
        assert!(parse_date_tolerant("June 15, 2025").is_some());
        assert!(parse_date_tolerant("Sun, 15 Jun 2025 10:30:00 GMT").is_some());
        assert!(parse_date_tolerant("not a date").is_none());
    }

    #[test]
    fn test_unparseable_date_tagged() {
        let page = parse("<html><body></body></html>");
        let jsonld = vec![serde_json::json!({
            "@type": "Article",
            "datePublished": "last Tuesday"
        })];
        let dates = extract_dates(&page, &jsonld);
        assert!(dates.published.is_none());
        assert_eq!(dates.sources, vec!["unparseable"]);
    }

    #[test]
    fn test_dates_from_meta_fallback() {
        let page = parse(
            "<html><head>\
             <meta property=\"article:published_time\" content=\"2025-03-01T00:00:00Z\">\
             <meta property=\"article:modified_time\" content=\"2025-04-01T00:00:00Z\">\
             </head><body></body></html>",
        );
        let dates = extract_dates(&page, &[]);
        assert!(dates.published.is_some());
        assert!(dates.modified.is_some());
        assert_eq!(dates.sources, vec!["meta"]);
        assert!(dates.last_updated().is_some());
    }

    #[test]
    fn test_link_split() {
        let page = parse(
            "<html><body>\
             <a href=\"/internal\">in</a>\
             <a href=\"https://blog.example.com/post\">sub</a>\
             <a href=\"https://other.org/ref\">out</a>\
             <a href=\"https://other.org/ref\">dup</a>\
             <a href=\"#frag\">frag</a>\
             </body></html>",
        );
        let (external, internal) = extract_links(&page, "https://example.com/page");
        assert_eq!(external, vec!["https://other.org/ref"]);
        assert_eq!(internal, 2);
    }

    #[test]
    fn test_references_section() {
        let page = parse("<html><body><h2>References</h2></body></html>");
        assert!(has_references_section(&page));
        let page = parse("<html><body><h2>Everything else</h2></body></html>");
        assert!(!has_references_section(&page));
    }

    #[test]
    fn test_inline_citations() {
        assert_eq!(count_inline_citations("Fact one.[1] Fact two.[23] No cite."), 2);
    }
}
