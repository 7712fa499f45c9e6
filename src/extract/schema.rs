//! Structured-data extraction: JSON-LD, microdata/RDFa flags, FAQ schema,
//! and required-fields validation.
//!
//! Works on the raw document (the cleaner strips `<script>` tags, which is
//! exactly where JSON-LD lives). Broken blocks are recorded for
//! diagnostics and never abort the page.

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::models::{FaqPair, FaqSchema, SchemaValidation};
use crate::utils::truncate_chars;

/// Required fields per schema type for the completeness check.
const REQUIRED_FIELDS: &[(&str, &[&str])] = &[
    ("Article", &["headline", "author", "datePublished"]),
    ("BlogPosting", &["headline", "author", "datePublished"]),
    ("NewsArticle", &["headline", "author", "datePublished"]),
    ("Person", &["name"]),
    ("Organization", &["name"]),
    ("FAQPage", &["mainEntity"]),
    ("HowTo", &["name", "step"]),
    ("Product", &["name", "offers"]),
];

/// Everything learned from the page's structured data.
#[derive(Debug, Default)]
pub struct SchemaExtraction {
    /// Flat list of JSON-LD objects (`@graph` expanded).
    pub jsonld: Vec<Value>,
    /// Unparseable block snippets, for diagnostics.
    pub errors: Vec<String>,
    /// Distinct `@type` values in first-seen order.
    pub schema_types: Vec<String>,
    pub validations: Vec<SchemaValidation>,
    pub faq: FaqSchema,
    pub microdata_present: bool,
    pub rdfa_present: bool,
}

/// Extract structured data from the raw HTML.
pub fn extract_schema(raw_html: &str) -> SchemaExtraction {
    let dom = Html::parse_document(raw_html);
    let mut out = SchemaExtraction::default();

    let sel = Selector::parse("script[type=\"application/ld+json\"]").unwrap();
    for script in dom.select(&sel) {
        let raw = script.text().collect::<String>();
        if raw.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => flatten_jsonld(value, &mut out.jsonld),
            Err(e) => {
                debug!("Failed to parse JSON-LD block: {}", e);
                out.errors
                    .push(truncate_chars(raw.trim(), 200).to_string());
            }
        }
    }

    for block in &out.jsonld {
        for t in type_names(block) {
            if !out.schema_types.contains(&t) {
                out.schema_types.push(t);
            }
        }
        if let Some(validation) = validate_block(block) {
            out.validations.push(validation);
        }
    }

    out.faq = extract_faq(&out.jsonld);
    out.microdata_present = detect_attr(&dom, "[itemscope], [itemtype]");
    // `property` alone would false-positive on OpenGraph meta tags.
    out.rdfa_present = detect_attr(&dom, "[typeof], [vocab]");

    out
}

/// Expand `@graph` containers and top-level arrays into a flat list.
fn flatten_jsonld(value: Value, into: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_jsonld(item, into);
            }
        }
        Value::Object(_) => {
            if let Some(graph) = value.get("@graph").cloned() {
                flatten_jsonld(graph, into);
            } else {
                into.push(value);
            }
        }
        _ => {}
    }
}

/// `@type` values of a block (may be a string or an array).
pub fn type_names(block: &Value) -> Vec<String> {
    match block.get("@type") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Validate required fields for a block's primary type.
fn validate_block(block: &Value) -> Option<SchemaValidation> {
    let schema_type = type_names(block).into_iter().next()?;
    let required: Vec<String> = REQUIRED_FIELDS
        .iter()
        .find(|(t, _)| *t == schema_type)
        .map(|(_, fields)| fields.iter().map(|f| f.to_string()).collect())
        .unwrap_or_default();

    let missing: Vec<String> = required
        .iter()
        .filter(|f| block.get(f.as_str()).is_none())
        .cloned()
        .collect();
    let completeness = if required.is_empty() {
        1.0
    } else {
        (required.len() - missing.len()) as f64 / required.len() as f64
    };

    Some(SchemaValidation {
        schema_type,
        required,
        missing,
        completeness,
    })
}

/// Pull Q/A pairs from the first FAQPage block. A pair is valid when both
/// the question name and the accepted answer text are non-empty.
fn extract_faq(jsonld: &[Value]) -> FaqSchema {
    for block in jsonld {
        if !type_names(block).iter().any(|t| t == "FAQPage") {
            continue;
        }
        let entities: Vec<&Value> = match block.get("mainEntity") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => Vec::new(),
        };

        let pairs: Vec<FaqPair> = entities
            .iter()
            .map(|entity| {
                let question = entity
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let answer = entity
                    .get("acceptedAnswer")
                    .and_then(|a| a.get("text"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let valid = !question.is_empty() && !answer.is_empty();
                FaqPair {
                    question,
                    answer: truncate_chars(&answer, 200).to_string(),
                    valid,
                }
            })
            .collect();

        let valid_count = pairs.iter().filter(|p| p.valid).count();
        return FaqSchema {
            found: true,
            pairs,
            valid_count,
        };
    }
    FaqSchema::default()
}

fn detect_attr(dom: &Html, selector: &str) -> bool {
    let sel = Selector::parse(selector).unwrap();
    dom.select(&sel).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_jsonld(json: &str) -> String {
        format!(
            "<html><head><script type=\"application/ld+json\">{}</script></head><body></body></html>",
            json
        )
    }

    #[test]
    fn test_graph_flattened() {
        let html = page_with_jsonld(
            r#"{"@context":"https://schema.org","@graph":[
                {"@type":"Organization","name":"Acme"},
                {"@type":"WebSite","name":"Acme Site"}
            ]}"#,
        );
        let out = extract_schema(&html);
        assert_eq!(out.jsonld.len(), 2);
        assert_eq!(out.schema_types, vec!["Organization", "WebSite"]);
    }

    #[test]
    fn test_invalid_jsonld_recorded_not_fatal() {
        let html = page_with_jsonld("{not valid json");
        let out = extract_schema(&html);
        assert!(out.jsonld.is_empty());
        assert_eq!(out.errors.len(), 1);
    }

    #[test]
    fn test_article_completeness() {
        let html = page_with_jsonld(
            r#"{"@type":"Article","headline":"Title","author":{"@type":"Person","name":"Ada"}}"#,
        );
        let out = extract_schema(&html);
        let v = &out.validations[0];
        assert_eq!(v.schema_type, "Article");
        assert_eq!(v.missing, vec!["datePublished"]);
        assert!((v.completeness - 2.0 / 3.0).abs() < 1e-9);
        assert!(!v.is_complete());
    }

    #[test]
    fn test_faq_pairs_validity() {
        let html = page_with_jsonld(
            r#"{"@type":"FAQPage","mainEntity":[
                {"@type":"Question","name":"What is it?","acceptedAnswer":{"@type":"Answer","text":"A thing."}},
                {"@type":"Question","name":"Missing answer?","acceptedAnswer":{}},
                {"@type":"Question","name":"","acceptedAnswer":{"text":"orphan"}}
            ]}"#,
        );
        let out = extract_schema(&html);
        assert!(out.faq.found);
        assert_eq!(out.faq.pairs.len(), 3);
        assert_eq!(out.faq.valid_count, 1);
    }

    #[test]
    fn test_type_array_handled() {
        let html = page_with_jsonld(r#"{"@type":["Article","TechArticle"],"headline":"X","author":"A","datePublished":"2025-01-01"}"#);
        let out = extract_schema(&html);
        assert!(out.schema_types.contains(&"Article".to_string()));
        assert!(out.schema_types.contains(&"TechArticle".to_string()));
        assert!(out.validations[0].is_complete());
    }

    #[test]
    fn test_microdata_and_rdfa_flags() {
        let out = extract_schema(
            "<html><body><div itemscope itemtype=\"https://schema.org/Person\"></div></body></html>",
        );
        assert!(out.microdata_present);
        assert!(!out.rdfa_present);

        let out = extract_schema(
            "<html><body><div typeof=\"Person\" property=\"name\">Ada</div></body></html>",
        );
        assert!(out.rdfa_present);
    }
}
