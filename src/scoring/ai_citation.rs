//! AI citation scoring (5 points, optional): probe configured answer
//! engines with synthesized prompts and measure whether the page gets
//! cited or reused.
//!
//! Only computed when the operator configured engines; absent engines
//! disable the category entirely. Alignment uses a local bag-of-words
//! cosine so re-scoring the same responses stays deterministic.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::AnswerEngine;
use crate::models::{CategoryScore, PageModel, QuestionSource};
use crate::utils::{host_of, split_sentences};

/// Category max.
pub const MAX: f64 = 5.0;

/// Prompts synthesized per audit.
const PROMPT_COUNT: usize = 20;

/// Minimum verbatim overlap treated as a quote.
const QUOTE_MIN_CHARS: usize = 10;

/// Sentence similarity treated as a near-verbatim quote.
const QUOTE_SIMILARITY: f64 = 0.9;

pub struct AiCitationScorer {
    engines: Vec<Arc<dyn AnswerEngine>>,
}

impl AiCitationScorer {
    pub fn new(engines: Vec<Arc<dyn AnswerEngine>>) -> Self {
        Self { engines }
    }

    pub fn is_enabled(&self) -> bool {
        !self.engines.is_empty()
    }

    /// Query every engine with every prompt and aggregate. Returns None
    /// when no engines are configured.
    pub async fn score(&self, page: &PageModel) -> Option<CategoryScore> {
        if self.engines.is_empty() {
            return None;
        }

        let prompts = generate_prompts(page);
        if prompts.is_empty() {
            return Some(CategoryScore::zero(MAX));
        }

        let mut total_queries = 0usize;
        let mut cited = 0usize;
        let mut response_texts: Vec<String> = Vec::new();

        for engine in &self.engines {
            for prompt in &prompts {
                total_queries += 1;
                match engine.query(prompt).await {
                    Ok(resp) => {
                        if detects_citation(page, &resp.text, &resp.citations) {
                            cited += 1;
                        }
                        response_texts.push(resp.text);
                    }
                    Err(e) => {
                        warn!("Engine {} query failed: {}", engine.name(), e);
                    }
                }
            }
        }

        if total_queries == 0 {
            return Some(CategoryScore::zero(MAX));
        }

        let citation_rate = cited as f64 / total_queries as f64;
        let alignment = alignment_score(page, &response_texts);
        debug!(
            "AI citation: {}/{} cited, alignment {:.2}",
            cited, total_queries, alignment
        );

        let citation_points = (citation_rate / 0.1 * 3.0).min(3.0);
        let alignment_points = alignment * 2.0;

        Some(CategoryScore::from_parts(
            MAX,
            &[
                ("citation_rate", citation_points),
                ("content_alignment", alignment_points),
            ],
        ))
    }
}

/// Synthesize up to 20 prompts from page questions, keywords, and H2s.
pub fn generate_prompts(page: &PageModel) -> Vec<String> {
    let mut prompts = Vec::new();

    for q in page
        .questions
        .iter()
        .filter(|q| q.source != QuestionSource::Inline)
    {
        prompts.push(q.text.clone());
    }
    for h in page.headings.iter().filter(|h| h.level == 2) {
        if !h.text.is_empty() {
            prompts.push(format!("Tell me about: {}", h.text));
        }
    }
    for kw in &page.main_keywords {
        prompts.push(format!("What should I know about {}?", kw));
    }

    prompts.dedup();
    prompts.truncate(PROMPT_COUNT);
    prompts
}

/// Did this response cite or reuse the page? Checks a domain/URL mention,
/// a verbatim quote (or a near-identical sentence), and fact reuse.
fn detects_citation(page: &PageModel, response: &str, citations: &[String]) -> bool {
    let response_lower = response.to_lowercase();

    // (i) Explicit citation or domain mention.
    if let Some(host) = host_of(&page.url) {
        let domain = host.strip_prefix("www.").unwrap_or(&host);
        if response_lower.contains(domain)
            || citations.iter().any(|c| c.to_lowercase().contains(domain))
        {
            return true;
        }
    }

    // (ii) Verbatim quote or highly similar sentence.
    for paragraph in &page.paragraphs {
        for sentence in split_sentences(&paragraph.text) {
            if sentence.len() < QUOTE_MIN_CHARS {
                continue;
            }
            if response_lower.contains(&sentence.to_lowercase()) {
                return true;
            }
            for resp_sentence in split_sentences(response) {
                if cosine_similarity(sentence, resp_sentence) >= QUOTE_SIMILARITY {
                    return true;
                }
            }
        }
    }

    // (iii) Fact reuse: a definition sentence reappearing in essence.
    for pattern in &page.answer_patterns {
        if pattern.text.len() >= QUOTE_MIN_CHARS
            && cosine_similarity(&pattern.text, response) >= 0.7
        {
            return true;
        }
    }

    false
}

/// Alignment between page content and the engine responses:
/// 0.6 x whole-text cosine + 0.4 x mean best-chunk cosine.
fn alignment_score(page: &PageModel, responses: &[String]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }

    let page_text: String = page
        .paragraphs
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if page_text.is_empty() {
        return 0.0;
    }
    let combined = responses.join(" ");
    let overall = cosine_similarity(&page_text, &combined);

    // Best-matching paragraph per response, averaged.
    let mut best_sum = 0.0;
    for response in responses {
        let best = page
            .paragraphs
            .iter()
            .map(|p| cosine_similarity(&p.text, response))
            .fold(0.0f64, f64::max);
        best_sum += best;
    }
    let mean_best = best_sum / responses.len() as f64;

    0.6 * overall + 0.4 * mean_best
}

/// Bag-of-words cosine similarity over lowercase word counts.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let va = word_counts(a);
    let vb = word_counts(b);
    if va.is_empty() || vb.is_empty() {
        return 0.0;
    }

    let dot: f64 = va
        .iter()
        .filter_map(|(w, ca)| vb.get(w).map(|cb| (*ca * *cb) as f64))
        .sum();
    let norm_a: f64 = va.values().map(|c| (*c * *c) as f64).sum::<f64>().sqrt();
    let norm_b: f64 = vb.values().map(|c| (*c * *c) as f64).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn word_counts(text: &str) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
    {
        *counts.entry(word.to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::StaticEngine;
    use crate::models::{Heading, Paragraph, Question};

    fn page_with_content() -> PageModel {
        let mut page = PageModel {
            url: "https://example.com/guide".into(),
            ..Default::default()
        };
        page.questions = vec![Question {
            text: "What is answer engine optimization?".into(),
            source: QuestionSource::Heading,
            answer: None,
        }];
        page.headings = vec![Heading {
            level: 2,
            text: "Getting started".into(),
            id: None,
        }];
        page.main_keywords = vec!["optimization".into()];
        page.paragraphs = vec![Paragraph {
            text: "Answer engine optimization makes content easy for assistants to reuse.".into(),
            word_count: 11,
            has_emphasis: false,
        }];
        page
    }

    #[test]
    fn test_prompt_generation() {
        let prompts = generate_prompts(&page_with_content());
        assert!(prompts.len() >= 3);
        assert!(prompts[0].contains("answer engine optimization"));
        assert!(prompts.len() <= 20);
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        assert!((cosine_similarity("the quick brown fox", "the quick brown fox") - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity("alpha beta gamma", "delta epsilon zeta"), 0.0);
        let partial = cosine_similarity("alpha beta gamma", "alpha beta other");
        assert!(partial > 0.0 && partial < 1.0);
    }

    #[test]
    fn test_domain_mention_detected() {
        let page = page_with_content();
        assert!(detects_citation(
            &page,
            "According to example.com, this works well.",
            &[]
        ));
        assert!(!detects_citation(&page, "Totally unrelated words here.", &[]));
    }

    #[test]
    fn test_verbatim_quote_detected() {
        let page = page_with_content();
        assert!(detects_citation(
            &page,
            "One source says: answer engine optimization makes content easy for assistants to reuse.",
            &[]
        ));
    }

    #[tokio::test]
    async fn test_disabled_without_engines() {
        let scorer = AiCitationScorer::new(vec![]);
        assert!(!scorer.is_enabled());
        assert!(scorer.score(&page_with_content()).await.is_none());
    }

    #[tokio::test]
    async fn test_scoring_with_static_engine() {
        let engine = Arc::new(StaticEngine {
            name: "static".into(),
            response: "Answer engine optimization makes content easy for assistants to reuse, \
                       per example.com."
                .into(),
        });
        let scorer = AiCitationScorer::new(vec![engine]);
        let score = scorer.score(&page_with_content()).await.unwrap();
        assert!(score.raw > 0.0);
        assert!(score.raw <= MAX);
        assert_eq!(score.max, MAX);
        // Every response cites the page: the citation component is maxed.
        assert_eq!(score.sub_scores["citation_rate"], 3.0);
    }
}
