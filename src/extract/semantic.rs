//! Semantic extraction: questions, answer patterns, keywords, facts.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::models::{AnswerPattern, AnswerPatternKind, Paragraph, Question, QuestionSource};
use crate::parse::{element_text, ParsedPage};
use crate::utils::{split_sentences, truncate_chars};

/// Top-K keywords kept from the TF-IDF pass.
const KEYWORD_LIMIT: usize = 20;

/// Answers captured after a question heading are capped at this length.
const ANSWER_CHAR_LIMIT: usize = 500;

/// Captured answer-pattern text is capped at this length.
const PATTERN_CHAR_LIMIT: usize = 300;

fn question_start_regex() -> Regex {
    Regex::new(r"(?i)^(How|What|Why|When|Where|Who|Which|Can|Is|Does|Do|Will|Should|Are)\b")
        .unwrap()
}

/// True when text reads as a question.
pub fn is_question(text: &str) -> bool {
    text.trim_end().ends_with('?') || question_start_regex().is_match(text)
}

/// Extract question headings (h2-h4) with their sibling answers, plus
/// inline question sentences from the main content.
pub fn extract_questions(page: &ParsedPage) -> Vec<Question> {
    let mut questions = Vec::new();

    let sel = Selector::parse("h2, h3, h4").unwrap();
    for heading in page.dom.select(&sel) {
        let text = element_text(&heading);
        if text.is_empty() || !is_question(&text) {
            continue;
        }
        let answer = answer_after_heading(&heading);
        questions.push(Question {
            text,
            source: QuestionSource::Heading,
            answer,
        });
    }

    // Inline questions: sentences that end with a question mark. The
    // final split chunk has no trailing '?' and is skipped.
    let heading_texts: HashSet<String> = questions.iter().map(|q| q.text.clone()).collect();
    let chunks: Vec<&str> = page.main_text.split('?').collect();
    for chunk in &chunks[..chunks.len().saturating_sub(1)] {
        let sentence = chunk.rsplit(['.', '!']).next().unwrap_or(chunk).trim();
        if sentence.len() > 10 && !heading_texts.contains(&format!("{}?", sentence)) {
            questions.push(Question {
                text: format!("{}?", sentence),
                source: QuestionSource::Inline,
                answer: None,
            });
        }
    }

    questions
}

/// Collect sibling content after a heading up to the next heading,
/// capped at 500 characters.
fn answer_after_heading(heading: &ElementRef<'_>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    for sibling in heading.next_siblings() {
        let Some(el) = ElementRef::wrap(sibling) else {
            continue;
        };
        let name = el.value().name();
        if matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
            break;
        }
        if matches!(name, "p" | "div" | "ul" | "ol") {
            let text = element_text(&el);
            if text.len() > 20 {
                parts.push(text);
            }
        }
        if parts.len() >= 2 {
            break;
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(truncate_chars(&parts.join(" "), ANSWER_CHAR_LIMIT).to_string())
}

/// Prefixes that mark a TL;DR-style direct answer block.
const TLDR_PREFIXES: &[&str] = &[
    "tldr",
    "tl;dr",
    "in short",
    "quick answer",
    "the answer is",
    "summary:",
];

/// Detect typed answer-pattern blocks.
pub fn extract_answer_patterns(page: &ParsedPage) -> Vec<AnswerPattern> {
    let mut patterns = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    // Class-marked definition and callout boxes.
    let all_sel = Selector::parse("div, section, p, span").unwrap();
    for el in page.dom.select(&all_sel) {
        let Some(class) = el.value().attr("class") else {
            continue;
        };
        let class = class.to_lowercase();
        let kind = if class.contains("callout") {
            Some(AnswerPatternKind::Callout)
        } else if class.contains("definition")
            || class.contains("answer-box")
            || class.contains("answer")
            || class.contains("highlight")
        {
            Some(AnswerPatternKind::DefinitionBox)
        } else {
            None
        };
        if let Some(kind) = kind {
            let text = element_text(&el);
            if text.len() > 20 && seen.insert(text.clone()) {
                patterns.push(AnswerPattern {
                    kind,
                    text: truncate_chars(&text, PATTERN_CHAR_LIMIT).to_string(),
                });
            }
        }
    }

    // TL;DR blocks by leading text.
    let block_sel = Selector::parse("div, p, section").unwrap();
    for el in page.dom.select(&block_sel) {
        let text = element_text(&el);
        let lower = text.to_lowercase();
        if TLDR_PREFIXES.iter().any(|p| lower.starts_with(p)) && seen.insert(text.clone()) {
            patterns.push(AnswerPattern {
                kind: AnswerPatternKind::Tldr,
                text: truncate_chars(&text, PATTERN_CHAR_LIMIT).to_string(),
            });
        }
    }

    // Blockquotes.
    let quote_sel = Selector::parse("blockquote").unwrap();
    for el in page.dom.select(&quote_sel) {
        let text = element_text(&el);
        if text.len() > 20 && seen.insert(text.clone()) {
            patterns.push(AnswerPattern {
                kind: AnswerPatternKind::Blockquote,
                text: truncate_chars(&text, PATTERN_CHAR_LIMIT).to_string(),
            });
        }
    }

    patterns
}

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "should", "can", "could", "may", "might", "must", "this", "that", "these",
    "those", "it", "its", "as", "by", "from", "not", "your", "you", "their", "they", "there",
    "what", "which", "when", "where", "how", "than", "then", "them", "more", "most", "some",
    "such", "into", "about", "also", "other", "only", "over", "very", "just",
];

fn is_stop_word(w: &str) -> bool {
    STOP_WORDS.contains(&w)
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// TF-IDF keyword extraction: top-20 unigrams and bigrams over the main
/// content, with paragraphs as the document set for the IDF term. Ties
/// break alphabetically so the output is stable.
pub fn extract_keywords(main_text: &str, paragraphs: &[Paragraph]) -> Vec<String> {
    let tokens = tokenize(main_text);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut terms: BTreeMap<String, usize> = BTreeMap::new();
    for w in &tokens {
        if w.len() > 3 && !is_stop_word(w) {
            *terms.entry(w.clone()).or_default() += 1;
        }
    }
    for pair in tokens.windows(2) {
        if pair.iter().all(|w| w.len() > 2 && !is_stop_word(w)) {
            *terms.entry(format!("{} {}", pair[0], pair[1])).or_default() += 1;
        }
    }

    // Document frequency over paragraphs; with fewer than two paragraphs
    // the IDF term is flat and this degenerates to plain frequency.
    let docs: Vec<String> = paragraphs.iter().map(|p| p.text.to_lowercase()).collect();
    let n_docs = docs.len().max(1) as f64;

    let mut scored: Vec<(String, f64)> = terms
        .into_iter()
        .filter(|(_, tf)| *tf >= 2)
        .map(|(term, tf)| {
            let df = docs.iter().filter(|d| d.contains(&term)).count().max(1) as f64;
            let idf = (1.0 + n_docs / df).ln();
            (term, tf as f64 * idf)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    scored
        .into_iter()
        .take(KEYWORD_LIMIT)
        .map(|(term, _)| term)
        .collect()
}

/// Count sentences that carry a statistic (a digit or percentage).
pub fn count_statistic_sentences(main_text: &str) -> usize {
    split_sentences(main_text)
        .iter()
        .filter(|s| s.contains('%') || s.chars().any(|c| c.is_ascii_digit()))
        .count()
}

/// Count definition-shaped sentences ("X is a ...", "X refers to ...").
pub fn count_definitions(main_text: &str) -> usize {
    let re = Regex::new(
        r"(?i)^(the |a |an )?[\w' -]{2,40}\s+(is|are|refers to|means|is defined as)\s+(a|an|the)?\s*\w",
    )
    .unwrap();
    split_sentences(main_text)
        .iter()
        .filter(|s| re.is_match(s))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn test_is_question() {
        assert!(is_question("What is AEO?"));
        assert!(is_question("how to optimize content"));
        assert!(is_question("Should you bother"));
        assert!(!is_question("A plain statement"));
    }

    #[test]
    fn test_question_headings_with_answers() {
        let page = parse(
            "<html><body><main>\
             <h2>What is answer engine optimization?</h2>\
             <p>It is the practice of structuring content so AI assistants can reuse it.</p>\
             <p>Engines prefer concise, well-marked-up pages.</p>\
             <h2>Unrelated section</h2><p>Other content goes here for padding.</p>\
             </main></body></html>",
        );
        let questions = extract_questions(&page);
        let heading_qs: Vec<&Question> = questions
            .iter()
            .filter(|q| q.source == QuestionSource::Heading)
            .collect();
        assert_eq!(heading_qs.len(), 1);
        let answer = heading_qs[0].answer.as_ref().unwrap();
        assert!(answer.contains("practice of structuring"));
        assert!(answer.len() <= 500);
    }

    #[test]
    fn test_answer_stops_at_next_heading() {
        let page = parse(
            "<html><body>\
             <h2>Why does structure matter?</h2>\
             <p>Because engines extract fragments, not whole pages sometimes.</p>\
             <h3>Details</h3>\
             <p>This paragraph belongs to the next section entirely.</p>\
             </body></html>",
        );
        let questions = extract_questions(&page);
        let q = questions
            .iter()
            .find(|q| q.source == QuestionSource::Heading)
            .unwrap();
        let answer = q.answer.as_ref().unwrap();
        assert!(!answer.contains("next section"));
    }

    #[test]
    fn test_answer_patterns_typed() {
        let page = parse(
            "<html><body>\
             <p>TL;DR: structure your content for machines and humans alike.</p>\
             <div class=\"callout note\">Remember to mark up your FAQ sections.</div>\
             <div class=\"definition\">AEO is optimization for answer engines.</div>\
             <blockquote>Quoted wisdom about content that engines can cite.</blockquote>\
             </body></html>",
        );
        let patterns = extract_answer_patterns(&page);
        let kinds: Vec<AnswerPatternKind> = patterns.iter().map(|p| p.kind).collect();
        assert!(kinds.contains(&AnswerPatternKind::Tldr));
        assert!(kinds.contains(&AnswerPatternKind::Callout));
        assert!(kinds.contains(&AnswerPatternKind::DefinitionBox));
        assert!(kinds.contains(&AnswerPatternKind::Blockquote));
    }

    #[test]
    fn test_keywords_stable_and_filtered() {
        let text = "Solar panels convert sunlight into electricity. Solar panels last decades. \
                    Panel efficiency varies. Solar energy is renewable energy.";
        let paragraphs = vec![Paragraph {
            text: text.to_string(),
            word_count: 20,
            has_emphasis: false,
        }];
        let k1 = extract_keywords(text, &paragraphs);
        let k2 = extract_keywords(text, &paragraphs);
        assert_eq!(k1, k2);
        assert!(k1.contains(&"solar".to_string()));
        assert!(k1.contains(&"solar panels".to_string()));
        assert!(!k1.iter().any(|k| k == "the" || k == "into"));
        assert!(k1.len() <= 20);
    }

    #[test]
    fn test_statistics_and_definitions() {
        let text = "Revenue grew 24% last year. The team shipped nothing new. \
                    AEO is a technique for answer engines. We love it.";
        assert_eq!(count_statistic_sentences(text), 1);
        assert_eq!(count_definitions(text), 1);
    }
}
