//! Answerability scoring (30 points): how directly the page answers the
//! questions an engine would route to it.

use crate::models::{AnswerPatternKind, CategoryScore, PageModel};

use super::{profiles, CategoryScorer};

pub struct AnswerabilityScorer;

const MAX: f64 = 30.0;

impl CategoryScorer for AnswerabilityScorer {
    fn key(&self) -> &'static str {
        profiles::ANSWERABILITY
    }

    fn max(&self) -> f64 {
        MAX
    }

    fn score(&self, page: &PageModel) -> CategoryScore {
        CategoryScore::from_parts(
            MAX,
            &[
                ("direct_answer_presence", direct_answers(page)),
                ("question_coverage", question_coverage(page)),
                ("answer_conciseness", conciseness(page)),
                ("answer_block_formatting", formatting(page)),
            ],
        )
    }
}

/// Direct answer presence (max 12): a lead paragraph sized for extraction
/// plus typed answer blocks.
fn direct_answers(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;

    match page.paragraphs.first() {
        Some(first) if (50..=200).contains(&first.word_count) => score += 6.0,
        Some(_) => score += 3.0,
        None => {}
    }

    let answer_blocks = page
        .answer_patterns
        .iter()
        .filter(|p| p.kind != AnswerPatternKind::Blockquote)
        .count();
    score += (answer_blocks as f64 * 2.0).min(6.0);

    score.min(12.0)
}

/// Question coverage (max 8): question count and section headings, with a
/// bonus for a well-formed FAQ schema. The bonus applies before the cap.
fn question_coverage(page: &PageModel) -> f64 {
    let mut score =
        page.questions.len() as f64 * 0.8 + page.section_heading_count() as f64 * 0.5;
    if page.faq_schema.valid_count >= 3 {
        score += 3.0;
    }
    score.min(8.0)
}

/// Conciseness (max 6): scannable lists, a TL;DR, and short paragraphs.
fn conciseness(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;

    let chunky_lists = page.lists.iter().filter(|l| l.items.len() >= 3).count();
    score += (chunky_lists as f64 * 2.0).min(3.0);

    if page
        .answer_patterns
        .iter()
        .any(|p| p.kind == AnswerPatternKind::Tldr)
    {
        score += 2.0;
    }

    if page.paragraphs.len() >= 3 {
        let avg = page
            .paragraphs
            .iter()
            .map(|p| p.word_count)
            .sum::<usize>() as f64
            / page.paragraphs.len() as f64;
        if avg <= 150.0 {
            score += 2.0;
        }
    }

    score.min(6.0)
}

/// Formatting (max 4): strong heading skeleton, emphasis, callouts.
fn formatting(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;

    if page.heading_count(1) == 1 && page.section_heading_count() >= 3 {
        score += 2.0;
    }
    if page.emphasis_count >= 3 {
        score += 1.0;
    }
    if page.answer_patterns.iter().any(|p| {
        matches!(
            p.kind,
            AnswerPatternKind::Callout | AnswerPatternKind::Blockquote
        )
    }) {
        score += 1.0;
    }

    score.min(4.0)
}
