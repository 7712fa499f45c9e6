//! Content quality scoring (15 points): depth, structure, unique value,
//! freshness, and media diversity.

use chrono::Utc;

use crate::models::{CategoryScore, PageModel};

use super::{profiles, CategoryScorer};

pub struct ContentQualityScorer;

const MAX: f64 = 15.0;

impl CategoryScorer for ContentQualityScorer {
    fn key(&self) -> &'static str {
        profiles::CONTENT_QUALITY
    }

    fn max(&self) -> f64 {
        MAX
    }

    fn score(&self, page: &PageModel) -> CategoryScore {
        CategoryScore::from_parts(
            MAX,
            &[
                ("content_depth", depth(page)),
                ("section_structure", structure(page)),
                ("unique_value", unique_value(page)),
                ("freshness", freshness(page)),
                ("media_diversity", media_diversity(page)),
            ],
        )
    }
}

/// Depth by main-content word count (max 4).
fn depth(page: &PageModel) -> f64 {
    match page.word_count {
        n if n >= 1500 => 4.0,
        n if n >= 800 => 3.0,
        n if n >= 400 => 2.0,
        n if n > 0 => 1.0,
        _ => 0.0,
    }
}

/// Section structure by h2 count (max 3).
fn structure(page: &PageModel) -> f64 {
    match page.heading_count(2) {
        n if n >= 8 => 3.0,
        n if n >= 5 => 2.0,
        n if n >= 2 => 1.0,
        _ => 0.0,
    }
}

/// Unique value (max 3): a data table, code, informative images.
fn unique_value(page: &PageModel) -> f64 {
    let mut score: f64 = 0.0;
    if !page.tables.is_empty() {
        score += 1.0;
    }
    if page.code_block_count > 0 {
        score += 1.0;
    }
    if page.informational_image_count() >= 3 {
        score += 1.0;
    }
    score.min(3.0)
}

/// Freshness by days since the last known update (max 3).
fn freshness(page: &PageModel) -> f64 {
    let Some(updated) = page.dates.last_updated() else {
        return 0.0;
    };
    let days = (Utc::now() - updated).num_days();
    match days {
        d if d <= 90 => 3.0,
        d if d <= 180 => 2.0,
        d if d <= 365 => 1.0,
        _ => 0.0,
    }
}

/// Media diversity (max 1): both images and tables present.
fn media_diversity(page: &PageModel) -> f64 {
    if !page.images.is_empty() && !page.tables.is_empty() {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateInfo, Heading, ImageInfo, TableBlock};
    use chrono::Duration;

    fn table() -> TableBlock {
        TableBlock {
            headers: vec!["a".into()],
            rows: vec![vec!["1".into()], vec!["2".into()]],
            caption: None,
        }
    }

    #[test]
    fn test_depth_tiers() {
        let mut page = PageModel::default();
        for (wc, expected) in [(0, 0.0), (50, 1.0), (400, 2.0), (800, 3.0), (2000, 4.0)] {
            page.word_count = wc;
            assert_eq!(
                ContentQualityScorer.score(&page).sub_scores["content_depth"],
                expected,
                "word_count {}",
                wc
            );
        }
    }

    #[test]
    fn test_depth_needs_words() {
        // One heading but zero main-content words scores no depth.
        let mut page = PageModel::default();
        page.headings = vec![Heading {
            level: 1,
            text: "Title".into(),
            id: None,
        }];
        page.word_count = 0;
        let s = ContentQualityScorer.score(&page);
        assert_eq!(s.sub_scores["content_depth"], 0.0);
    }

    #[test]
    fn test_structure_tiers() {
        let mut page = PageModel::default();
        page.headings = (0..8)
            .map(|_| Heading {
                level: 2,
                text: "h".into(),
                id: None,
            })
            .collect();
        assert_eq!(
            ContentQualityScorer.score(&page).sub_scores["section_structure"],
            3.0
        );
        page.headings.truncate(5);
        assert_eq!(
            ContentQualityScorer.score(&page).sub_scores["section_structure"],
            2.0
        );
        page.headings.truncate(2);
        assert_eq!(
            ContentQualityScorer.score(&page).sub_scores["section_structure"],
            1.0
        );
    }

    #[test]
    fn test_freshness_tiers() {
        let mut page = PageModel::default();
        page.dates = DateInfo {
            published: Some((Utc::now() - Duration::days(30)).to_rfc3339()),
            modified: None,
            sources: vec![],
        };
        assert_eq!(ContentQualityScorer.score(&page).sub_scores["freshness"], 3.0);

        page.dates.published = Some((Utc::now() - Duration::days(400)).to_rfc3339());
        assert_eq!(ContentQualityScorer.score(&page).sub_scores["freshness"], 0.0);

        // A recent modified date trumps an old publish date.
        page.dates.modified = Some((Utc::now() - Duration::days(120)).to_rfc3339());
        assert_eq!(ContentQualityScorer.score(&page).sub_scores["freshness"], 2.0);
    }

    #[test]
    fn test_unique_value_and_diversity() {
        let mut page = PageModel::default();
        page.tables = vec![table()];
        page.code_block_count = 2;
        page.images = (0..3)
            .map(|i| ImageInfo {
                src: format!("{}.png", i),
                alt: "A descriptive caption".into(),
                width: Some(400),
                height: Some(300),
                decorative: false,
            })
            .collect();
        let s = ContentQualityScorer.score(&page);
        assert_eq!(s.sub_scores["unique_value"], 3.0);
        assert_eq!(s.sub_scores["media_diversity"], 1.0);
    }
}
