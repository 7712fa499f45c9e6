//! Content-type scoring profiles.
//!
//! Different content types have different priorities: a product page is
//! not judged on question coverage the way a guide is. Weights multiply
//! category scores before the calculator renormalizes to 100.

use crate::models::ContentType;

/// Category keys in canonical order.
pub const ANSWERABILITY: &str = "answerability";
pub const STRUCTURED_DATA: &str = "structured_data";
pub const AUTHORITY: &str = "authority";
pub const CONTENT_QUALITY: &str = "content_quality";
pub const CITATIONABILITY: &str = "citationability";
pub const TECHNICAL: &str = "technical";
pub const AI_CITATION: &str = "ai_citation";

/// Weight multiplier for a category under a content type. AI citation is
/// weighted 1.0 for every type.
pub fn weight(category: &str, content_type: ContentType) -> f64 {
    use ContentType::*;
    match category {
        ANSWERABILITY => match content_type {
            Informational => 1.3,
            Experiential => 0.5,
            Transactional => 0.8,
            Navigational => 0.6,
        },
        STRUCTURED_DATA => match content_type {
            Informational => 1.0,
            Experiential => 1.3,
            Transactional => 1.4,
            Navigational => 1.2,
        },
        AUTHORITY => match content_type {
            Informational => 1.2,
            Experiential => 0.9,
            Transactional => 1.1,
            Navigational => 0.8,
        },
        CONTENT_QUALITY => match content_type {
            Informational => 1.2,
            Experiential => 1.1,
            Transactional => 0.9,
            Navigational => 0.7,
        },
        CITATIONABILITY => match content_type {
            Informational => 1.2,
            Experiential => 0.6,
            Transactional => 0.7,
            Navigational => 0.5,
        },
        TECHNICAL => match content_type {
            Informational => 1.0,
            Experiential => 1.0,
            Transactional => 1.2,
            Navigational => 1.3,
        },
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_informational_favors_answerability() {
        assert_eq!(weight(ANSWERABILITY, ContentType::Informational), 1.3);
        assert_eq!(weight(ANSWERABILITY, ContentType::Experiential), 0.5);
    }

    #[test]
    fn test_transactional_favors_structured_data() {
        assert_eq!(weight(STRUCTURED_DATA, ContentType::Transactional), 1.4);
        assert_eq!(weight(TECHNICAL, ContentType::Navigational), 1.3);
    }

    #[test]
    fn test_ai_citation_flat() {
        for ct in ContentType::ALL {
            assert_eq!(weight(AI_CITATION, ct), 1.0);
        }
    }
}
