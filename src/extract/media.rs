//! Media extraction: content images with alt-text analysis.

use scraper::Selector;

use crate::models::ImageInfo;
use crate::parse::ParsedPage;

/// Images below this dimension are treated as icons/tracking pixels.
const MIN_DIMENSION: u32 = 50;

/// Alt values that carry no information.
const GENERIC_ALTS: &[&str] = &["image", "photo", "picture"];

/// Extract content images. Images with a declared width or height under
/// 50px are skipped; images without declared dimensions are kept.
pub fn extract_images(page: &ParsedPage) -> Vec<ImageInfo> {
    let sel = Selector::parse("img[src]").unwrap();
    page.dom
        .select(&sel)
        .filter_map(|img| {
            let el = img.value();
            let src = el.attr("src")?.to_string();
            if src.starts_with("data:") {
                return None;
            }
            let width = el.attr("width").and_then(|w| w.parse().ok());
            let height = el.attr("height").and_then(|h| h.parse().ok());
            if width.map(|w: u32| w < MIN_DIMENSION).unwrap_or(false)
                || height.map(|h: u32| h < MIN_DIMENSION).unwrap_or(false)
            {
                return None;
            }
            let alt = el.attr("alt").unwrap_or_default().trim().to_string();
            let decorative =
                alt.is_empty() || GENERIC_ALTS.contains(&alt.to_lowercase().as_str());
            Some(ImageInfo {
                src,
                alt,
                width,
                height,
                decorative,
            })
        })
        .collect()
}
