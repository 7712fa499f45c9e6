//! HTML cleanup and main-content isolation.
//!
//! Produces a cleaned DOM (noise subtrees detached) plus the main-content
//! text string every downstream extractor works from. Flags that depend
//! on the raw document (intrusive markers, responsive CSS) are captured
//! before stripping.

use scraper::{ElementRef, Html, Selector};

use crate::utils::normalize_whitespace;

/// Class/id fragments that mark non-content chrome. "ad" is matched as a
/// standalone segment only, so "header"/"badge" survive.
const NOISE_MARKERS: &[&str] = &["advertisement", "sponsored", "cookie-banner", "popup"];

/// Class/id fragments that mark intrusive overlays (recorded, then removed).
const INTRUSIVE_MARKERS: &[&str] = &["popup", "paywall", "interstitial", "modal-overlay"];

/// Tags removed wholesale during cleanup.
const NOISE_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

/// A parsed page: cleaned DOM plus pre-computed content and flags.
pub struct ParsedPage {
    pub dom: Html,
    /// Whitespace-normalized text of the main container.
    pub main_text: String,
    /// Intrusive overlay markers were present before cleanup.
    pub has_intrusive_markers: bool,
    /// The raw document carried responsive CSS signals.
    pub has_responsive_css: bool,
}

/// Parse and clean an HTML document.
pub fn parse(html: &str) -> ParsedPage {
    let has_responsive_css = html.contains("@media")
        || html.contains("media=\"(")
        || html.contains("srcset=");
    let mut dom = Html::parse_document(html);

    let has_intrusive_markers = scan_intrusive(&dom);
    remove_noise(&mut dom);

    let main_text = main_content_text(&dom);

    ParsedPage {
        dom,
        main_text,
        has_intrusive_markers,
        has_responsive_css,
    }
}

/// Check for intrusive overlay markers before they are stripped.
fn scan_intrusive(dom: &Html) -> bool {
    for node in dom.tree.nodes() {
        if let Some(el) = node.value().as_element() {
            let marker_hit = el
                .attr("class")
                .into_iter()
                .chain(el.attr("id"))
                .any(|v| {
                    let v = v.to_lowercase();
                    INTRUSIVE_MARKERS.iter().any(|m| v.contains(m))
                });
            if marker_hit {
                return true;
            }
        }
    }
    false
}

/// True when an element is noise chrome by tag or class/id marker.
fn is_noise_element(el: &scraper::node::Element) -> bool {
    let tag = el.name();
    if NOISE_TAGS.contains(&tag) {
        return true;
    }
    el.attr("class")
        .into_iter()
        .chain(el.attr("id"))
        .any(|v| has_noise_marker(v))
}

fn has_noise_marker(value: &str) -> bool {
    let v = value.to_lowercase();
    if NOISE_MARKERS.iter().any(|m| v.contains(m)) {
        return true;
    }
    v.split(|c: char| !c.is_alphanumeric())
        .any(|seg| seg == "ad" || seg == "ads")
}

/// Detach every noise subtree from the DOM.
fn remove_noise(dom: &mut Html) {
    let ids: Vec<_> = dom
        .tree
        .nodes()
        .filter(|n| n.value().as_element().map(is_noise_element).unwrap_or(false))
        .map(|n| n.id())
        .collect();
    for id in ids {
        if let Some(mut node) = dom.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Pick the main content container: `<main>`, then `<article>`, then the
/// largest `<div>` by visible text, then `<body>`.
pub fn main_container(dom: &Html) -> Option<ElementRef<'_>> {
    let main_sel = Selector::parse("main").unwrap();
    if let Some(el) = dom.select(&main_sel).next() {
        return Some(el);
    }
    let article_sel = Selector::parse("article").unwrap();
    if let Some(el) = dom.select(&article_sel).next() {
        return Some(el);
    }

    let div_sel = Selector::parse("div").unwrap();
    let largest = dom
        .select(&div_sel)
        .map(|el| (el, element_text_len(&el)))
        .filter(|(_, len)| *len > 200)
        .max_by_key(|(_, len)| *len);
    if let Some((el, _)) = largest {
        return Some(el);
    }

    let body_sel = Selector::parse("body").unwrap();
    dom.select(&body_sel).next()
}

fn element_text_len(el: &ElementRef<'_>) -> usize {
    el.text().map(|t| t.trim().len()).sum()
}

/// Whitespace-normalized text of the main container.
fn main_content_text(dom: &Html) -> String {
    match main_container(dom) {
        Some(el) => normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")),
        None => String::new(),
    }
}

/// Element text with whitespace normalized, for extractor use.
pub fn element_text(el: &ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}
