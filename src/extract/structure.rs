//! Structural extraction: headings, paragraphs, lists, tables, code.
//!
//! All functions are pure reads of the cleaned DOM.

use scraper::{ElementRef, Selector};

use crate::models::{Heading, ListBlock, Paragraph, TableBlock};
use crate::parse::{element_text, main_container, ParsedPage};

/// Paragraph blocks shorter than this are skipped as noise.
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Heading hierarchy in document order (h1-h6).
pub fn extract_headings(page: &ParsedPage) -> Vec<Heading> {
    let sel = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    page.dom
        .select(&sel)
        .filter_map(|el| {
            let text = element_text(&el);
            if text.is_empty() {
                return None;
            }
            let level = el.value().name().as_bytes()[1] - b'0';
            Some(Heading {
                level,
                text,
                id: el.value().attr("id").map(|s| s.to_string()),
            })
        })
        .collect()
}

/// Main-content paragraphs, skipping blocks under 20 characters.
pub fn extract_paragraphs(page: &ParsedPage) -> Vec<Paragraph> {
    let Some(main) = main_container(&page.dom) else {
        return Vec::new();
    };
    let sel = Selector::parse("p").unwrap();
    main.select(&sel)
        .filter_map(|el| {
            let text = element_text(&el);
            if text.len() < MIN_PARAGRAPH_CHARS {
                return None;
            }
            let emphasis_sel = Selector::parse("strong, b, em, i").unwrap();
            Some(Paragraph {
                word_count: text.split_whitespace().count(),
                has_emphasis: el.select(&emphasis_sel).next().is_some(),
                text,
            })
        })
        .collect()
}

/// Lists with at least two direct items, each tagged with the nearest
/// preceding heading.
pub fn extract_lists(page: &ParsedPage) -> Vec<ListBlock> {
    let mut lists = Vec::new();
    let mut last_heading: Option<String> = None;

    for node in page.dom.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let name = el.value().name();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                last_heading = Some(element_text(&el));
            }
            "ul" | "ol" => {
                let items: Vec<String> = direct_children(&el, "li")
                    .iter()
                    .map(element_text)
                    .filter(|t| !t.is_empty())
                    .collect();
                if items.len() >= 2 {
                    lists.push(ListBlock {
                        ordered: name == "ol",
                        items,
                        parent_heading: last_heading.clone(),
                    });
                }
            }
            _ => {}
        }
    }
    lists
}

/// Data tables with at least two rows.
pub fn extract_tables(page: &ParsedPage) -> Vec<TableBlock> {
    let table_sel = Selector::parse("table").unwrap();
    let th_sel = Selector::parse("th").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();
    let caption_sel = Selector::parse("caption").unwrap();

    page.dom
        .select(&table_sel)
        .filter_map(|table| {
            let headers: Vec<String> = table.select(&th_sel).map(|th| element_text(&th)).collect();
            let rows: Vec<Vec<String>> = table
                .select(&tr_sel)
                .map(|tr| tr.select(&td_sel).map(|td| element_text(&td)).collect())
                .filter(|cells: &Vec<String>| !cells.is_empty())
                .collect();
            if rows.len() < 2 {
                return None;
            }
            Some(TableBlock {
                headers,
                rows,
                caption: table.select(&caption_sel).next().map(|c| element_text(&c)),
            })
        })
        .collect()
}

/// Count code blocks: `<pre>` elements plus `<code>` outside of them.
pub fn count_code_blocks(page: &ParsedPage) -> usize {
    let pre_sel = Selector::parse("pre").unwrap();
    let code_sel = Selector::parse("code").unwrap();
    let pre_count = page.dom.select(&pre_sel).count();
    let standalone_code = page
        .dom
        .select(&code_sel)
        .filter(|el| {
            !el.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| a.value().name() == "pre")
        })
        .count();
    pre_count + standalone_code
}

/// Count emphasis spans in the document.
pub fn count_emphasis(page: &ParsedPage) -> usize {
    let sel = Selector::parse("strong, b, em, i").unwrap();
    page.dom.select(&sel).count()
}

/// Heading hierarchy validity: exactly one h1, and levels never jump down
/// by more than one (h2 followed by h4 is invalid).
pub fn valid_heading_hierarchy(headings: &[Heading]) -> bool {
    let h1_count = headings.iter().filter(|h| h.level == 1).count();
    if h1_count != 1 {
        return false;
    }
    let mut prev = 0u8;
    for h in headings {
        if prev != 0 && h.level > prev && h.level - prev > 1 {
            return false;
        }
        prev = h.level;
    }
    true
}

fn direct_children<'a>(el: &ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == tag)
        .collect()
}
