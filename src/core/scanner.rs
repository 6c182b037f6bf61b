use crate::core::dom;
use crate::core::extractor::{extract_mark, MarkSource};
use crate::core::locator::Candidate;
use scraper::ElementRef;
use std::collections::HashSet;

/// A day cell as found in the page, before classification.
#[derive(Debug, Clone)]
pub struct RawCell<'a> {
    pub element: ElementRef<'a>,
    pub day: u32,
    pub raw_mark: String,
    pub mark_source: MarkSource,
}

// 本身就是格子的元素不往上提
const NEVER_LABEL_TAGS: &[&str] = &[
    "td", "th", "tr", "li", "dt", "dd", "table", "tbody", "ul", "ol", "dl", "section", "article", "main",
];

/// Lazily yields one [`RawCell`] per day cell under `candidate`, in document order.
///
/// An element counts when its own text starts with a day number. A bare day label
/// (any leaf element holding only the number, a link or button included) stands for its parent, as long as the
/// parent holds no other day label; that way a status mark rendered as a sibling of
/// the label is extracted from the right cell.
pub fn scan_cells<'a>(candidate: &Candidate<'a>) -> impl Iterator<Item = RawCell<'a>> + 'a {
    let root = candidate.root;
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| !in_ignored_subtree(element))
        .filter_map(move |element| {
            let day = dom::leading_day(&dom::direct_text(&element))?;
            let cell = promote_label(element, root);
            let (raw_mark, mark_source) = extract_mark(&cell, day);
            Some(RawCell {
                element: cell,
                day,
                raw_mark,
                mark_source,
            })
        })
}

/// Runs [`scan_cells`] over every candidate, skipping cells already seen.
pub fn scan_all<'a>(candidates: &[Candidate<'a>]) -> Vec<RawCell<'a>> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .flat_map(scan_cells)
        .filter(|cell| seen.insert(cell.element.id()))
        .collect()
}

fn in_ignored_subtree(element: &ElementRef<'_>) -> bool {
    dom::is_ignored(element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| dom::is_ignored(&a))
}

fn promote_label<'a>(element: ElementRef<'a>, root: ElementRef<'a>) -> ElementRef<'a> {
    if element.id() == root.id() || dom::has_element_children(&element) {
        return element;
    }
    if NEVER_LABEL_TAGS.contains(&dom::tag_name(&element)) {
        return element;
    }
    if dom::exact_day(&dom::full_text(&element)).is_none() {
        return element;
    }

    let Some(parent) = element.parent().and_then(ElementRef::wrap) else {
        return element;
    };
    let labels_in_parent = dom::descendant_elements(&parent)
        .filter(|e| dom::leading_day(&dom::direct_text(e)).is_some())
        .count();

    if labels_in_parent == 1 && dom::leading_day(&dom::direct_text(&parent)).is_none() {
        parent
    } else {
        element
    }
}
