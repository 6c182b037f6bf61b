use crate::core::dom;
use scraper::ElementRef;

/// Which rendering the mark was found in. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkSource {
    StatusElement,
    ImageAlt,
    ImageTitle,
    AriaLabel,
    DirectText,
    ClassHint,
    None,
}

/// Pulls the raw status token out of a day cell.
///
/// The same status may be rendered as text, as an image with alt text, as an
/// accessible label or as a bare glyph next to the day number, so the renderings are
/// tried in that order and the first non-empty one wins. As a last resort the class
/// names inside the cell are returned (e.g. `.price-day.aval`).
pub fn extract_mark(cell: &ElementRef<'_>, day: u32) -> (String, MarkSource) {
    if let Some(found) = from_status_element(cell) {
        return found;
    }

    if let Some(label) = cell.value().attr("aria-label").map(dom::normalize) {
        if !label.is_empty() {
            return (label, MarkSource::AriaLabel);
        }
    }

    let bare = strip_day(&dom::normalize(&dom::direct_text(cell)), day);
    if !bare.is_empty() {
        return (bare, MarkSource::DirectText);
    }

    let hints = class_hints(cell);
    if !hints.is_empty() {
        return (hints, MarkSource::ClassHint);
    }

    (String::new(), MarkSource::None)
}

fn from_status_element(cell: &ElementRef<'_>) -> Option<(String, MarkSource)> {
    // 第一個「不是只有日期數字」的行內元素
    let element = dom::descendant_elements(cell)
        .filter(|e| dom::STATUS_TAGS.contains(&dom::tag_name(e)))
        .find(|e| dom::exact_day(&dom::full_text(e)).is_none())?;

    let text = dom::normalize(&dom::full_text(&element));
    if !text.is_empty() {
        return Some((text, MarkSource::StatusElement));
    }

    if dom::tag_name(&element) == "img" {
        for (attr, source) in [("alt", MarkSource::ImageAlt), ("title", MarkSource::ImageTitle)] {
            if let Some(value) = element.value().attr(attr).map(dom::normalize) {
                if !value.is_empty() {
                    return Some((value, source));
                }
            }
        }
    }

    None
}

/// Removes the leading day number (and a trailing `日`) from a normalized text.
fn strip_day(text: &str, day: u32) -> String {
    let day = day.to_string();
    let rest = text.strip_prefix(day.as_str()).unwrap_or(text);
    let rest = rest.strip_prefix('日').unwrap_or(rest);
    rest.to_string()
}

fn class_hints(cell: &ElementRef<'_>) -> String {
    dom::descendant_elements(cell)
        .flat_map(|e| e.value().classes())
        .map(|class| format!(".{}", class))
        .collect()
}
