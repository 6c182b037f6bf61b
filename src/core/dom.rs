//! Small read-only helpers over a parsed [`scraper::Html`] tree.

use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

/// Elements that may wrap a calendar (or one month of it).
pub const CONTAINER_TAGS: &[&str] = &[
    "table", "tbody", "ul", "ol", "dl", "div", "section", "article", "main",
];

/// Inline elements a status mark is usually rendered in.
pub const STATUS_TAGS: &[&str] = &["span", "em", "strong", "b", "i", "small", "mark", "img"];

/// Never hold calendar content.
pub const IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

// 日期格：1–31，可帶「日」；10:00、1,200、3/4 之類不算
static DAY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})日?(?:$|[^\d:/.,])").expect("day prefix pattern")
});

static DAY_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})日?$").expect("day-only pattern"));

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[日月火水木金土](?:曜日?)?|\([日月火水木金土]\)|sun|mon|tue|tues|wed|thu|thur|thurs|fri|sat|sunday|monday|tuesday|wednesday|thursday|friday|saturday)\.?$",
    )
    .expect("weekday pattern")
});

pub fn tag_name<'a>(element: &ElementRef<'a>) -> &'a str {
    element.value().name()
}

pub fn is_container(element: &ElementRef<'_>) -> bool {
    CONTAINER_TAGS.contains(&tag_name(element))
}

pub fn is_ignored(element: &ElementRef<'_>) -> bool {
    IGNORED_TAGS.contains(&tag_name(element))
}

/// Text of the element's own text nodes, children's text excluded.
pub fn direct_text(element: &ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}

/// All descendant text.
pub fn full_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Removes every whitespace character (including full-width spaces and nbsp).
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn has_element_children(element: &ElementRef<'_>) -> bool {
    element.children().any(|node| node.value().is_element())
}

pub fn child_elements<'a>(element: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element.children().filter_map(ElementRef::wrap)
}

/// Descendant elements in document order, the element itself excluded.
pub fn descendant_elements<'a>(
    element: &ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

fn day_in_range(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|day| (1..=31).contains(day))
}

/// Day number at the start of `text`, e.g. `"22"`, `"22日"`, `"22 ○"`.
pub fn leading_day(text: &str) -> Option<u32> {
    let caps = DAY_PREFIX.captures(text.trim())?;
    day_in_range(&caps[1])
}

/// `text` is nothing but a day number.
pub fn exact_day(text: &str) -> Option<u32> {
    let caps = DAY_ONLY.captures(text.trim())?;
    day_in_range(&caps[1])
}

pub fn is_weekday(text: &str) -> bool {
    WEEKDAY.is_match(text.trim())
}
