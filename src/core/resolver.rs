use crate::core::dom;
use chrono::NaiveDate;
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

// 2025年10月、2025/10、2025-10、2025.10
static YEAR_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*[年/\-.]\s*(\d{1,2})(?:\D|$)").expect("year-month pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    /// `YYYY-MM`, or empty when no heading was found.
    pub month_label: String,
    /// `None` when the heading was missing or the day does not exist in that month.
    pub date: Option<NaiveDate>,
}

impl ResolvedDate {
    fn unresolved() -> Self {
        Self {
            month_label: String::new(),
            date: None,
        }
    }
}

/// Attaches a calendar date to a day cell.
///
/// Walks the cell's container ancestors, nearest first, and reads the element right
/// before each one (and a table's caption) for a year-month heading.
pub fn resolve_date(cell: &ElementRef<'_>, day: u32) -> ResolvedDate {
    let Some((year, month)) = find_year_month(cell) else {
        return ResolvedDate::unresolved();
    };

    ResolvedDate {
        month_label: format!("{:04}-{:02}", year, month),
        date: NaiveDate::from_ymd_opt(year, month, day),
    }
}

fn find_year_month(cell: &ElementRef<'_>) -> Option<(i32, u32)> {
    cell.ancestors()
        .filter_map(ElementRef::wrap)
        .filter(dom::is_container)
        .find_map(|container| {
            caption_of(&container)
                .and_then(|caption| parse_year_month(&dom::full_text(&caption)))
                .or_else(|| {
                    let heading = container.prev_siblings().find_map(ElementRef::wrap)?;
                    parse_year_month(&dom::full_text(&heading))
                })
        })
}

fn caption_of<'a>(container: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    if dom::tag_name(container) != "table" {
        return None;
    }
    dom::child_elements(container).find(|child| dom::tag_name(child) == "caption")
}

pub fn parse_year_month(text: &str) -> Option<(i32, u32)> {
    let caps = YEAR_MONTH.captures(text)?;
    let year = caps[1].parse::<i32>().ok()?;
    let month = caps[2].parse::<u32>().ok().filter(|m| (1..=12).contains(m))?;
    Some((year, month))
}
