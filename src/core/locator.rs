use crate::core::dom;
use scraper::{ElementRef, Html};

/// A calendar must show at least one week of day cells.
pub const MIN_DAY_CELLS: usize = 7;

/// Share of a container's day cells that a single inner container must hold for the
/// outer one to count as a mere wrapper.
const DOMINANT_SHARE: f64 = 0.75;

#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub root: ElementRef<'a>,
    /// Day/weekday cells counted inside `root`; 0 for the whole-document fallback.
    pub day_cells: usize,
}

#[derive(Debug, Clone)]
pub struct Located<'a> {
    pub candidates: Vec<Candidate<'a>>,
    /// No container qualified and the whole document is used instead.
    pub fallback: bool,
}

/// Finds the sub-trees most likely to hold the calendar, in document order.
///
/// Markup and class names are not trusted; the signal is structural: a container
/// holding at least a week's worth of day numbers or weekday names. Wrappers around
/// a better candidate and candidates nested inside another kept candidate are dropped
/// so each cell is scanned once. When nothing qualifies the whole document is
/// returned.
pub fn locate_candidates(document: &Html) -> Located<'_> {
    let root = document.root_element();

    let qualifying: Vec<Candidate<'_>> = dom::descendant_elements(&root)
        .filter(dom::is_container)
        .filter_map(|element| {
            let day_cells = count_day_cells(&element);
            (day_cells >= MIN_DAY_CELLS).then_some(Candidate {
                root: element,
                day_cells,
            })
        })
        .collect();

    let focused: Vec<Candidate<'_>> = qualifying
        .iter()
        .filter(|outer| {
            !qualifying.iter().any(|inner| {
                is_strict_ancestor(&outer.root, &inner.root)
                    && inner.day_cells as f64 >= outer.day_cells as f64 * DOMINANT_SHARE
            })
        })
        .copied()
        .collect();

    let candidates: Vec<Candidate<'_>> = focused
        .iter()
        .filter(|inner| {
            !focused
                .iter()
                .any(|outer| is_strict_ancestor(&outer.root, &inner.root))
        })
        .copied()
        .collect();

    if candidates.is_empty() {
        tracing::warn!("⚠️ No calendar-like container found, falling back to the whole document");
        return Located {
            candidates: vec![Candidate {
                root,
                day_cells: 0,
            }],
            fallback: true,
        };
    }

    tracing::debug!(
        "Located {} calendar candidate(s) out of {} qualifying container(s)",
        candidates.len(),
        qualifying.len()
    );
    Located {
        candidates,
        fallback: false,
    }
}

/// Elements whose own text is a day number, plus leaf elements holding a weekday name.
///
/// Own text rather than leaf text, so `<td>22<span>○</span></td>` still counts.
pub fn count_day_cells(container: &ElementRef<'_>) -> usize {
    dom::descendant_elements(container)
        .filter(|element| !dom::is_ignored(element))
        .filter(|element| {
            dom::leading_day(&dom::direct_text(element)).is_some()
                || (!dom::has_element_children(element) && dom::is_weekday(&dom::full_text(element)))
        })
        .count()
}

fn is_strict_ancestor(ancestor: &ElementRef<'_>, node: &ElementRef<'_>) -> bool {
    node.ancestors().any(|a| a.id() == ancestor.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month_table(year_month: &str, days: u32) -> String {
        let mut html = format!("<h3>{}</h3><table><tbody><tr>", year_month);
        for day in 1..=days {
            html.push_str(&format!("<td>{}</td>", day));
            if day % 7 == 0 {
                html.push_str("</tr><tr>");
            }
        }
        html.push_str("</tr></tbody></table>");
        html
    }

    #[test]
    fn test_prefers_inner_calendar_over_wrappers() {
        let html = format!(
            "<html><body><div id=\"app\"><div class=\"wrap\">{}</div><p>footer</p></div></body></html>",
            month_table("2025年10月", 31)
        );
        let document = Html::parse_document(&html);
        let located = locate_candidates(&document);

        assert!(!located.fallback);
        assert_eq!(located.candidates.len(), 1);
        assert_eq!(dom::tag_name(&located.candidates[0].root), "tbody");
        assert_eq!(located.candidates[0].day_cells, 31);
    }

    #[test]
    fn test_week_rows_do_not_split_the_calendar() {
        // 每週一個 div：整個月的容器要留下，不能只剩各週
        let mut html = String::from("<html><body><div class=\"cal\">");
        for week in 0..5 {
            html.push_str("<div class=\"week\">");
            for day in (week * 7 + 1)..=((week * 7 + 7).min(31)) {
                html.push_str(&format!("<div class=\"item\"><div>{}</div><span>○</span></div>", day));
            }
            html.push_str("</div>");
        }
        html.push_str("</div></body></html>");

        let document = Html::parse_document(&html);
        let located = locate_candidates(&document);

        assert_eq!(located.candidates.len(), 1);
        assert_eq!(located.candidates[0].root.value().attr("class"), Some("cal"));
    }

    #[test]
    fn test_two_months_yield_two_candidates() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            month_table("2025年10月", 31),
            month_table("2025年11月", 30)
        );
        let document = Html::parse_document(&html);
        let located = locate_candidates(&document);

        // body 不在容器清單內，兩個 tbody 各自成為候選
        assert_eq!(located.candidates.len(), 2);
    }

    #[test]
    fn test_falls_back_to_whole_document() {
        let html = "<html><body><div><p>1</p><p>2</p><p>3</p></div></body></html>";
        let document = Html::parse_document(html);
        let located = locate_candidates(&document);

        assert!(located.fallback);
        assert_eq!(located.candidates.len(), 1);
        assert_eq!(dom::tag_name(&located.candidates[0].root), "html");
    }
}
