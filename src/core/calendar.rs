use crate::core::classifier::classify;
use crate::core::locator::locate_candidates;
use crate::core::resolver::resolve_date;
use crate::core::scanner::scan_all;
use crate::domain::model::ClassifiedCell;
use scraper::Html;

#[derive(Debug, Clone, Default)]
pub struct CalendarParse {
    pub cells: Vec<ClassifiedCell>,
    pub candidates: usize,
    /// The locator found no calendar-like container.
    pub fallback: bool,
}

impl CalendarParse {
    /// No day cell at all: the page layout is not recognised any more.
    pub fn is_structural_mismatch(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn unresolved(&self) -> usize {
        self.cells.iter().filter(|c| c.resolved_date.is_none()).count()
    }
}

/// Locate → scan/extract → classify → resolve, over one page.
pub fn parse_calendar(html: &str) -> CalendarParse {
    let document = Html::parse_document(html);
    let located = locate_candidates(&document);

    let cells: Vec<ClassifiedCell> = scan_all(&located.candidates)
        .into_iter()
        .map(|raw| {
            let status = classify(&raw.raw_mark);
            let resolved = resolve_date(&raw.element, raw.day);
            tracing::debug!(
                "Day {} [{}] mark {:?} via {:?} -> {}",
                raw.day,
                if resolved.month_label.is_empty() { "?" } else { resolved.month_label.as_str() },
                raw.raw_mark,
                raw.mark_source,
                status
            );
            ClassifiedCell {
                day: raw.day,
                month_label: resolved.month_label,
                resolved_date: resolved.date,
                raw_mark: raw.raw_mark,
                status,
            }
        })
        .collect();

    let parse = CalendarParse {
        cells,
        candidates: located.candidates.len(),
        fallback: located.fallback,
    };

    if parse.is_structural_mismatch() {
        tracing::warn!("⚠️ No day cells found in the page; the calendar layout may have changed");
    } else {
        tracing::info!(
            "📅 Parsed {} day cell(s) from {} candidate region(s), {} without a resolved date",
            parse.cells.len(),
            parse.candidates,
            parse.unresolved()
        );
    }
    parse
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Status;
    use chrono::NaiveDate;

    fn october_page(marks: &[(u32, &str)]) -> String {
        let mut html = String::from("<html><body><h2>2025年10月</h2><table><tbody><tr>");
        for day in 1..=31 {
            let mark = marks
                .iter()
                .find(|(d, _)| *d == day)
                .map(|(_, m)| *m)
                .unwrap_or("×");
            html.push_str(&format!("<td>{}<span>{}</span></td>", day, mark));
            if day % 7 == 0 {
                html.push_str("</tr><tr>");
            }
        }
        html.push_str("</tr></tbody></table></body></html>");
        html
    }

    #[test]
    fn test_single_table_month() {
        let parse = parse_calendar(&october_page(&[(22, "○")]));

        assert!(!parse.fallback);
        assert_eq!(parse.cells.len(), 31);
        let day22 = parse.cells.iter().find(|c| c.day == 22).unwrap();
        assert_eq!(day22.status, Status::Available);
        assert_eq!(day22.resolved_date, NaiveDate::from_ymd_opt(2025, 10, 22));
        assert_eq!(parse.cells[0].status, Status::NotAvailable);
    }

    #[test]
    fn test_image_alt_mark() {
        let mut html = String::from("<html><body><h2>2025/10</h2><table><tr>");
        for day in 1..=7 {
            if day == 5 {
                html.push_str("<td>5<img src=\"ok.png\" alt=\"空き\"></td>");
            } else {
                html.push_str(&format!("<td>{}<img src=\"ng.png\" alt=\"満席\"></td>", day));
            }
        }
        html.push_str("</tr></table></body></html>");

        let parse = parse_calendar(&html);
        let day5 = parse.cells.iter().find(|c| c.day == 5).unwrap();
        assert_eq!(day5.raw_mark, "空き");
        assert_eq!(day5.status, Status::Available);
    }

    #[test]
    fn test_redesigned_page_degrades_gracefully() {
        let parse = parse_calendar("<html><body><p>Tickets are sold at the gate.</p></body></html>");
        assert!(parse.fallback);
        assert!(parse.is_structural_mismatch());
    }

    #[test]
    fn test_original_item_layout() {
        // 舊版頁面：.item 裡有 .title-day 與帶狀態 class 的 .price-day
        let mut html = String::from("<html><body><p>2025年10月</p><div class=\"body-calendar-jp\">");
        for day in 1..=31 {
            let class = match day {
                26 => "aval",
                29 => "one-left",
                _ => "sold-out",
            };
            // 休館日的 closed-section 蓋過價格 class
            let closed = if day == 30 { "<div class=\"closed-section\"></div>" } else { "" };
            html.push_str(&format!(
                "<div class=\"item\"><div class=\"title-day\">{}</div><div class=\"price-day {}\"></div>{}</div>",
                day, class, closed
            ));
        }
        html.push_str("</div></body></html>");

        let parse = parse_calendar(&html);
        assert_eq!(parse.cells.len(), 31);
        let status_of = |day: u32| parse.cells.iter().find(|c| c.day == day).unwrap().status;
        assert_eq!(status_of(26), Status::Available);
        assert_eq!(status_of(29), Status::FewLeft);
        assert_eq!(status_of(1), Status::NotAvailable);
        assert_eq!(status_of(30), Status::Closed);
    }
}
