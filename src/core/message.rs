use crate::domain::model::{ChangeEvent, Notification};

pub const DEFAULT_SUBJECT_PREFIX: &str = "[slot-watch]";

/// Builds the notification for a non-empty list of change events.
///
/// Lines are ordered by resolved date (undated cells last), then by day, and read
/// `"<monthLabel> <day>: <status> (<rawMark>)"`. The page URL closes the body.
pub fn build_notification(events: &[ChangeEvent], source_url: &str, subject_prefix: &str) -> Notification {
    let mut ordered: Vec<&ChangeEvent> = events.iter().collect();
    ordered.sort_by(|a, b| {
        // None 排在最後
        match (a.resolved_date, b.resolved_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then(a.day.cmp(&b.day))
    });

    let mut lines: Vec<String> = ordered
        .iter()
        .map(|e| format!("{} {}: {} ({})", e.month_label, e.day, e.new_status, e.raw_mark))
        .collect();
    lines.push(String::new());
    lines.push(source_url.to_string());

    Notification {
        subject: format!("{} {} date(s) became available", subject_prefix, events.len()),
        body: lines.join("\n"),
    }
}

/// Sent instead of a change notification when the page could not be checked.
pub fn build_failure_notification(error: &str, source_url: &str, subject_prefix: &str) -> Notification {
    Notification {
        subject: format!("{} availability check failed", subject_prefix),
        body: format!("{}\n\n{}", error, source_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CellIdentity, Status};
    use chrono::NaiveDate;

    fn event(date: Option<(i32, u32)>, day: u32, status: Status, mark: &str) -> ChangeEvent {
        let resolved_date = date.and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, day));
        let month_label = date.map(|(y, m)| format!("{:04}-{:02}", y, m)).unwrap_or_default();
        let identity = match resolved_date {
            Some(d) => CellIdentity::Date(d),
            None => CellIdentity::Unresolved {
                month_label: month_label.clone(),
                day,
            },
        };
        ChangeEvent {
            identity,
            previous_status: None,
            new_status: status,
            day,
            month_label,
            resolved_date,
            raw_mark: mark.to_string(),
        }
    }

    #[test]
    fn test_body_order_and_format() {
        let events = vec![
            event(None, 3, Status::Available, "空き"),
            event(Some((2025, 11)), 2, Status::FewLeft, "△"),
            event(Some((2025, 10)), 22, Status::Available, "○"),
        ];
        let message = build_notification(&events, "https://example.com/cal", DEFAULT_SUBJECT_PREFIX);

        assert_eq!(message.subject, "[slot-watch] 3 date(s) became available");
        assert_eq!(
            message.body,
            "2025-10 22: available (○)\n2025-11 2: few_left (△)\n 3: available (空き)\n\nhttps://example.com/cal"
        );
    }

    #[test]
    fn test_failure_notification() {
        let message = build_failure_notification("timeout", "https://example.com/cal", "[x]");
        assert_eq!(message.subject, "[x] availability check failed");
        assert!(message.body.ends_with("https://example.com/cal"));
    }
}
