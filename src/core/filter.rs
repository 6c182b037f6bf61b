use crate::domain::model::{ClassifiedCell, WatchTargets};

/// Keeps the cells the configuration asks for.
///
/// With `check_all_dates` every cell passes, undated ones included. Otherwise only
/// cells whose resolved date is a target survive; a cell without a date cannot match
/// a target and is dropped.
pub fn filter_cells(cells: Vec<ClassifiedCell>, targets: &WatchTargets) -> Vec<ClassifiedCell> {
    if targets.check_all_dates {
        return cells;
    }

    cells
        .into_iter()
        .filter(|cell| match cell.resolved_date {
            Some(date) if targets.target_dates.contains(&date) => true,
            Some(date) => {
                tracing::debug!("Skipping {} ({}): not a target date", date, cell.status);
                false
            }
            None => {
                tracing::warn!(
                    "⚠️ Dropping day {} ({}): date could not be resolved, cannot match target dates",
                    cell.day,
                    cell.status
                );
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Status;
    use chrono::NaiveDate;

    fn cell(date: Option<(i32, u32, u32)>, day: u32) -> ClassifiedCell {
        let resolved_date = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        ClassifiedCell {
            day,
            month_label: resolved_date
                .map(|d| d.format("%Y-%m").to_string())
                .unwrap_or_default(),
            resolved_date,
            raw_mark: "○".to_string(),
            status: Status::Available,
        }
    }

    fn sample() -> Vec<ClassifiedCell> {
        vec![
            cell(Some((2025, 10, 21)), 21),
            cell(Some((2025, 10, 22)), 22),
            cell(None, 22),
        ]
    }

    fn targets(check_all_dates: bool) -> WatchTargets {
        WatchTargets {
            check_all_dates,
            target_dates: [NaiveDate::from_ymd_opt(2025, 10, 22).unwrap()].into_iter().collect(),
        }
    }

    #[test]
    fn test_check_all_dates_passes_everything() {
        let kept = filter_cells(sample(), &targets(true));
        assert_eq!(kept, sample());
    }

    #[test]
    fn test_target_dates_only() {
        let kept = filter_cells(sample(), &targets(false));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].resolved_date, NaiveDate::from_ymd_opt(2025, 10, 22));
    }

    #[test]
    fn test_filter_is_idempotent() {
        for check_all in [true, false] {
            let cfg = targets(check_all);
            let once = filter_cells(sample(), &cfg);
            let twice = filter_cells(once.clone(), &cfg);
            assert_eq!(once, twice);
        }
    }
}
