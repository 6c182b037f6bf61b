use crate::domain::model::{CellIdentity, ChangeEvent, ClassifiedCell, FirstRunPolicy, Snapshot};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct DiffOutcome {
    pub events: Vec<ChangeEvent>,
    /// Everything that survived filtering, to be persisted as the next baseline.
    pub snapshot: Snapshot,
    /// Identities seen more than once in this run; only the first cell was used.
    pub collisions: Vec<CellIdentity>,
}

/// Compares the filtered cells of this run against the previous snapshot.
///
/// Edge-triggered: a [`ChangeEvent`] is produced only when a cell enters a bookable
/// status (`available` / `few_left`) from anything else, including "not seen
/// before". A date that stays bookable across runs notifies once.
pub fn diff_cells(
    previous: Option<&Snapshot>,
    cells: &[ClassifiedCell],
    first_run: FirstRunPolicy,
    taken_at: DateTime<Utc>,
) -> DiffOutcome {
    let seed_only = previous.is_none() && first_run == FirstRunPolicy::Seed;
    if seed_only {
        tracing::info!("🌱 No previous snapshot, recording baseline without notifying");
    }

    let mut snapshot = Snapshot::new(taken_at);
    let mut seen = HashSet::new();
    let mut events = Vec::new();
    let mut collisions = Vec::new();

    for cell in cells {
        let identity = cell.identity();
        if !seen.insert(identity.clone()) {
            // 月份沒解析出來時，不同月份的同一天會撞在一起；不合併，保留第一個
            tracing::warn!(
                "⚠️ Duplicate cell identity {} ({}), keeping the first occurrence",
                identity,
                cell.status
            );
            if !collisions.contains(&identity) {
                collisions.push(identity);
            }
            continue;
        }

        snapshot.cells.insert(identity.key(), cell.status);

        let previous_status = previous.and_then(|p| p.status_of(&identity));
        let entered_bookable = cell.status.is_bookable()
            && !previous_status.map(|s| s.is_bookable()).unwrap_or(false);

        if entered_bookable && !seed_only {
            tracing::info!(
                "🎫 {} changed {} -> {}",
                identity,
                previous_status.map(|s| s.as_str()).unwrap_or("none"),
                cell.status
            );
            events.push(ChangeEvent {
                identity,
                previous_status,
                new_status: cell.status,
                day: cell.day,
                month_label: cell.month_label.clone(),
                resolved_date: cell.resolved_date,
                raw_mark: cell.raw_mark.clone(),
            });
        }
    }

    DiffOutcome {
        events,
        snapshot,
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Status;
    use chrono::NaiveDate;

    fn cell(day: u32, status: Status) -> ClassifiedCell {
        ClassifiedCell {
            day,
            month_label: "2025-10".to_string(),
            resolved_date: NaiveDate::from_ymd_opt(2025, 10, day),
            raw_mark: "?".to_string(),
            status,
        }
    }

    fn snapshot_of(cells: &[(u32, Status)]) -> Snapshot {
        let mut snapshot = Snapshot::new(Utc::now());
        for (day, status) in cells {
            snapshot.cells.insert(format!("2025-10-{:02}", day), *status);
        }
        snapshot
    }

    #[test]
    fn test_available_to_available_is_silent() {
        let previous = snapshot_of(&[(22, Status::Available)]);
        let outcome = diff_cells(
            Some(&previous),
            &[cell(22, Status::Available)],
            FirstRunPolicy::Notify,
            Utc::now(),
        );
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_not_available_to_available_emits_once() {
        let previous = snapshot_of(&[(22, Status::NotAvailable)]);
        let outcome = diff_cells(
            Some(&previous),
            &[cell(22, Status::Available)],
            FirstRunPolicy::Notify,
            Utc::now(),
        );
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].previous_status, Some(Status::NotAvailable));
        assert_eq!(outcome.events[0].new_status, Status::Available);
    }

    #[test]
    fn test_absent_identity_counts_as_none() {
        let previous = snapshot_of(&[(21, Status::NotAvailable)]);
        let outcome = diff_cells(
            Some(&previous),
            &[cell(22, Status::FewLeft)],
            FirstRunPolicy::Notify,
            Utc::now(),
        );
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].previous_label(), "none");
    }

    #[test]
    fn test_available_to_few_left_is_silent() {
        let previous = snapshot_of(&[(22, Status::Available)]);
        let outcome = diff_cells(
            Some(&previous),
            &[cell(22, Status::FewLeft)],
            FirstRunPolicy::Notify,
            Utc::now(),
        );
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.snapshot.cells.get("2025-10-22"), Some(&Status::FewLeft));
    }

    #[test]
    fn test_first_run_policies() {
        let cells = [cell(22, Status::Available), cell(23, Status::NotAvailable)];

        let notify = diff_cells(None, &cells, FirstRunPolicy::Notify, Utc::now());
        assert_eq!(notify.events.len(), 1);

        let seed = diff_cells(None, &cells, FirstRunPolicy::Seed, Utc::now());
        assert!(seed.events.is_empty());
        assert_eq!(seed.snapshot.cells.len(), 2);

        // 已有快照時 Seed 不影響判斷
        let previous = snapshot_of(&[]);
        let with_previous = diff_cells(Some(&previous), &cells, FirstRunPolicy::Seed, Utc::now());
        assert_eq!(with_previous.events.len(), 1);
    }

    #[test]
    fn test_snapshot_covers_every_cell_once() {
        let cells = [
            cell(20, Status::Closed),
            cell(21, Status::Unknown),
            cell(22, Status::Available),
        ];
        let outcome = diff_cells(None, &cells, FirstRunPolicy::Notify, Utc::now());

        assert_eq!(outcome.snapshot.cells.len(), cells.len());
        for c in &cells {
            assert_eq!(outcome.snapshot.status_of(&c.identity()), Some(c.status));
        }
    }

    #[test]
    fn test_unresolved_collisions_are_reported() {
        let undated = |status| ClassifiedCell {
            day: 22,
            month_label: String::new(),
            resolved_date: None,
            raw_mark: "?".to_string(),
            status,
        };
        let cells = [undated(Status::NotAvailable), undated(Status::Available)];
        let outcome = diff_cells(None, &cells, FirstRunPolicy::Notify, Utc::now());

        assert_eq!(outcome.collisions.len(), 1);
        assert_eq!(outcome.snapshot.cells.get("#22"), Some(&Status::NotAvailable));
        assert!(outcome.events.is_empty());
    }
}
