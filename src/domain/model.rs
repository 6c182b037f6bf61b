use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 日曆格子的狀態。封閉集合，無法辨識的一律是 `Unknown`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Available,
    FewLeft,
    NotAvailable,
    Closed,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Available => "available",
            Status::FewLeft => "few_left",
            Status::NotAvailable => "not_available",
            Status::Closed => "closed",
            Status::Unknown => "unknown",
        }
    }

    /// Statuses that are worth a notification when a date enters them.
    pub fn is_bookable(&self) -> bool {
        matches!(self, Status::Available | Status::FewLeft)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Status::Available => "Available for purchase",
            Status::FewLeft => "Only a few left",
            Status::NotAvailable => "Sold out",
            Status::Closed => "Closed",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedCell {
    pub day: u32,
    /// `YYYY-MM` when the month could be resolved, empty otherwise.
    pub month_label: String,
    pub resolved_date: Option<NaiveDate>,
    pub raw_mark: String,
    pub status: Status,
}

impl ClassifiedCell {
    pub fn identity(&self) -> CellIdentity {
        match self.resolved_date {
            Some(date) => CellIdentity::Date(date),
            None => CellIdentity::Unresolved {
                month_label: self.month_label.clone(),
                day: self.day,
            },
        }
    }
}

/// Key under which a cell is stored in a [`Snapshot`].
///
/// Cells without a resolved date fall back to `(month_label, day)`; two unresolved
/// months showing the same day number share an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellIdentity {
    Date(NaiveDate),
    Unresolved { month_label: String, day: u32 },
}

impl CellIdentity {
    pub fn key(&self) -> String {
        match self {
            CellIdentity::Date(date) => date.format("%Y-%m-%d").to_string(),
            CellIdentity::Unresolved { month_label, day } => format!("{}#{}", month_label, day),
        }
    }
}

impl fmt::Display for CellIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub cells: BTreeMap<String, Status>,
}

impl Snapshot {
    pub fn new(taken_at: DateTime<Utc>) -> Self {
        Self {
            taken_at,
            cells: BTreeMap::new(),
        }
    }

    pub fn status_of(&self, identity: &CellIdentity) -> Option<Status> {
        self.cells.get(&identity.key()).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub identity: CellIdentity,
    /// `None` when the identity was absent from the previous snapshot.
    pub previous_status: Option<Status>,
    pub new_status: Status,
    pub day: u32,
    pub month_label: String,
    pub resolved_date: Option<NaiveDate>,
    pub raw_mark: String,
}

impl ChangeEvent {
    pub fn previous_label(&self) -> &'static str {
        self.previous_status.map(|s| s.as_str()).unwrap_or("none")
    }
}

/// Which dates a run cares about. With `check_all_dates` the date set is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchTargets {
    pub check_all_dates: bool,
    pub target_dates: BTreeSet<NaiveDate>,
}

/// What to do when no previous snapshot exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum FirstRunPolicy {
    /// Treat every cell as previously unseen, so bookable dates notify right away.
    #[default]
    Notify,
    /// Only record the baseline.
    Seed,
}

/// Subject and body handed to a [`crate::domain::ports::Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}
