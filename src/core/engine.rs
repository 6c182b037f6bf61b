use crate::config::WatchConfig;
use crate::core::calendar::{parse_calendar, CalendarParse};
use crate::core::diff::{diff_cells, DiffOutcome};
use crate::core::filter::filter_cells;
use crate::core::message::{build_failure_notification, build_notification};
use crate::domain::model::{CellIdentity, ChangeEvent, ClassifiedCell};
use crate::domain::ports::{Fetcher, Notifier, SnapshotStore};
use crate::utils::error::{Result, WatchError};
use chrono::Utc;

/// Result of one completed check.
///
/// A persist failure and a delivery failure are kept apart so the caller can fail the
/// run on the former even when the latter also happened.
#[derive(Debug)]
pub struct RunReport {
    pub cells_found: usize,
    pub cells_kept: usize,
    pub unresolved: usize,
    pub structural_mismatch: bool,
    pub events: Vec<ChangeEvent>,
    pub collisions: Vec<CellIdentity>,
    pub persisted: bool,
    pub notified: bool,
    pub store_error: Option<WatchError>,
    pub notify_error: Option<WatchError>,
}

impl RunReport {
    /// The error that should fail the run, store errors first.
    pub fn failure(&self) -> Option<&WatchError> {
        self.store_error.as_ref().or(self.notify_error.as_ref())
    }
}

/// Parse and diff without side effects, for `--dry-run`.
#[derive(Debug)]
pub struct Preview {
    pub parse: CalendarParse,
    pub kept: Vec<ClassifiedCell>,
    pub diff: DiffOutcome,
}

pub struct WatchEngine<'c, F: Fetcher, S: SnapshotStore, N: Notifier> {
    config: &'c WatchConfig,
    fetcher: F,
    store: S,
    notifier: N,
}

impl<'c, F: Fetcher, S: SnapshotStore, N: Notifier> WatchEngine<'c, F, S, N> {
    pub fn new(config: &'c WatchConfig, fetcher: F, store: S, notifier: N) -> Self {
        Self {
            config,
            fetcher,
            store,
            notifier,
        }
    }

    /// One full check: fetch, parse, filter, diff, persist, notify.
    ///
    /// Returns `Err` only when nothing was persisted (fetch failure or an unreadable
    /// previous snapshot); the prior snapshot is then untouched.
    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🔍 Checking availability at {}", self.config.url);

        let html = self.fetch_page().await?;
        let parse = parse_calendar(&html);
        let cells_found = parse.cells.len();
        let unresolved = parse.unresolved();

        if parse.is_structural_mismatch() {
            // 頁面改版時保留舊快照，改回來後不會重複通知
            tracing::warn!("⚠️ Structural mismatch: keeping the previous snapshot untouched");
            return Ok(RunReport {
                cells_found,
                cells_kept: 0,
                unresolved,
                structural_mismatch: true,
                events: Vec::new(),
                collisions: Vec::new(),
                persisted: false,
                notified: false,
                store_error: None,
                notify_error: None,
            });
        }

        let kept = filter_cells(parse.cells, &self.config.targets);
        tracing::info!("🎯 {} of {} cell(s) match the configured dates", kept.len(), cells_found);

        let previous = self.store.load().await?;
        let outcome = diff_cells(previous.as_ref(), &kept, self.config.first_run, Utc::now());

        let store_error = match self.store.save(&outcome.snapshot).await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("❌ Failed to persist snapshot: {}", e);
                Some(e)
            }
        };

        let mut notified = false;
        let mut notify_error = None;
        if outcome.events.is_empty() {
            tracing::info!("😴 No newly available dates");
        } else {
            let message = build_notification(&outcome.events, &self.config.url, &self.config.notify.subject_prefix);
            match self.notifier.notify(&message.subject, &message.body).await {
                Ok(()) => {
                    tracing::info!("📧 Notification sent for {} date(s)", outcome.events.len());
                    notified = true;
                }
                Err(e) => {
                    tracing::error!("❌ Failed to send notification: {}", e);
                    notify_error = Some(e);
                }
            }
        }

        Ok(RunReport {
            cells_found,
            cells_kept: kept.len(),
            unresolved,
            structural_mismatch: false,
            persisted: store_error.is_none(),
            events: outcome.events,
            collisions: outcome.collisions,
            notified,
            store_error,
            notify_error,
        })
    }

    pub async fn preview(&self) -> Result<Preview> {
        let html = self.fetcher.fetch(&self.config.url, &self.config.headers).await?;
        let parse = parse_calendar(&html);
        let kept = filter_cells(parse.cells.clone(), &self.config.targets);
        let previous = self.store.load().await?;
        let diff = diff_cells(previous.as_ref(), &kept, self.config.first_run, Utc::now());
        Ok(Preview { parse, kept, diff })
    }

    async fn fetch_page(&self) -> Result<String> {
        match self.fetcher.fetch(&self.config.url, &self.config.headers).await {
            Ok(html) => {
                tracing::debug!("Fetched {} bytes", html.len());
                Ok(html)
            }
            Err(e) => {
                tracing::error!("❌ Fetch failed: {}", e);
                if self.config.notify.on_failure {
                    let message = build_failure_notification(
                        &e.to_string(),
                        &self.config.url,
                        &self.config.notify.subject_prefix,
                    );
                    if let Err(notify_err) = self.notifier.notify(&message.subject, &message.body).await {
                        tracing::error!("❌ Failure notification could not be sent either: {}", notify_err);
                    }
                }
                Err(e)
            }
        }
    }
}
