pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{build_notifier, FileFetcher, HttpFetcher, JsonFileStore, LogNotifier, SendGridNotifier};
pub use config::WatchConfig;
pub use crate::core::{
    calendar::parse_calendar,
    classifier::classify,
    engine::{Preview, RunReport, WatchEngine},
};
pub use domain::model::{FirstRunPolicy, Status};
pub use utils::error::{Result, WatchError};
