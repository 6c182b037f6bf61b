#[cfg(feature = "cli")]
pub mod cli;
pub mod watch_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use watch_config::{NotifierKind, NotifySettings, WatchConfig};
