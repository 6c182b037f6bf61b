// Adapters layer: concrete implementations of the domain ports (http, storage, notify)

pub mod http;
pub mod notify;
pub mod storage;

pub use http::{FileFetcher, HttpFetcher};
pub use notify::{build_notifier, LogNotifier, SendGridNotifier};
pub use storage::JsonFileStore;
