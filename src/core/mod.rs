pub mod calendar;
pub mod classifier;
pub mod diff;
pub mod dom;
pub mod engine;
pub mod extractor;
pub mod filter;
pub mod locator;
pub mod message;
pub mod resolver;
pub mod scanner;

pub use crate::domain::model::{ChangeEvent, ClassifiedCell, Snapshot, Status};
pub use crate::domain::ports::{Fetcher, Notifier, SnapshotStore};
pub use crate::utils::error::Result;
