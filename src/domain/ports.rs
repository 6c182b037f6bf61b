use crate::domain::model::Snapshot;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Downloads the raw page. Retries and status handling belong to the implementation.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, headers: &HashMap<String, String>) -> Result<String>;
}

/// Holds the previous run's snapshot. Only one run may use a store at a time.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<Option<Snapshot>>> + Send;
    fn save(&self, snapshot: &Snapshot) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

// 讓 main 可以在執行期挑選實作
#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Box<T> {
    async fn fetch(&self, url: &str, headers: &HashMap<String, String>) -> Result<String> {
        (**self).fetch(url, headers).await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        (**self).notify(subject, body).await
    }
}
