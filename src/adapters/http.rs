use crate::domain::ports::Fetcher;
use crate::utils::error::{Result, WatchError};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Plain GET, no retries; the scheduler runs us again later.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| WatchError::ConfigValidationError {
                field: "timeout_seconds".to_string(),
                message: format!("Could not build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &HashMap<String, String>) -> Result<String> {
        let fetch_error = |message: String| WatchError::FetchError {
            url: url.to_string(),
            message,
        };

        let mut request = self.client.get(url);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        tracing::debug!("Making page request to: {}", url);
        let response = request.send().await.map_err(|e| fetch_error(e.to_string()))?;
        tracing::debug!("Page response status: {}", response.status());

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP status {}", response.status())));
        }

        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}

/// Reads a saved page from disk, for `--html` and offline checks.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, _url: &str, _headers: &HashMap<String, String>) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| WatchError::FetchError {
                url: self.path.display().to_string(),
                message: e.to_string(),
            })
    }
}
