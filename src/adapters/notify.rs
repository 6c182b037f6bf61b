use crate::config::{NotifierKind, NotifySettings};
use crate::domain::ports::Notifier;
use crate::utils::error::{Result, WatchError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Prints the message instead of sending it. Default when no mail transport is set up.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        tracing::info!("📣 {}", subject);
        println!("{}\n\n{}", subject, body);
        Ok(())
    }
}

/// Sends plain-text mail through the SendGrid v3 API.
#[derive(Debug, Clone)]
pub struct SendGridNotifier {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    to: String,
}

impl SendGridNotifier {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| WatchError::TransportError {
                message: format!("Could not build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            from: from.into(),
            to: to.into(),
        })
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": self.to }] }],
            "from": { "email": self.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let url = format!("{}/v3/mail/send", self.endpoint);
        tracing::debug!("Posting mail to {} for {}", url, self.to);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WatchError::TransportError { message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(WatchError::TransportError {
                message: format!("SendGrid returned {}: {}", status, detail.trim()),
            });
        }

        tracing::debug!("SendGrid accepted the message ({})", status);
        Ok(())
    }
}

/// 依設定挑選通知方式，欄位已經在 validate 時檢查過
pub fn build_notifier(settings: &NotifySettings, timeout_seconds: u64) -> Result<Box<dyn Notifier>> {
    match settings.kind {
        NotifierKind::Log => Ok(Box::new(LogNotifier)),
        NotifierKind::Sendgrid => {
            let missing = |field: &str| WatchError::MissingConfigError {
                field: field.to_string(),
            };
            let api_key = settings.api_key.as_deref().ok_or_else(|| missing("notify.api_key"))?;
            let from = settings.from.as_deref().ok_or_else(|| missing("notify.from"))?;
            let to = settings.to.as_deref().ok_or_else(|| missing("notify.to"))?;

            Ok(Box::new(SendGridNotifier::new(
                settings.endpoint.as_str(),
                api_key,
                from,
                to,
                timeout_seconds,
            )?))
        }
    }
}
