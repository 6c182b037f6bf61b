use crate::core::message::DEFAULT_SUBJECT_PREFIX;
use crate::domain::model::{FirstRunPolicy, WatchTargets};
use crate::utils::error::{Result, WatchError};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_SNAPSHOT_PATH: &str = "availability_state.json";
pub const DEFAULT_SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com";

/// 設定檔的原始樣子（TOML 或 JSON）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchFileConfig {
    pub url: String,
    #[serde(default)]
    pub check_all_dates: bool,
    #[serde(default)]
    pub target_dates: Vec<String>,
    pub snapshot_path: Option<String>,
    pub first_run: Option<FirstRunPolicy>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub notify: Option<NotifyFileConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyFileConfig {
    pub kind: Option<NotifierKind>,
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub endpoint: Option<String>,
    pub subject_prefix: Option<String>,
    pub on_failure: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
    /// Writes the message to the log only.
    #[default]
    Log,
    Sendgrid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifySettings {
    pub kind: NotifierKind,
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub endpoint: String,
    pub subject_prefix: String,
    pub on_failure: bool,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            kind: NotifierKind::Log,
            api_key: None,
            from: None,
            to: None,
            endpoint: DEFAULT_SENDGRID_ENDPOINT.to_string(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            on_failure: true,
        }
    }
}

/// Resolved configuration, built once at start-up and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub url: String,
    pub targets: WatchTargets,
    pub snapshot_path: String,
    pub first_run: FirstRunPolicy,
    pub timeout_seconds: u64,
    /// Request headers, `User-Agent` included.
    pub headers: HashMap<String, String>,
    pub notify: NotifySettings,
}

impl WatchConfig {
    /// 從 TOML 或 JSON 檔案載入配置（依副檔名判斷）
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        let raw: WatchFileConfig =
            toml::from_str(&processed).map_err(|e| WatchError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        let raw: WatchFileConfig =
            serde_json::from_str(&processed).map_err(|e| WatchError::ConfigValidationError {
                field: "json_parsing".to_string(),
                message: format!("JSON parsing error: {}", e),
            })?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_raw(raw: WatchFileConfig) -> Self {
        let targets = WatchTargets {
            check_all_dates: raw.check_all_dates,
            target_dates: parse_target_dates(&raw.target_dates),
        };

        let mut headers = raw.headers.unwrap_or_default();
        if !headers.keys().any(|k| k.eq_ignore_ascii_case("user-agent")) {
            headers.insert(
                "User-Agent".to_string(),
                raw.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            );
        }

        let notify = match raw.notify {
            Some(n) => {
                let defaults = NotifySettings::default();
                NotifySettings {
                    kind: n.kind.unwrap_or_default(),
                    api_key: n.api_key,
                    from: n.from,
                    to: n.to,
                    endpoint: n.endpoint.unwrap_or(defaults.endpoint),
                    subject_prefix: n.subject_prefix.unwrap_or(defaults.subject_prefix),
                    on_failure: n.on_failure.unwrap_or(defaults.on_failure),
                }
            }
            None => NotifySettings::default(),
        };

        Self {
            url: raw.url,
            targets,
            snapshot_path: raw
                .snapshot_path
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string()),
            first_run: raw.first_run.unwrap_or_default(),
            timeout_seconds: raw.timeout_seconds.unwrap_or(30),
            headers,
            notify,
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("url", &self.url)?;
        validation::validate_path("snapshot_path", &self.snapshot_path)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;

        if !self.targets.check_all_dates && self.targets.target_dates.is_empty() {
            tracing::warn!("⚠️ No valid target dates and check_all_dates is off; nothing will ever notify");
        }

        if self.notify.kind == NotifierKind::Sendgrid {
            let api_key = validation::validate_required_field("notify.api_key", &self.notify.api_key)?;
            validation::validate_non_empty_string("notify.api_key", api_key)?;
            let from = validation::validate_required_field("notify.from", &self.notify.from)?;
            validation::validate_email("notify.from", from)?;
            let to = validation::validate_required_field("notify.to", &self.notify.to)?;
            validation::validate_email("notify.to", to)?;
            validation::validate_url("notify.endpoint", &self.notify.endpoint)?;
        }

        Ok(())
    }
}

impl Validate for WatchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Parses `YYYY-MM-DD` entries, skipping (and logging) the malformed ones.
pub fn parse_target_dates(entries: &[String]) -> BTreeSet<NaiveDate> {
    entries
        .iter()
        .filter_map(|entry| match NaiveDate::parse_from_str(entry.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!("⚠️ Skipping invalid target date {:?}: {}", entry, e);
                None
            }
        })
        .collect()
}

/// 替換環境變數 (例如 ${SENDGRID_API_KEY})；未設定的保持原樣
fn substitute_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([^}]+)\}").expect("env placeholder pattern");
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_toml() {
        let config = WatchConfig::from_toml_str(r#"url = "https://example.com/calendar/5""#).unwrap();

        assert_eq!(config.url, "https://example.com/calendar/5");
        assert!(!config.targets.check_all_dates);
        assert!(config.targets.target_dates.is_empty());
        assert_eq!(config.snapshot_path, DEFAULT_SNAPSHOT_PATH);
        assert_eq!(config.first_run, FirstRunPolicy::Notify);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.headers.get("User-Agent").map(String::as_str), Some(DEFAULT_USER_AGENT));
        assert_eq!(config.notify.kind, NotifierKind::Log);
    }

    #[test]
    fn test_malformed_dates_are_skipped() {
        let config = WatchConfig::from_toml_str(
            r#"
url = "https://example.com/cal"
target_dates = ["2025-10-22", "2025-13-01", "tomorrow", " 2025-10-23 "]
"#,
        )
        .unwrap();

        let expected: BTreeSet<NaiveDate> = [
            NaiveDate::from_ymd_opt(2025, 10, 22).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 23).unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(config.targets.target_dates, expected);
    }

    #[test]
    fn test_full_toml() {
        let config = WatchConfig::from_toml_str(
            r#"
url = "https://example.com/cal"
check_all_dates = true
snapshot_path = "state/teshima.json"
first_run = "seed"
timeout_seconds = 10
user_agent = "slot-watch-test"

[headers]
Accept-Language = "ja"

[notify]
kind = "sendgrid"
api_key = "SG.key"
from = "noreply@example.com"
to = "me@example.com"
subject_prefix = "[teshima]"
on_failure = false
"#,
        )
        .unwrap();

        assert!(config.targets.check_all_dates);
        assert_eq!(config.first_run, FirstRunPolicy::Seed);
        assert_eq!(config.headers.get("User-Agent").map(String::as_str), Some("slot-watch-test"));
        assert_eq!(config.headers.get("Accept-Language").map(String::as_str), Some("ja"));
        assert_eq!(config.notify.kind, NotifierKind::Sendgrid);
        assert_eq!(config.notify.endpoint, DEFAULT_SENDGRID_ENDPOINT);
        assert!(!config.notify.on_failure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SLOT_WATCH_TEST_KEY", "SG.from-env");

        let config = WatchConfig::from_toml_str(
            r#"
url = "https://example.com/cal"

[notify]
kind = "sendgrid"
api_key = "${SLOT_WATCH_TEST_KEY}"
from = "noreply@example.com"
to = "me@example.com"
"#,
        )
        .unwrap();
        assert_eq!(config.notify.api_key.as_deref(), Some("SG.from-env"));

        std::env::remove_var("SLOT_WATCH_TEST_KEY");
    }

    #[test]
    fn test_sendgrid_requires_credentials() {
        let config = WatchConfig::from_toml_str(
            r#"
url = "https://example.com/cal"

[notify]
kind = "sendgrid"
to = "me@example.com"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(WatchError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_url_fails_validation() {
        let config = WatchConfig::from_toml_str(r#"url = "not-a-url""#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_config_from_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        temp_file
            .write_all(
                br#"{ "url": "https://example.com/cal", "check_all_dates": false, "target_dates": ["2025-10-22", "bad"] }"#,
            )
            .unwrap();

        let config = WatchConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.targets.target_dates.len(), 1);
    }

    #[test]
    fn test_toml_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"url = \"https://example.com/cal\"\ncheck_all_dates = true\n")
            .unwrap();

        let config = WatchConfig::from_file(temp_file.path()).unwrap();
        assert!(config.targets.check_all_dates);
    }
}
