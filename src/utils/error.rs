use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to fetch {url}: {message}")]
    FetchError { url: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Snapshot store error ({path}): {message}")]
    StoreError { path: String, message: String },

    #[error("Notification transport error: {message}")]
    TransportError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Storage,
    Notification,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WatchError::FetchError { .. } => ErrorCategory::Network,
            WatchError::ConfigValidationError { .. }
            | WatchError::InvalidConfigValueError { .. }
            | WatchError::MissingConfigError { .. } => ErrorCategory::Configuration,
            WatchError::IoError(_) | WatchError::StoreError { .. } => ErrorCategory::Storage,
            WatchError::TransportError { .. } => ErrorCategory::Notification,
            WatchError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 抓取失敗只影響這一次執行，下一次排程會再試
            WatchError::FetchError { .. } => ErrorSeverity::Medium,
            WatchError::TransportError { .. } => ErrorSeverity::Medium,
            WatchError::ConfigValidationError { .. }
            | WatchError::InvalidConfigValueError { .. }
            | WatchError::MissingConfigError { .. }
            | WatchError::SerializationError(_) => ErrorSeverity::High,
            // 快照寫不進去代表狀態會遺失
            WatchError::IoError(_) | WatchError::StoreError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            WatchError::FetchError { url, .. } => {
                format!("Could not download the calendar page ({})", url)
            }
            WatchError::IoError(e) => format!("File system error: {}", e),
            WatchError::SerializationError(_) => "Could not read or write JSON data".to_string(),
            WatchError::ConfigValidationError { field, .. } => {
                format!("The configuration could not be parsed ({})", field)
            }
            WatchError::InvalidConfigValueError { field, value, .. } => {
                format!("Configuration value '{}' for '{}' is invalid", value, field)
            }
            WatchError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            WatchError::StoreError { path, .. } => {
                format!("Could not save the availability snapshot to {}", path)
            }
            WatchError::TransportError { .. } => "The notification could not be delivered".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the page URL and network access; the next scheduled run will retry",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
            ErrorCategory::Storage => "Make sure the snapshot directory exists and is writable",
            ErrorCategory::Notification => "Verify the notifier API key and sender/recipient addresses",
            ErrorCategory::Data => "Delete the corrupted file so it is recreated on the next run",
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
