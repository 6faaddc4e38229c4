use std::error::Error;
use std::path::PathBuf;

/// Base trait for all fuelbol errors
pub trait FuelbolError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error comes from user input rather than the environment
    fn is_user_error(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Feed at '{url}' answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Feed body could not be decoded: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl FuelbolError for FeedError {
    fn error_code(&self) -> &'static str {
        match self {
            FeedError::Request { .. } => "FEED_REQUEST_FAILED",
            FeedError::Status { .. } => "FEED_BAD_STATUS",
            FeedError::Decode { .. } => "FEED_DECODE_FAILED",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config at '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config at '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Poll interval must be at least one minute, got {minutes}")]
    InvalidInterval { minutes: u64 },
}

impl FuelbolError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "CONFIG_READ_FAILED",
            ConfigError::Parse { .. } => "CONFIG_PARSE_FAILED",
            ConfigError::InvalidInterval { .. } => "CONFIG_INVALID_INTERVAL",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfigError::Parse { .. } | ConfigError::InvalidInterval { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        let error = ConfigError::InvalidInterval { minutes: 0 };
        assert_eq!(error.error_code(), "CONFIG_INVALID_INTERVAL");
        assert!(error.is_user_error());
        assert_eq!(
            error.to_string(),
            "Poll interval must be at least one minute, got 0"
        );

        let error = FeedError::Decode {
            source: serde_json::from_str::<u8>("{").unwrap_err(),
        };
        assert_eq!(error.error_code(), "FEED_DECODE_FAILED");
        assert!(!error.is_user_error());
    }
}
