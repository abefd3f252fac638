use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Sheets API error: {0}")]
    Sheets(#[from] SheetsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after:?} seconds")]
    RateLimitExceeded { retry_after: Option<u64> },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum SheetsError {
    #[error("Sheets request unauthorized; access token rejected")]
    Unauthorized,

    #[error("Forbidden access to range: {range}")]
    Forbidden { range: String },

    #[error("Spreadsheet or range not found: {range}")]
    NotFound { range: String },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Missing required configuration key: {key}")]
    MissingKey { key: String },

    #[error("Configuration key {key} is present but empty")]
    EmptyValue { key: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl BotError {
    /// Retry-after hint in seconds, if this error is a rate-limit signal.
    /// `Some(None)` means rate-limited with no server hint.
    pub fn rate_limit_hint(&self) -> Option<Option<u64>> {
        match self {
            BotError::RedditApi(RedditApiError::RateLimitExceeded { retry_after }) => {
                Some(*retry_after)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_hint_with_server_delay() {
        let err = BotError::RedditApi(RedditApiError::RateLimitExceeded {
            retry_after: Some(5),
        });
        assert_eq!(err.rate_limit_hint(), Some(Some(5)));
    }

    #[test]
    fn test_rate_limit_hint_without_server_delay() {
        let err = BotError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: None });
        assert_eq!(err.rate_limit_hint(), Some(None));
    }

    #[test]
    fn test_rate_limit_hint_for_other_errors() {
        let err = BotError::RedditApi(RedditApiError::InvalidToken);
        assert_eq!(err.rate_limit_hint(), None);

        let err = BotError::Config(ConfigError::MissingKey {
            key: "SEARCH_STRING".to_string(),
        });
        assert_eq!(err.rate_limit_hint(), None);
    }

    #[test]
    fn test_error_display_includes_context() {
        let err = BotError::Config(ConfigError::MissingKey {
            key: "REDDIT_USERNAME".to_string(),
        });
        assert!(err.to_string().contains("REDDIT_USERNAME"));

        let err = BotError::RedditApi(RedditApiError::Forbidden {
            resource: "/api/comment".to_string(),
        });
        assert!(err.to_string().contains("/api/comment"));
    }
}
