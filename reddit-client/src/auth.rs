use crate::api::RedditClient;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use subreply_core::{BotError, Credentials, RedditApiError};
use tracing::{error, info};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Authenticated handle to the Reddit API. Owned by the poll loop for the
/// process lifetime; never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

impl RedditClient {
    /// Logs in once with the script-app password grant. A bad credential is
    /// not a transient condition, so there is no retry here: authentication
    /// failures are logged and propagated as fatal.
    pub async fn login(credentials: &Credentials) -> Result<Self, BotError> {
        info!("Logging in as u/{}...", credentials.username);

        let http = Client::builder()
            .user_agent(&credentials.user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        let response = http
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Network error during login: {}", e);
                e
            })?;

        let status = response.status();
        if status.as_u16() == 401 {
            let err = RedditApiError::AuthenticationFailed {
                reason: "client id or secret rejected".to_string(),
            };
            error!("Login failed: {}", err);
            return Err(err.into());
        }
        if !status.is_success() {
            let err = RedditApiError::InvalidResponse {
                details: format!("unexpected status {} from token endpoint", status),
            };
            error!("Login failed: {}", err);
            return Err(err.into());
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            error!("Failed to parse token response: {}", e);
            RedditApiError::InvalidResponse {
                details: "failed to parse token response".to_string(),
            }
        })?;

        // Reddit reports bad user credentials with a 200 carrying an error field.
        if let Some(reason) = token.error {
            let err = RedditApiError::AuthenticationFailed { reason };
            error!("Login failed: {}", err);
            return Err(err.into());
        }

        let access_token = token.access_token.ok_or_else(|| {
            error!("Token endpoint returned neither a token nor an error");
            RedditApiError::InvalidResponse {
                details: "token response missing access_token".to_string(),
            }
        })?;

        info!("Logged in!");
        Ok(RedditClient::with_session(
            http,
            Session {
                access_token,
                username: credentials.username.clone(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_success_parse() {
        let json = r#"{"access_token": "abc123", "token_type": "bearer", "expires_in": 3600, "scope": "*"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token.as_deref(), Some("abc123"));
        assert!(token.error.is_none());
    }

    #[test]
    fn test_token_response_invalid_grant_parse() {
        // Reddit returns HTTP 200 with an error body for bad username/password
        let json = r#"{"error": "invalid_grant"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(token.access_token.is_none());
        assert_eq!(token.error.as_deref(), Some("invalid_grant"));
    }
}
