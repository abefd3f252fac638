use crate::auth::Session;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use subreply_core::{BotError, PostCandidate, RedditApiError};
use tracing::{debug, error, info};

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    // Absent for deleted accounts
    #[serde(default)]
    pub author: String,
    pub created_utc: f64,
}

/// The two platform operations the bot needs. The poll loop is written
/// against this trait so tests can substitute a scripted implementation.
#[async_trait]
pub trait RedditApi: Send + Sync {
    /// Searches the subreddit for today's posts matching the query,
    /// newest first.
    async fn search_today(
        &self,
        subreddit: &str,
        query: &str,
    ) -> Result<Vec<PostCandidate>, BotError>;

    /// Posts `text` as a top-level comment on the given post.
    async fn reply(&self, post_id: &str, text: &str) -> Result<(), BotError>;
}

#[derive(Debug, Clone)]
pub struct RedditClient {
    http: Client,
    session: Session,
}

impl RedditClient {
    pub(crate) fn with_session(http: Client, session: Session) -> Self {
        Self { http, session }
    }

    async fn check_status(response: Response, endpoint: &str) -> Result<Response, BotError> {
        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status {} for {}", status, endpoint);
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        Err(status_error(status.as_u16(), retry_after, endpoint).into())
    }
}

/// Maps an unsuccessful HTTP status to the typed error the retry and reply
/// paths dispatch on.
pub fn status_error(status: u16, retry_after: Option<u64>, endpoint: &str) -> RedditApiError {
    match status {
        429 => RedditApiError::RateLimitExceeded { retry_after },
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        s if (500..600).contains(&s) => RedditApiError::ServerError { status_code: s },
        s => RedditApiError::InvalidResponse {
            details: format!("unexpected status {} for {}", s, endpoint),
        },
    }
}

#[async_trait]
impl RedditApi for RedditClient {
    async fn search_today(
        &self,
        subreddit: &str,
        query: &str,
    ) -> Result<Vec<PostCandidate>, BotError> {
        let endpoint = format!("/r/{}/search", subreddit);
        let url = format!("{}{}", REDDIT_API_BASE, endpoint);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.session.access_token)
            .query(&[
                ("q", query),
                ("sort", "new"),
                ("syntax", "lucene"),
                ("t", "day"),
                ("restrict_sr", "on"),
                ("limit", "100"),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Network error for GET {}: {}", endpoint, e);
                if e.is_timeout() {
                    BotError::RedditApi(RedditApiError::RequestTimeout)
                } else {
                    BotError::Network(e)
                }
            })?;

        let response = Self::check_status(response, &endpoint).await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse search results: {}", e);
            RedditApiError::InvalidResponse {
                details: format!("failed to parse search results for r/{}", subreddit),
            }
        })?;

        let candidates: Vec<PostCandidate> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();

        info!(
            "Retrieved {} matching posts from r/{}",
            candidates.len(),
            subreddit
        );
        for candidate in &candidates {
            let created = DateTime::from_timestamp(candidate.created_utc, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string());
            debug!(
                "Candidate {} by u/{} created {}",
                candidate.id, candidate.author, created
            );
        }

        Ok(candidates)
    }

    async fn reply(&self, post_id: &str, text: &str) -> Result<(), BotError> {
        let endpoint = "/api/comment";
        let url = format!("{}{}", REDDIT_API_BASE, endpoint);
        let thing_id = format!("t3_{}", post_id);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.session.access_token)
            .form(&[
                ("api_type", "json"),
                ("thing_id", thing_id.as_str()),
                ("text", text),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Network error for POST {}: {}", endpoint, e);
                if e.is_timeout() {
                    BotError::RedditApi(RedditApiError::RequestTimeout)
                } else {
                    BotError::Network(e)
                }
            })?;

        Self::check_status(response, endpoint).await?;
        debug!("Comment submitted on {}", thing_id);
        Ok(())
    }
}

impl From<RedditPostData> for PostCandidate {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            author: post_data.author,
            title: post_data.title,
            body: post_data.selftext,
            created_utc: post_data.created_utc as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_rate_limited_with_hint() {
        let err = status_error(429, Some(5), "/r/test/search");
        match err {
            RedditApiError::RateLimitExceeded { retry_after } => {
                assert_eq!(retry_after, Some(5));
            }
            other => panic!("Expected RateLimitExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_status_error_rate_limited_without_hint() {
        let err = status_error(429, None, "/api/comment");
        assert!(matches!(
            err,
            RedditApiError::RateLimitExceeded { retry_after: None }
        ));
    }

    #[test]
    fn test_status_error_auth_and_permission() {
        assert!(matches!(
            status_error(401, None, "/api/comment"),
            RedditApiError::InvalidToken
        ));
        match status_error(403, None, "/api/comment") {
            RedditApiError::Forbidden { resource } => assert_eq!(resource, "/api/comment"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_status_error_server_error() {
        assert!(matches!(
            status_error(502, None, "/r/test/search"),
            RedditApiError::ServerError { status_code: 502 }
        ));
    }

    #[test]
    fn test_listing_deserialization() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "children": [
                    {
                        "kind": "t3",
                        "data": {
                            "id": "abc123",
                            "title": "Looking for an ebike",
                            "selftext": "Any recommendations?",
                            "author": "some_user",
                            "created_utc": 1640995200.0
                        }
                    }
                ],
                "after": null,
                "before": null
            }
        }"#;

        let listing: RedditListing<RedditPostData> = serde_json::from_str(json).unwrap();
        assert_eq!(listing.data.children.len(), 1);

        let candidate: PostCandidate = listing.data.children[0].data.clone().into();
        assert_eq!(candidate.id, "abc123");
        assert_eq!(candidate.author, "some_user");
        assert_eq!(candidate.body, "Any recommendations?");
        assert_eq!(candidate.created_utc, 1640995200);
    }

    #[test]
    fn test_listing_deserialization_missing_author() {
        // Deleted accounts come back without an author field
        let json = r#"{
            "kind": "Listing",
            "data": {
                "children": [
                    {
                        "kind": "t3",
                        "data": {
                            "id": "xyz789",
                            "title": "Orphaned post",
                            "created_utc": 1640995200.0
                        }
                    }
                ],
                "after": null,
                "before": null
            }
        }"#;

        let listing: RedditListing<RedditPostData> = serde_json::from_str(json).unwrap();
        assert_eq!(listing.data.children[0].data.author, "");
    }
}
