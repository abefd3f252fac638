use std::time::Duration;

/// Reddit script-app credentials, loaded from the configuration sheet.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

/// Immutable runtime settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub subreddit: String,
    pub search_query: String,
    pub reply_message: String,
    pub sleep_duration: Duration,
}

/// One search result, held only for the duration of a cycle.
#[derive(Debug, Clone)]
pub struct PostCandidate {
    pub id: String,
    pub author: String,
    pub title: String,
    pub body: String,
    pub created_utc: i64,
}
