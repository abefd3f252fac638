use crate::SheetsClient;
use std::collections::HashMap;
use std::time::Duration;
use subreply_core::{BotError, ConfigError, Credentials, Settings};
use tracing::info;

const KEY_USERNAME: &str = "REDDIT_USERNAME";
const KEY_PASSWORD: &str = "REDDIT_PASSWORD";
const KEY_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
const KEY_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
const KEY_USER_AGENT: &str = "REDDIT_USER_AGENT";
const KEY_SUBREDDIT: &str = "TARGET_SUBREDDIT";
const KEY_SEARCH_STRING: &str = "SEARCH_STRING";
const KEY_REPLY_MESSAGE: &str = "REPLY_MESSAGE";
const KEY_SLEEP_DURATION: &str = "SLEEP_DURATION";

/// Loads all required settings from the configuration worksheet. Rows are
/// (key, value) pairs; lookup is by exact key match in the first column.
/// Any missing or empty key is fatal, so there is no retry here.
pub async fn load_settings(sheets: &SheetsClient, worksheet: &str) -> Result<Settings, BotError> {
    let rows = sheets.get_range(&format!("{}!A:B", worksheet)).await?;
    let settings = settings_from_rows(rows)?;
    info!("Config set from sheet worksheet {}", worksheet);
    Ok(settings)
}

fn settings_from_rows(rows: Vec<Vec<String>>) -> Result<Settings, BotError> {
    let mut table = HashMap::new();
    for row in rows {
        let mut cells = row.into_iter();
        if let (Some(key), Some(value)) = (cells.next(), cells.next()) {
            table.insert(key, value);
        }
    }

    let sleep_raw = required(&table, KEY_SLEEP_DURATION)?;
    let sleep_seconds: u64 = sleep_raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: KEY_SLEEP_DURATION.to_string(),
        value: sleep_raw.clone(),
    })?;
    if sleep_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            key: KEY_SLEEP_DURATION.to_string(),
            value: sleep_raw,
        }
        .into());
    }

    Ok(Settings {
        credentials: Credentials {
            username: required(&table, KEY_USERNAME)?,
            password: required(&table, KEY_PASSWORD)?,
            client_id: required(&table, KEY_CLIENT_ID)?,
            client_secret: required(&table, KEY_CLIENT_SECRET)?,
            user_agent: required(&table, KEY_USER_AGENT)?,
        },
        subreddit: required(&table, KEY_SUBREDDIT)?,
        search_query: required(&table, KEY_SEARCH_STRING)?,
        reply_message: required(&table, KEY_REPLY_MESSAGE)?,
        sleep_duration: Duration::from_secs(sleep_seconds),
    })
}

fn required(table: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    match table.get(key) {
        None => Err(ConfigError::MissingKey {
            key: key.to_string(),
        }),
        Some(value) if value.is_empty() => Err(ConfigError::EmptyValue {
            key: key.to_string(),
        }),
        Some(value) => Ok(value.clone()),
    }
}
