pub mod config;
pub mod ledger;

pub use config::load_settings;
pub use ledger::{Ledger, LedgerStore, SheetLedgerStore};

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use subreply_core::{BotError, SheetsError};
use tracing::{debug, error};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Cell values for one A1-notation range, as the values API returns and
/// accepts them. Trailing empty rows are omitted entirely by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Thin client over the Google Sheets values API: read a range, append a
/// row. Authentication is a bearer token minted outside this process.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: Client,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: String, access_token: String) -> Result<Self, BotError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            spreadsheet_id,
            access_token,
        })
    }

    /// Reads all populated cells in `range` (A1 notation, e.g. `Config!A:B`).
    pub async fn get_range(&self, range: &str) -> Result<Vec<Vec<String>>, BotError> {
        let url = format!(
            "{}/{}/values/{}?valueRenderOption=FORMATTED_VALUE",
            SHEETS_API_BASE, self.spreadsheet_id, range
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                error!("Network error reading range {}: {}", range, e);
                e
            })?;
        let response = check_status(response, range)?;

        let value_range: ValueRange = response.json().await.map_err(|e| {
            error!("Failed to parse values for range {}: {}", range, e);
            SheetsError::InvalidResponse {
                details: format!("failed to parse values for {}", range),
            }
        })?;

        debug!(
            "Read {} rows from range {}",
            value_range.values.len(),
            range
        );
        Ok(value_range.values)
    }

    /// Appends one row after the last populated row of `range`.
    pub async fn append_row(&self, range: &str, row: Vec<String>) -> Result<(), BotError> {
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=RAW",
            SHEETS_API_BASE, self.spreadsheet_id, range
        );
        let body = ValueRange { values: vec![row] };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Network error appending to range {}: {}", range, e);
                e
            })?;
        check_status(response, range)?;

        debug!("Appended one row to range {}", range);
        Ok(())
    }
}

fn check_status(response: Response, range: &str) -> Result<Response, BotError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    error!("Sheets request failed with status {} for {}", status, range);
    let err = match status.as_u16() {
        401 => SheetsError::Unauthorized,
        403 => SheetsError::Forbidden {
            range: range.to_string(),
        },
        404 => SheetsError::NotFound {
            range: range.to_string(),
        },
        s if (500..600).contains(&s) => SheetsError::ServerError { status_code: s },
        s => SheetsError::InvalidResponse {
            details: format!("unexpected status {} for {}", s, range),
        },
    };
    Err(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_range_parse() {
        let json = r#"{
            "range": "Config!A1:B9",
            "majorDimension": "ROWS",
            "values": [["REDDIT_USERNAME", "ebike_helper"], ["SLEEP_DURATION", "300"]]
        }"#;
        let parsed: ValueRange = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.values.len(), 2);
        assert_eq!(parsed.values[0][1], "ebike_helper");
    }

    #[test]
    fn test_value_range_parse_empty_sheet() {
        // The API omits "values" entirely for an empty range
        let json = r#"{"range": "PostIDs!A:A", "majorDimension": "ROWS"}"#;
        let parsed: ValueRange = serde_json::from_str(json).unwrap();
        assert!(parsed.values.is_empty());
    }
}
