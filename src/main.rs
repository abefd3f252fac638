mod bot;

use anyhow::Context;
use bot::Bot;
use reddit_client::RedditClient;
use sheets_client::{Ledger, SheetLedgerStore, SheetsClient};
use subreply_core::TokioSleeper;

const CONFIG_WORKSHEET: &str = "Config";
const LEDGER_WORKSHEET: &str = "PostIDs";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Subreply - search-and-reply bot");

    // The spreadsheet is reached with credentials minted outside this
    // process; everything else comes from the sheet itself.
    let spreadsheet_id =
        std::env::var("SPREADSHEET_ID").context("SPREADSHEET_ID must be set")?;
    let sheets_token =
        std::env::var("SHEETS_ACCESS_TOKEN").context("SHEETS_ACCESS_TOKEN must be set")?;

    let sheets = SheetsClient::new(spreadsheet_id, sheets_token)
        .context("failed to build sheets client")?;

    let settings = sheets_client::load_settings(&sheets, CONFIG_WORKSHEET)
        .await
        .context("failed to load configuration")?;

    let reddit = RedditClient::login(&settings.credentials)
        .await
        .context("login failed")?;

    let store = SheetLedgerStore::new(sheets, LEDGER_WORKSHEET);
    let ledger = Ledger::load(store)
        .await
        .context("failed to load reply ledger")?;
    tracing::info!("Number of posts replied to: {}", ledger.len());

    let mut bot = Bot::new(settings, reddit, ledger, TokioSleeper);
    bot.run(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await;

    Ok(())
}
