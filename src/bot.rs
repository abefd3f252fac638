use reddit_client::{RedditApi, RetryPolicy};
use sheets_client::{Ledger, LedgerStore};
use std::future::Future;
use subreply_core::{BotError, PostCandidate, RedditApiError, Settings, Sleeper};
use tracing::{debug, error, info, warn};

/// The poll-process-sleep loop and the per-post reply logic. Collaborators
/// come in as trait implementations so the whole loop runs under test with
/// scripted platform responses and a fake clock.
pub struct Bot<R, S, C>
where
    R: RedditApi,
    S: LedgerStore,
    C: Sleeper,
{
    settings: Settings,
    reddit: R,
    ledger: Ledger<S>,
    sleeper: C,
    retry: RetryPolicy,
}

impl<R, S, C> Bot<R, S, C>
where
    R: RedditApi,
    S: LedgerStore,
    C: Sleeper,
{
    pub fn new(settings: Settings, reddit: R, ledger: Ledger<S>, sleeper: C) -> Self {
        Self {
            settings,
            reddit,
            ledger,
            sleeper,
            retry: RetryPolicy::default(),
        }
    }

    /// Runs cycles until `shutdown` resolves. A failed cycle is logged and
    /// followed by the normal sleep; nothing short of `shutdown` ends the
    /// loop. Interruption is honored between cycles, not mid-call.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        loop {
            if let Err(e) = self.run_cycle().await {
                error!("An error occurred during this cycle: {}", e);
            }

            info!(
                "Sleeping for {} seconds...",
                self.settings.sleep_duration.as_secs()
            );
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Bot terminated by user.");
                    break;
                }
                _ = self.sleeper.sleep(self.settings.sleep_duration) => {}
            }
        }
    }

    /// One search-and-process pass. The search goes through the retry
    /// policy; per-candidate failures are handled inside `process_post`
    /// and never abort the rest of the batch.
    pub async fn run_cycle(&mut self) -> Result<(), BotError> {
        info!(
            "Searching today's posts in r/{} for \"{}\"",
            self.settings.subreddit, self.settings.search_query
        );

        let candidates = self
            .retry
            .run(&self.sleeper, "search", || {
                self.reddit
                    .search_today(&self.settings.subreddit, &self.settings.search_query)
            })
            .await?;

        for candidate in &candidates {
            self.process_post(candidate).await;
        }

        info!("Search completed.");
        info!("Number of posts replied to: {}", self.ledger.len());
        Ok(())
    }

    /// The reply decision for one candidate: skip ledger hits and the
    /// bot's own posts, otherwise reply and record. The ledger append
    /// happens only after the reply succeeded.
    async fn process_post(&mut self, post: &PostCandidate) {
        if self.ledger.contains(&post.id) {
            info!("Post {} already replied to.", post.id);
            return;
        }
        if post
            .author
            .eq_ignore_ascii_case(&self.settings.credentials.username)
        {
            debug!("Skipping own post {}", post.id);
            return;
        }

        info!("Found post {}.", post.id);
        match self.reddit.reply(&post.id, &self.settings.reply_message).await {
            Ok(()) => {
                info!("Replied to post {}", post.id);
                if let Err(e) = self.ledger.append(&post.id).await {
                    error!("Failed to record post {} in ledger: {}", post.id, e);
                }
            }
            Err(BotError::RedditApi(RedditApiError::Forbidden { resource })) => {
                warn!(
                    "Permission error for post {}: forbidden access to {}. Skipping.",
                    post.id, resource
                );
            }
            Err(e) => {
                error!("Error while replying to post {}: {}. Skipping.", post.id, e);
            }
        }
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }
}
