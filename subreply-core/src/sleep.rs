use async_trait::async_trait;
use std::time::Duration;

/// Clock seam for everything that waits: the inter-cycle sleep and the
/// rate-limit backoff both go through this, so tests can observe requested
/// delays without touching the wall clock.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
