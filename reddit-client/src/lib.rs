pub mod api;
pub mod auth;
pub mod retry;

pub use api::{RedditApi, RedditClient};
pub use auth::Session;
pub use retry::RetryPolicy;
