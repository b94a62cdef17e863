pub mod orchestrator;
pub mod rss;

use async_trait::async_trait;

use crate::{Instance, PostRecord, Result};

pub use orchestrator::fetch_with_fallback;
pub use rss::{parse_latest_post, RssFetcher};

/// Reads the latest post for `handle` from one mirror. Implementations enforce
/// their own timeout.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, instance: &Instance, handle: &str) -> Result<PostRecord>;
}
