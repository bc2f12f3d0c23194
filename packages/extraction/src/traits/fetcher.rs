//! Page fetcher trait.
//!
//! A fetcher turns a link into raw markup. The static HTTP client and the
//! render service client both implement it, so strategies never care where
//! the markup came from.

use async_trait::async_trait;

use crate::error::StrategyResult;
use crate::types::page::FetchedPage;

/// Retrieves raw markup for a URL.
///
/// Implementations classify failures: missing or private pages map to
/// [`StrategyFailure::NotFound`](crate::StrategyFailure::NotFound), transport
/// problems and unexpected statuses to
/// [`StrategyFailure::Unavailable`](crate::StrategyFailure::Unavailable).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url`.
    async fn fetch(&self, url: &str) -> StrategyResult<FetchedPage>;

    /// Name used in logs.
    fn name(&self) -> &str;
}
