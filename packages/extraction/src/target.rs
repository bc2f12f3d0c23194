//! The link under extraction and its shared markup.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::StrategyResult;
use crate::parse::filters::check_page_health;
use crate::traits::fetcher::PageFetcher;
use crate::types::page::FetchedPage;

/// One extraction in progress.
///
/// Strategies that work from the static markup call [`page`](Self::page);
/// the first call fetches and health-checks the page, later calls reuse the
/// outcome, including a failure. A dead link is fetched once per extraction.
pub struct ExtractionTarget {
    url: String,
    fetcher: Arc<dyn PageFetcher>,
    page: OnceCell<StrategyResult<FetchedPage>>,
}

impl ExtractionTarget {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
            page: OnceCell::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Shared, memoized page markup.
    pub async fn page(&self) -> StrategyResult<&FetchedPage> {
        self.page
            .get_or_init(|| self.fetch_checked())
            .await
            .as_ref()
            .map_err(Clone::clone)
    }

    async fn fetch_checked(&self) -> StrategyResult<FetchedPage> {
        debug!(url = %self.url, fetcher = self.fetcher.name(), "Fetching page markup");
        let page = self.fetcher.fetch(&self.url).await?;
        check_page_health(&page)?;
        Ok(page)
    }

    /// Whether the shared markup has already been fetched (or failed).
    pub fn is_fetched(&self) -> bool {
        self.page.initialized()
    }
}
