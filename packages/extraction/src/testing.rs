//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the extraction library
//! without touching the network.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{StrategyFailure, StrategyResult};
use crate::target::ExtractionTarget;
use crate::traits::{fetcher::PageFetcher, strategy::ExtractionStrategy};
use crate::types::{conversation::ConversationTurn, page::FetchedPage};

/// Shared call counter handed out by mocks before they move into an extractor.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn incr(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A scripted extraction strategy.
///
/// Queued results are returned first, one per call; after that every call
/// returns the fallback result.
pub struct MockStrategy {
    name: String,
    timeout: Duration,
    delay: Option<Duration>,
    queued: Mutex<VecDeque<StrategyResult<Vec<ConversationTurn>>>>,
    fallback: StrategyResult<Vec<ConversationTurn>>,
    calls: CallCounter,
    urls: Arc<Mutex<Vec<String>>>,
}

impl MockStrategy {
    /// A strategy that fails with `MalformedContent` until configured.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeout: Duration::from_secs(5),
            delay: None,
            queued: Mutex::new(VecDeque::new()),
            fallback: Err(StrategyFailure::MalformedContent("mock not configured".into())),
            calls: CallCounter::default(),
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always return these turns.
    pub fn with_turns(mut self, turns: Vec<ConversationTurn>) -> Self {
        self.fallback = Ok(turns);
        self
    }

    /// Always fail with this failure.
    pub fn with_failure(mut self, failure: StrategyFailure) -> Self {
        self.fallback = Err(failure);
        self
    }

    /// Queue a result for the next unanswered call.
    pub fn then(self, result: StrategyResult<Vec<ConversationTurn>>) -> Self {
        self.queued.lock().unwrap().push_back(result);
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Counter of `attempt` calls, usable after the strategy is moved.
    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }

    /// URLs this strategy was asked about, usable after the strategy is moved.
    pub fn url_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.urls.clone()
    }
}

#[async_trait]
impl ExtractionStrategy for MockStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<Vec<ConversationTurn>> {
        self.calls.incr();
        self.urls.lock().unwrap().push(target.url().to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self.queued.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.fallback.clone())
    }
}

/// A page fetcher serving canned pages.
///
/// Unknown URLs fail with `NotFound`.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, StrategyResult<FetchedPage>>,
    fetches: CallCounter,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `result` for `url`.
    pub fn with_page(
        mut self,
        url: impl Into<String>,
        result: StrategyResult<FetchedPage>,
    ) -> Self {
        self.pages.insert(url.into(), result);
        self
    }

    /// Serve `html` with status 200 for `url`.
    pub fn with_html(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let page = FetchedPage::new(url.clone(), html);
        self.with_page(url, Ok(page))
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> StrategyResult<FetchedPage> {
        self.fetches.incr();
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(StrategyFailure::NotFound(format!("no mock page for {}", url))))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
