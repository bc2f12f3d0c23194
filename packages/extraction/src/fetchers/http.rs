//! Static HTTP fetcher.
//!
//! Plain reqwest with a desktop browser identity. No JavaScript runs, so
//! client-rendered pages come back as a shell; the embedded-JSON and
//! text strategies still get something to work with.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{ExtractionError, Result, StrategyFailure, StrategyResult};
use crate::parse::filters::is_login_redirect;
use crate::traits::fetcher::PageFetcher;
use crate::types::page::FetchedPage;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Fetches raw markup over HTTP.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with a 20 second request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(20))
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ExtractionError::ClientSetup(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    fn transport_failure(&self, e: reqwest::Error) -> StrategyFailure {
        if e.is_timeout() {
            StrategyFailure::Timeout(self.timeout)
        } else {
            StrategyFailure::Unavailable(e.to_string())
        }
    }
}

/// Map a response status to a failure, or `None` when the page is usable.
pub fn classify_status(status: StatusCode) -> Option<StrategyFailure> {
    match status.as_u16() {
        404 | 410 => Some(StrategyFailure::NotFound(format!("HTTP {}", status))),
        401 | 403 => Some(StrategyFailure::NotFound(format!(
            "HTTP {} (share is private)",
            status
        ))),
        _ if !status.is_success() => Some(StrategyFailure::Unavailable(format!("HTTP {}", status))),
        _ => None,
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> StrategyResult<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        debug!(url = %url, final_url = %final_url, status = %status, "Fetched page");

        if let Some(failure) = classify_status(status) {
            return Err(failure);
        }
        if is_login_redirect(&final_url) {
            return Err(StrategyFailure::NotFound(format!(
                "redirected to login ({})",
                final_url
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| self.transport_failure(e))?;

        Ok(FetchedPage::new(url, html)
            .with_final_url(final_url)
            .with_status(status.as_u16()))
    }

    fn name(&self) -> &str {
        "http"
    }
}
