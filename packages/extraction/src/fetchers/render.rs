//! Render service client.
//!
//! Talks to a Firecrawl-compatible `/v1/scrape` endpoint that loads the page
//! in a fresh headless browser context and returns the rendered DOM. Point it
//! at a self-hosted instance or the hosted API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ExtractionError, Result, StrategyFailure, StrategyResult};
use crate::fetchers::http::classify_status;
use crate::traits::fetcher::PageFetcher;
use crate::types::page::FetchedPage;

/// Milliseconds the renderer waits after load for client-side hydration.
const DEFAULT_WAIT_FOR_MS: u64 = 3000;

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
    #[serde(rename = "waitFor")]
    wait_for: u64,
    timeout: u64,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeData {
    #[serde(rename = "rawHtml")]
    raw_html: Option<String>,
    html: Option<String>,
    metadata: Option<ScrapeMetadata>,
}

#[derive(Deserialize)]
struct ScrapeMetadata {
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
    url: Option<String>,
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
    error: Option<String>,
}

/// Render service client.
///
/// ```rust,ignore
/// let renderer = RenderClient::new("http://localhost:3002")?.with_api_key(key);
/// let page = renderer.fetch("https://chatgpt.com/share/...").await?;
/// ```
pub struct RenderClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    wait_for_ms: u64,
    timeout: Duration,
}

impl RenderClient {
    /// Create a client for the service at `base_url` with a 45 second budget.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let timeout = Duration::from_secs(45);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractionError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.as_ref().trim().trim_end_matches('/').to_string(),
            api_key: None,
            wait_for_ms: DEFAULT_WAIT_FOR_MS,
            timeout,
        })
    }

    /// Send `Authorization: Bearer <key>` with each request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the post-load wait.
    pub fn with_wait_for(mut self, wait: Duration) -> Self {
        self.wait_for_ms = wait.as_millis() as u64;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn scrape_url(&self) -> String {
        format!("{}/v1/scrape", self.base_url)
    }
}

#[async_trait]
impl PageFetcher for RenderClient {
    async fn fetch(&self, url: &str) -> StrategyResult<FetchedPage> {
        let request = ScrapeRequest {
            url,
            formats: vec!["rawHtml"],
            wait_for: self.wait_for_ms,
            timeout: self.timeout.as_millis() as u64,
        };

        let mut builder = self.client.post(self.scrape_url()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                StrategyFailure::Timeout(self.timeout)
            } else {
                StrategyFailure::Unavailable(format!("render service: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, error = %body, "Render service error");
            return Err(StrategyFailure::Unavailable(format!(
                "render service returned HTTP {}",
                status
            )));
        }

        let scraped: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| StrategyFailure::Unavailable(format!("render response decode: {}", e)))?;

        page_from_response(url, scraped)
    }

    fn name(&self) -> &str {
        "render"
    }
}

fn page_from_response(url: &str, scraped: ScrapeResponse) -> StrategyResult<FetchedPage> {
    if !scraped.success {
        return Err(StrategyFailure::Unavailable(
            scraped
                .error
                .unwrap_or_else(|| "render service reported failure".into()),
        ));
    }

    let data = scraped
        .data
        .ok_or_else(|| StrategyFailure::MalformedContent("render response has no data".into()))?;

    let (status, final_url) = match &data.metadata {
        Some(meta) => {
            if let Some(error) = &meta.error {
                debug!(url = %url, error = %error, "Render metadata reports page error");
            }
            (
                meta.status_code.unwrap_or(200),
                meta.url
                    .clone()
                    .or_else(|| meta.source_url.clone())
                    .unwrap_or_else(|| url.to_string()),
            )
        }
        None => (200, url.to_string()),
    };

    if let Ok(code) = reqwest::StatusCode::from_u16(status) {
        if let Some(failure) = classify_status(code) {
            return Err(failure);
        }
    }

    let html = data
        .raw_html
        .or(data.html)
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| StrategyFailure::MalformedContent("render response has no HTML".into()))?;

    Ok(FetchedPage::new(url, html)
        .with_final_url(final_url)
        .with_status(status))
}
