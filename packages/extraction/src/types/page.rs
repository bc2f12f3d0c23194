//! Fetched page markup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw markup retrieved for a link, before any turn parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,

    /// URL after redirects (or as reported by the render service)
    pub final_url: String,

    /// HTTP status of the final response
    pub status: u16,

    /// Raw HTML
    pub html: String,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    /// Create a page with status 200 and `final_url == url`.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status: 200,
            html: html.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Set the final URL.
    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }

    /// Set the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn has_content(&self) -> bool {
        !self.html.trim().is_empty()
    }
}
