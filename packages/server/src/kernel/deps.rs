//! Server dependencies (using traits for testability)
//!
//! The central container handed to the pipeline and the HTTP layer. External
//! services sit behind trait objects so tests can swap in mocks.

use std::sync::Arc;

use anyhow::{Context, Result};
use extraction::{ConversationExtractor, HttpFetcher, PageFetcher, RenderClient};
use ollama_client::OllamaClient;
use tracing::info;

use crate::config::Config;
use crate::domains::artifacts::ArtifactStore;
use crate::kernel::{BaseModelGateway, OllamaGateway};

#[derive(Clone)]
pub struct ServerDeps {
    /// Model service used for link generation and summaries
    pub gateway: Arc<dyn BaseModelGateway>,
    /// Fallback chain resolving links to conversations
    pub extractor: Arc<ConversationExtractor>,
    /// On-disk artifacts
    pub store: Arc<ArtifactStore>,
}

impl ServerDeps {
    pub fn new(
        gateway: Arc<dyn BaseModelGateway>,
        extractor: ConversationExtractor,
        store: ArtifactStore,
    ) -> Self {
        Self {
            gateway,
            extractor: Arc::new(extractor),
            store: Arc::new(store),
        }
    }

    /// Build the production dependencies from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = OllamaClient::new(&config.local_url).with_timeout(config.model_timeout);
        let gateway = OllamaGateway::new(client, &config.model_name);
        info!(
            base_url = %gateway.base_url(),
            model = %config.model_name,
            "Model gateway configured"
        );

        let fetcher: Arc<dyn PageFetcher> =
            Arc::new(HttpFetcher::new().context("Failed to create HTTP fetcher")?);

        let renderer: Option<Arc<dyn PageFetcher>> = match &config.render_service_url {
            Some(url) => {
                let mut client =
                    RenderClient::new(url).context("Failed to create render service client")?;
                if let Some(key) = &config.render_api_key {
                    client = client.with_api_key(key);
                }
                info!(render_service = %client.base_url(), "Rendered extraction enabled");
                Some(Arc::new(client))
            }
            None => None,
        };

        let extractor = ConversationExtractor::default_chain(fetcher, renderer);
        info!(strategies = ?extractor.strategy_names(), "Extraction chain configured");

        let store = ArtifactStore::open(&config.data_dir).with_context(|| {
            format!("Failed to open data directory {}", config.data_dir.display())
        })?;

        Ok(Self::new(Arc::new(gateway), extractor, store))
    }
}
