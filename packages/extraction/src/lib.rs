//! Conversation extraction from share links
//!
//! Resolves a shared-conversation link into ordered user/assistant turns by
//! walking a chain of fallback strategies, widest parse first.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use extraction::{ConversationExtractor, HttpFetcher, RenderClient};
//!
//! let fetcher = Arc::new(HttpFetcher::new()?);
//! let renderer = Arc::new(RenderClient::new("http://localhost:3002")?);
//! let extractor = ConversationExtractor::default_chain(fetcher, Some(renderer));
//!
//! let conversation = extractor.extract("https://chatgpt.com/share/...").await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - `ExtractionStrategy` and `PageFetcher`
//! - [`strategies`] - rendered DOM, static HTML, embedded JSON, text heuristic
//! - [`fetchers`] - HTTP and render-service page sources
//! - [`parse`] - markup parsers and page-health filters
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod extractor;
pub mod fetchers;
pub mod parse;
pub mod strategies;
pub mod target;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ExtractionError, StrategyAttempt, StrategyFailure, StrategyResult};
pub use extractor::ConversationExtractor;
pub use fetchers::{HttpFetcher, RenderClient};
pub use target::ExtractionTarget;
pub use traits::{fetcher::PageFetcher, strategy::ExtractionStrategy};
pub use types::{
    conversation::{Conversation, ConversationTurn, Role},
    page::FetchedPage,
};
