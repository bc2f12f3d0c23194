//! Page fetcher implementations.
//!
//! - [`HttpFetcher`] - static markup over HTTP with browser-like headers
//! - [`RenderClient`] - Firecrawl-compatible render service for JavaScript pages

pub mod http;
pub mod render;

pub use http::HttpFetcher;
pub use render::RenderClient;
