//! Core trait abstractions for the extraction library.
//!
//! Applications plug in page sources through [`fetcher::PageFetcher`] and
//! extend the fallback chain through [`strategy::ExtractionStrategy`].

pub mod fetcher;
pub mod strategy;
