//! Insights domain - distills a conversation into a fixed-schema record

pub mod activities;
pub mod models;
pub mod parse;
pub mod prompts;

pub use activities::{summarize, InsightError};
pub use models::{normalize_tags, InsightRecord, Sentiment};
pub use parse::parse_insight;
