//! Artifacts domain - durable one-file-per-artifact JSON storage

pub mod models;
pub mod store;

pub use models::{ArtifactId, SaveOutcome, StoredInsight};
pub use store::{ArtifactStore, StoreError};
