//! Links domain - synthesizes candidate share-links and validates them

pub mod activities;
pub mod grammar;
pub mod models;

pub use activities::{generate, generate_valid, LinkGenerationError};
pub use grammar::{extract_candidate, is_valid_share_link};
pub use models::{CandidateLink, LinkTally};
