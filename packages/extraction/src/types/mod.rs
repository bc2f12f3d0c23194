//! Domain types for conversation extraction.

pub mod conversation;
pub mod page;
