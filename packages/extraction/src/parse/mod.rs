//! Markup parsers shared by the extraction strategies.
//!
//! - [`dom`] - structural turn markers in rendered or static HTML
//! - [`embedded`] - message nodes in `<script>` JSON payloads
//! - [`paragraphs`] - speaker labels and paragraph splitting over visible text
//! - [`roles`] - phrasing-based role guesses
//! - [`filters`] - error banners and page-health checks
//! - [`text`] - visible-text rendering of HTML

pub mod dom;
pub mod embedded;
pub mod filters;
pub mod paragraphs;
pub mod roles;
pub mod text;
