// Business domains
pub mod artifacts;
pub mod insights;
pub mod links;
pub mod pipeline;
