// Sharemine - Server Core
//
// Background pipeline that asks a local model for shared-conversation links,
// extracts the conversations behind them, and stores structured insights.
// The HTTP surface starts, stops, and inspects the loop.
//
// Domains live in domains/*; infrastructure traits and mocks in kernel/.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
