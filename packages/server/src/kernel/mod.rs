//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod model_gateway;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use model_gateway::OllamaGateway;
pub use test_dependencies::{CompletionCall, MockModelGateway};
pub use traits::*;
