// HTTP control surface (Axum)
pub mod app;
pub mod routes;

pub use app::*;
