// HTTP routes
pub mod control;
pub mod debug;
pub mod health;
pub mod insights;

pub use control::*;
pub use debug::*;
pub use health::*;
pub use insights::*;

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
