use axum::{Router, routing::get};

use crate::response::{ApiResult, JsonApiResponse};

pub const WELCOME_MESSAGE: &str = "Welcome to Todo Application API.";

pub fn router() -> Router {
    Router::new().route("/", get(welcome))
}

async fn welcome() -> ApiResult<()> {
    JsonApiResponse::with_status(axum::http::StatusCode::OK, WELCOME_MESSAGE, ())
}
