use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{api, public};

pub const API_PREFIX: &str = "/api";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest(API_PREFIX, api::router(state))
        .merge(public::router())
}
