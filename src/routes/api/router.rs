use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{items, todos};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(todos::router(state.clone()))
        .merge(items::router(state))
}
