use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

use crate::config::CorsConfig;

/// Browser access for the configured front-end origin only.
pub fn cors_layer(cfg: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let origin = cfg
        .allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid cors origin '{}'", cfg.allowed_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]))
}
