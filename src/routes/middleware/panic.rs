use std::any::Any;

use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::AppError;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Turns a panicking handler into the usual 500 envelope.
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    panic_error(payload.as_ref()).into_response()
}

/// Debug builds echo the panic message; release builds keep it in the log.
fn panic_error(payload: &(dyn Any + Send)) -> AppError {
    let reason = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(reason, "request handler panicked");

    if cfg!(debug_assertions) {
        AppError::internal_with_source("Some error occurred while handling the request", reason)
    } else {
        AppError::internal("Some error occurred while handling the request.")
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{self, Body},
        http::{Request, StatusCode},
        routing::get,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{catch_panic_layer, panic_error};
    use crate::error::AppError;

    #[test]
    fn string_and_str_payloads_are_both_reported() {
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("index out of bounds"));
        let borrowed: Box<dyn std::any::Any + Send> = Box::new("boom");
        let opaque: Box<dyn std::any::Any + Send> = Box::new(7_u8);

        for payload in [owned, borrowed, opaque] {
            assert!(matches!(panic_error(payload.as_ref()), AppError::Internal(_)));
        }
        if cfg!(debug_assertions) {
            let borrowed: Box<dyn std::any::Any + Send> = Box::new("boom");
            assert!(panic_error(borrowed.as_ref()).message().ends_with(": boom"));
        }
    }

    #[tokio::test]
    async fn panicking_handler_yields_json_envelope() {
        async fn explode() -> &'static str {
            panic!("boom")
        }
        let app = Router::new()
            .route("/explode", get(explode))
            .layer(catch_panic_layer());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/explode")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let json: Value = serde_json::from_slice(&body).expect("body should be json");
        assert_eq!(json["status"], 500);
        assert!(json["data"].is_null());
        assert!(
            json["message"]
                .as_str()
                .expect("message")
                .starts_with("Some error occurred while handling the request")
        );
    }
}
