pub mod api;
mod entry;
pub mod middleware;
pub mod public;

pub use entry::{API_PREFIX, router};
pub use middleware::{catch_panic_layer, cors_layer, json_error_middleware};
