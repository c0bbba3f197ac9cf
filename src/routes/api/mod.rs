pub mod items;
mod router;
pub mod todos;

pub use router::router;
