mod context;
pub mod crud_service;
pub mod item_service;
pub mod todo_service;

pub use context::ServiceContext;
