pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod item_dao;
pub mod todo_dao;

pub use base::{DaoBase, DaoPager, PaginatedResponse};
pub use base_traits::{HasIdActiveModel, HasOrderingColumns, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use item_dao::{ItemChanges, ItemDao};
pub use todo_dao::{TodoDao, TodoFilter};
