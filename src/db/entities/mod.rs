#[allow(unused_imports)]
pub mod prelude {
    pub use super::item::Entity as Item;
    pub use super::todo::Entity as Todo;
}

pub mod item;
pub mod todo;
