//! Domain models persisted in the document collections.

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem};
pub use product::Product;
pub use user::User;
