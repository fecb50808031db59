//! Domain models.
//!
//! These types represent validated domain objects separate from database row
//! types; the repositories in [`crate::db`] map rows into them.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod session;
pub mod user;

pub use cart::{CartItem, CartLine};
pub use catalog::{Category, Product, ProductImage, ProductSummary};
pub use order::{Order, OrderLine};
pub use session::{CurrentUser, session_keys};
pub use user::User;
