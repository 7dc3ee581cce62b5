//! Data structures representing database entities.

pub mod order;
pub mod order_item;
pub mod product;
pub mod review;
pub mod user;

pub use order::{Order, OrderStatus, ShippingInfo};
pub use order_item::OrderItem;
pub use product::{Product, ProductImage};
pub use review::Review;
pub use user::{Role, User};
