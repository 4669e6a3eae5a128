pub mod auth;
pub mod cart;
pub mod catalog;
mod errors;
mod helpers;
pub mod orders;
pub mod reviews;
pub mod wishlist;

pub use errors::{Entity, ErrorKind, ShopError};
pub use helpers::{fake, money::*, non_blank};
