mod add_item;
mod clear_cart;
mod get_cart;
mod model;
mod remove_item;
mod update_item;

pub use add_item::{AddItemPayload, add_item, add_item_endpoint};
pub use clear_cart::{clear_cart, clear_cart_endpoint};
pub use get_cart::{get_cart, get_cart_endpoint};
pub use model::{Cart, CartItem, CartLineView, CartView, ProductSnapshot};
pub use remove_item::{remove_item, remove_item_endpoint};
pub use update_item::{UpdateItemPayload, update_item, update_item_endpoint};
