mod add_product;
mod get_wishlist;
mod model;
mod remove_product;

pub use add_product::{AddToWishlistPayload, add_to_wishlist, add_to_wishlist_endpoint};
pub use get_wishlist::{
    WishlistStatus, get_wishlist, get_wishlist_endpoint, wishlist_status,
    wishlist_status_endpoint,
};
pub use model::{Wishlist, WishlistView};
pub use remove_product::{
    clear_wishlist, clear_wishlist_endpoint, remove_from_wishlist, remove_from_wishlist_endpoint,
};
