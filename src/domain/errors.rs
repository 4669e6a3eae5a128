use crate::identity::IdentityError;
use crate::store::StoreError;

use super::orders::OrderStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Entity {
    Product,
    Cart,
    Order,
    Review,
    Category,
    Wishlist,
    User,
}

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("Item not found in cart")]
    ItemNotInCart,
    #[error("Product not found in wishlist")]
    ProductNotInWishlist,
    #[error("Product {0} not found")]
    CheckoutProductNotFound(String),
    #[error("Product is not available")]
    ProductUnavailable,
    #[error("Product {0} is not available")]
    CheckoutProductUnavailable(String),
    #[error("Insufficient stock")]
    InsufficientStock,
    #[error("Insufficient stock for {name}. Available: {available}")]
    InsufficientStockFor { name: String, available: i64 },
    #[error("Cannot cancel order with status: {0}")]
    CannotCancel(OrderStatus),
    #[error("Product already in wishlist")]
    AlreadyInWishlist,
    #[error("Category with this name already exists")]
    DuplicateCategory,
    #[error("Cannot delete category. It has {0} active products")]
    CategoryInUse(usize),
    #[error("User with this email already exists")]
    DuplicateUser,
    #[error("{0} was changed by another request")]
    ConcurrentUpdate(Entity),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How a [`ShopError`] is reported to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invalid,
    NotFound,
    Conflict,
    Internal,
}

impl ShopError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ShopError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShopError::Validation(_)
            | ShopError::ProductUnavailable
            | ShopError::CheckoutProductUnavailable(_)
            | ShopError::InsufficientStock
            | ShopError::InsufficientStockFor { .. }
            | ShopError::CannotCancel(_)
            | ShopError::AlreadyInWishlist => ErrorKind::Invalid,
            ShopError::NotFound(_)
            | ShopError::ItemNotInCart
            | ShopError::ProductNotInWishlist
            | ShopError::CheckoutProductNotFound(_) => ErrorKind::NotFound,
            ShopError::DuplicateCategory
            | ShopError::CategoryInUse(_)
            | ShopError::DuplicateUser
            | ShopError::ConcurrentUpdate(_) => ErrorKind::Conflict,
            // Identity failures carry their own classification, see `ClientError`.
            ShopError::Identity(_) | ShopError::Store(_) => ErrorKind::Internal,
        }
    }
}
