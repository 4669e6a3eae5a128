//! Get Cart slice

use axum::extract::{Path, State};

use crate::domain::ShopError;
use crate::infra::{ApiResponse, ClientError};
use crate::store::Store;

use super::{Cart, CartView};

//------------------------- Web API ----------------------------

pub async fn get_cart_endpoint(
    State(store): State<Store>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<CartView>, ClientError> {
    let cart = get_cart(&store, &user_id).await?;
    Ok(ApiResponse::new("Cart retrieved successfully", cart))
}

//----------------------- Implementation --------------------------

pub async fn get_cart(store: &Store, user_id: &str) -> Result<CartView, ShopError> {
    let cart = Cart::get_or_create(store, user_id).await?;
    CartView::populate(store, cart).await
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn first_access_creates_an_empty_cart() {
        let store: Store = Arc::new(MemoryStore::new());

        let view = get_cart(&store, "u1").await.unwrap();

        assert_eq!(view.user_id, "u1");
        assert!(view.items.is_empty());
        assert_eq!(view.total_amount, Decimal::ZERO);
        assert_eq!(view.item_count, 0);
        assert_eq!(get_cart(&store, "u1").await.unwrap().id, view.id);
    }
}
