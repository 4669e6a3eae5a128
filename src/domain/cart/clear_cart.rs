//! Clear Cart slice

use axum::extract::{Path, State};

use crate::domain::ShopError;
use crate::infra::{ApiResponse, ClientError};
use crate::store::Store;

use super::{Cart, CartView};

//------------------------- Web API ----------------------------

pub async fn clear_cart_endpoint(
    State(store): State<Store>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<CartView>, ClientError> {
    let cart = clear_cart(&store, &user_id).await?;
    Ok(ApiResponse::new("Cart cleared successfully", cart))
}

//----------------------- Implementation --------------------------

pub async fn clear_cart(store: &Store, user_id: &str) -> Result<CartView, ShopError> {
    let cart = Cart::for_user(store, user_id)
        .await?
        .modify(store, |cart| {
            cart.clear();
            Ok(())
        })
        .await?;
    CartView::populate(store, cart).await
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fake::{Fake, Faker};
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::Entity;
    use crate::domain::cart::{AddItemPayload, add_item};
    use crate::domain::catalog::NewProduct;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn clearing_zeroes_the_totals_but_keeps_the_cart() {
        let store: Store = Arc::new(MemoryStore::new());
        let product = Faker.fake::<NewProduct>().insert(&store).await.unwrap();
        let before = add_item(
            &store,
            AddItemPayload {
                user_id: Some("u1".to_owned()),
                product_id: Some(product.id),
                quantity: 2,
            },
        )
        .await
        .unwrap();

        let view = clear_cart(&store, "u1").await.unwrap();

        assert_eq!(view.id, before.id);
        assert!(view.items.is_empty());
        assert_eq!(view.total_amount, Decimal::ZERO);
        assert_eq!(view.item_count, 0);
    }

    #[tokio::test]
    async fn clearing_a_missing_cart_is_not_found() {
        let store: Store = Arc::new(MemoryStore::new());
        assert!(matches!(
            clear_cart(&store, "nobody").await,
            Err(ShopError::NotFound(Entity::Cart))
        ));
    }
}
