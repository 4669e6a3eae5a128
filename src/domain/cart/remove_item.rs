//! Remove Item slice

use axum::extract::{Path, State};

use crate::domain::ShopError;
use crate::infra::{ApiResponse, ClientError};
use crate::store::Store;

use super::{Cart, CartView};

//------------------------- Web API ----------------------------

pub async fn remove_item_endpoint(
    State(store): State<Store>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<ApiResponse<CartView>, ClientError> {
    let cart = remove_item(&store, &user_id, &product_id).await?;
    Ok(ApiResponse::new("Item removed from cart successfully", cart))
}

//----------------------- Implementation --------------------------

pub async fn remove_item(
    store: &Store,
    user_id: &str,
    product_id: &str,
) -> Result<CartView, ShopError> {
    let cart = Cart::for_user(store, user_id)
        .await?
        .modify(store, |cart| cart.remove(product_id))
        .await?;
    CartView::populate(store, cart).await
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fake::{Fake, Faker};

    use super::*;
    use crate::domain::cart::{AddItemPayload, add_item};
    use crate::domain::catalog::NewProduct;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn removing_leaves_the_other_lines() {
        let store: Store = Arc::new(MemoryStore::new());
        let mut ids = vec![];
        for _ in 0..2 {
            let product = Faker.fake::<NewProduct>().insert(&store).await.unwrap();
            add_item(
                &store,
                AddItemPayload {
                    user_id: Some("u1".to_owned()),
                    product_id: Some(product.id.clone()),
                    quantity: 1,
                },
            )
            .await
            .unwrap();
            ids.push(product);
        }

        let view = remove_item(&store, "u1", &ids[0].id).await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].item.product_id, ids[1].id);
        assert_eq!(view.total_amount, ids[1].price);
        assert!(matches!(
            remove_item(&store, "u1", &ids[0].id).await,
            Err(ShopError::ItemNotInCart)
        ));
    }
}
