//! Add Item slice

use axum::extract::State;
use serde::Deserialize;
use tracing::info;

use crate::domain::catalog::Product;
use crate::domain::{ShopError, non_blank};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{Cart, CartView};

//------------------------- Web API ----------------------------

fn one() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemPayload {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    #[serde(default = "one")]
    pub quantity: i64,
}

pub async fn add_item_endpoint(
    State(store): State<Store>,
    Payload(payload): Payload<AddItemPayload>,
) -> Result<ApiResponse<CartView>, ClientError> {
    let cart = add_item(&store, payload).await?;
    Ok(ApiResponse::new("Item added to cart successfully", cart))
}

//----------------------- Implementation --------------------------

pub async fn add_item(store: &Store, payload: AddItemPayload) -> Result<CartView, ShopError> {
    let (Some(user_id), Some(product_id)) =
        (non_blank(payload.user_id), non_blank(payload.product_id))
    else {
        return Err(ShopError::invalid("User ID and Product ID are required"));
    };
    let quantity = payload.quantity;
    if quantity < 1 {
        return Err(ShopError::invalid("Quantity must be at least 1"));
    }

    let product = Product::find(store, &product_id).await?;
    if !product.is_active {
        return Err(ShopError::ProductUnavailable);
    }
    if product.stock < quantity {
        return Err(ShopError::InsufficientStock);
    }

    let cart = Cart::get_or_create(store, &user_id)
        .await?
        .modify(store, |cart| {
            cart.add(&product, quantity);
            Ok(())
        })
        .await?;
    info!(%user_id, %product_id, quantity, "Item added to cart");

    CartView::populate(store, cart).await
}

//-------------------------- Tests -------------------------------
