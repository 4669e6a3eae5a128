//! Update Item Quantity slice

use axum::extract::State;
use serde::Deserialize;

use crate::domain::catalog::Product;
use crate::domain::{ShopError, non_blank};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{Cart, CartView};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
}

pub async fn update_item_endpoint(
    State(store): State<Store>,
    Payload(payload): Payload<UpdateItemPayload>,
) -> Result<ApiResponse<CartView>, ClientError> {
    let cart = update_item(&store, payload).await?;
    Ok(ApiResponse::new("Cart updated successfully", cart))
}

//----------------------- Implementation --------------------------

pub async fn update_item(store: &Store, payload: UpdateItemPayload) -> Result<CartView, ShopError> {
    let (Some(user_id), Some(product_id), Some(quantity)) = (
        non_blank(payload.user_id),
        non_blank(payload.product_id),
        payload.quantity,
    ) else {
        return Err(ShopError::invalid(
            "User ID, Product ID, and quantity are required",
        ));
    };

    let cart = Cart::for_user(store, &user_id).await?;
    if cart.line(&product_id).is_none() {
        return Err(ShopError::ItemNotInCart);
    }
    if quantity > 0 {
        let product = Product::find(store, &product_id).await?;
        if product.stock < quantity {
            return Err(ShopError::InsufficientStock);
        }
    }

    let cart = cart
        .modify(store, |cart| cart.set_quantity(&product_id, quantity))
        .await?;
    CartView::populate(store, cart).await
}

//-------------------------- Tests -------------------------------
