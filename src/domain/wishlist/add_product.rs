//! Add To Wishlist slice

use axum::extract::State;
use serde::Deserialize;

use crate::domain::auth::AuthUser;
use crate::domain::catalog::Product;
use crate::domain::{ShopError, non_blank};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{Wishlist, WishlistView};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistPayload {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
}

pub async fn add_to_wishlist_endpoint(
    State(store): State<Store>,
    _user: AuthUser,
    Payload(payload): Payload<AddToWishlistPayload>,
) -> Result<ApiResponse<WishlistView>, ClientError> {
    let wishlist = add_to_wishlist(&store, payload).await?;
    Ok(ApiResponse::new(
        "Product added to wishlist successfully",
        wishlist,
    ))
}

//----------------------- Implementation --------------------------

pub async fn add_to_wishlist(
    store: &Store,
    payload: AddToWishlistPayload,
) -> Result<WishlistView, ShopError> {
    let (Some(user_id), Some(product_id)) =
        (non_blank(payload.user_id), non_blank(payload.product_id))
    else {
        return Err(ShopError::invalid("User ID and Product ID are required"));
    };
    Product::find(store, &product_id).await?;

    let wishlist = Wishlist::get_or_create(store, &user_id)
        .await?
        .modify(store, |wishlist| wishlist.add(&product_id))
        .await?;
    WishlistView::populate(store, wishlist).await
}

//-------------------------- Tests -------------------------------
