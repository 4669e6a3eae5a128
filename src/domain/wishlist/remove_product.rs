//! Remove From Wishlist and Clear Wishlist slice

use axum::extract::{Path, State};

use crate::domain::ShopError;
use crate::domain::auth::AuthUser;
use crate::infra::{ApiResponse, ClientError};
use crate::store::Store;

use super::{Wishlist, WishlistView};

//------------------------- Web API ----------------------------

pub async fn remove_from_wishlist_endpoint(
    State(store): State<Store>,
    _user: AuthUser,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<ApiResponse<WishlistView>, ClientError> {
    let wishlist = remove_from_wishlist(&store, &user_id, &product_id).await?;
    Ok(ApiResponse::new(
        "Product removed from wishlist successfully",
        wishlist,
    ))
}

pub async fn clear_wishlist_endpoint(
    State(store): State<Store>,
    _user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<WishlistView>, ClientError> {
    let wishlist = clear_wishlist(&store, &user_id).await?;
    Ok(ApiResponse::new("Wishlist cleared successfully", wishlist))
}

//----------------------- Implementation --------------------------

pub async fn remove_from_wishlist(
    store: &Store,
    user_id: &str,
    product_id: &str,
) -> Result<WishlistView, ShopError> {
    let wishlist = Wishlist::for_user(store, user_id)
        .await?
        .modify(store, |wishlist| wishlist.remove(product_id))
        .await?;
    WishlistView::populate(store, wishlist).await
}

pub async fn clear_wishlist(store: &Store, user_id: &str) -> Result<WishlistView, ShopError> {
    let wishlist = Wishlist::for_user(store, user_id)
        .await?
        .modify(store, |wishlist| {
            wishlist.product_ids.clear();
            Ok(())
        })
        .await?;
    WishlistView::populate(store, wishlist).await
}

//-------------------------- Tests -------------------------------
