//! Get Wishlist and Wishlist Status slice

use axum::extract::{Path, State};
use serde::Serialize;

use crate::domain::ShopError;
use crate::domain::auth::AuthUser;
use crate::infra::{ApiResponse, ClientError};
use crate::store::Store;

use super::{Wishlist, WishlistView};

//------------------------- Web API ----------------------------

pub async fn get_wishlist_endpoint(
    State(store): State<Store>,
    _user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<WishlistView>, ClientError> {
    let wishlist = get_wishlist(&store, &user_id).await?;
    Ok(ApiResponse::new("Wishlist retrieved successfully", wishlist))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistStatus {
    pub product_id: String,
    pub is_in_wishlist: bool,
}

pub async fn wishlist_status_endpoint(
    State(store): State<Store>,
    _user: AuthUser,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<ApiResponse<WishlistStatus>, ClientError> {
    let status = wishlist_status(&store, &user_id, product_id).await?;
    Ok(ApiResponse::new("Wishlist status checked", status))
}

//----------------------- Implementation --------------------------

pub async fn get_wishlist(store: &Store, user_id: &str) -> Result<WishlistView, ShopError> {
    let wishlist = Wishlist::get_or_create(store, user_id).await?;
    WishlistView::populate(store, wishlist).await
}

/// Does not create a wishlist for users that have none.
pub async fn wishlist_status(
    store: &Store,
    user_id: &str,
    product_id: String,
) -> Result<WishlistStatus, ShopError> {
    let is_in_wishlist = Wishlist::find_for_user(store, user_id)
        .await?
        .is_some_and(|wishlist| wishlist.contains(&product_id));
    Ok(WishlistStatus {
        product_id,
        is_in_wishlist,
    })
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn status_is_false_without_a_wishlist() {
        let store: Store = Arc::new(MemoryStore::new());

        let status = wishlist_status(&store, "u1", "p1".to_owned())
            .await
            .unwrap();

        assert!(!status.is_in_wishlist);
        assert!(Wishlist::find_for_user(&store, "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_creates_an_empty_wishlist_once() {
        let store: Store = Arc::new(MemoryStore::new());

        let first = get_wishlist(&store, "u1").await.unwrap();
        let second = get_wishlist(&store, "u1").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.item_count, 0);
    }
}
