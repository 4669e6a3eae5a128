use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::catalog::Product;
use crate::domain::{Entity, ShopError};
use crate::store::{Collection, Repository, Store};

const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: String,
    pub user_id: String,
    /// Distinct, in the order they were added.
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WishlistContents<'a> {
    product_ids: &'a [String],
}

impl Wishlist {
    pub fn repository(store: &Store) -> Repository<Wishlist> {
        Repository::new(store, Collection::Wishlists)
    }

    pub async fn get_or_create(store: &Store, user_id: &str) -> Result<Wishlist, ShopError> {
        Ok(Wishlist::repository(store)
            .upsert_by_field("userId", user_id, &WishlistContents { product_ids: &[] })
            .await?)
    }

    pub async fn find_for_user(
        store: &Store,
        user_id: &str,
    ) -> Result<Option<Wishlist>, ShopError> {
        Ok(Wishlist::repository(store)
            .get_by_field("userId", user_id)
            .await?)
    }

    pub async fn for_user(store: &Store, user_id: &str) -> Result<Wishlist, ShopError> {
        Wishlist::find_for_user(store, user_id)
            .await?
            .ok_or(ShopError::NotFound(Entity::Wishlist))
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|id| id == product_id)
    }

    pub fn add(&mut self, product_id: &str) -> Result<(), ShopError> {
        if self.contains(product_id) {
            return Err(ShopError::AlreadyInWishlist);
        }
        self.product_ids.push(product_id.to_owned());
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> Result<(), ShopError> {
        let index = self
            .product_ids
            .iter()
            .position(|id| id == product_id)
            .ok_or(ShopError::ProductNotInWishlist)?;
        self.product_ids.remove(index);
        Ok(())
    }

    /// Saves the result of `change` unless the wishlist was saved by someone else since it was
    /// read, in which case it is re-read and `change` applied again.
    pub async fn modify<F>(mut self, store: &Store, mut change: F) -> Result<Wishlist, ShopError>
    where
        F: FnMut(&mut Wishlist) -> Result<(), ShopError> + Send,
    {
        let wishlists = Wishlist::repository(store);
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let read_at = self
                .updated_at
                .map(|at| Value::String(at.to_string()))
                .unwrap_or(Value::Null);
            change(&mut self)?;
            let contents = WishlistContents {
                product_ids: &self.product_ids,
            };
            if let Some(saved) = wishlists
                .update_if(&self.id, "updatedAt", read_at, &contents)
                .await?
            {
                return Ok(saved);
            }
            debug!(wishlist_id = %self.id, attempt, "Wishlist changed while updating, retrying");
            self = wishlists
                .get_by_id(&self.id)
                .await?
                .ok_or(ShopError::NotFound(Entity::Wishlist))?;
        }
        Err(ShopError::ConcurrentUpdate(Entity::Wishlist))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    pub id: String,
    pub user_id: String,
    pub product_ids: Vec<String>,
    /// Products that still exist, in wishlist order.
    pub products: Vec<Product>,
    pub item_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl WishlistView {
    pub async fn populate(store: &Store, wishlist: Wishlist) -> Result<WishlistView, ShopError> {
        let repository = Product::repository(store);
        let lookups = wishlist
            .product_ids
            .iter()
            .map(|id| repository.get_by_id(id));
        let products: Vec<Product> = futures::future::try_join_all(lookups)
            .await?
            .into_iter()
            .flatten()
            .collect();

        Ok(WishlistView {
            id: wishlist.id,
            user_id: wishlist.user_id,
            product_ids: wishlist.product_ids,
            item_count: products.len(),
            products,
            updated_at: wishlist.updated_at,
        })
    }
}
