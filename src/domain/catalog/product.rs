use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, ShopError};
use crate::store::{Collection, Repository, Store};

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub set_trending: bool,
    #[serde(default)]
    pub ratings: Decimal,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Product {
    pub fn repository(store: &Store) -> Repository<Product> {
        Repository::new(store, Collection::Products)
    }

    pub async fn find(store: &Store, id: &str) -> Result<Product, ShopError> {
        Product::repository(store)
            .get_by_id(id)
            .await?
            .ok_or(ShopError::NotFound(Entity::Product))
    }
}

/// A product as it is first stored. Ratings start at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i64,
    pub category: String,
    pub images: Vec<String>,
    pub set_trending: bool,
    pub is_active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredNewProduct<'a> {
    #[serde(flatten)]
    product: &'a NewProduct,
    ratings: Decimal,
    review_count: i64,
}

impl NewProduct {
    pub async fn insert(&self, store: &Store) -> Result<Product, ShopError> {
        Ok(Product::repository(store)
            .create(&StoredNewProduct {
                product: self,
                ratings: Decimal::ZERO,
                review_count: 0,
            })
            .await?)
    }
}

/// Partial product update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_trending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
