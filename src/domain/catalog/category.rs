use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, ShopError};
use crate::store::{Collection, Repository, Store};

use super::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    #[serde(default)]
    pub product_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Category {
    pub fn repository(store: &Store) -> Repository<Category> {
        Repository::new(store, Collection::Categories)
    }

    pub async fn find(store: &Store, id: &str) -> Result<Category, ShopError> {
        Category::repository(store)
            .get_by_id(id)
            .await?
            .ok_or(ShopError::NotFound(Entity::Category))
    }

    pub async fn find_by_slug(store: &Store, slug: &str) -> Result<Category, ShopError> {
        Category::repository(store)
            .get_by_field("slug", slug)
            .await?
            .ok_or(ShopError::NotFound(Entity::Category))
    }

    /// Replaces the stored count with the live number of active products.
    pub async fn with_live_count(mut self, store: &Store) -> Result<Category, ShopError> {
        self.product_count = active_products_in(store, &self.name).await?.len();
        Ok(self)
    }
}

/// Products reference their category by name.
pub async fn products_in(store: &Store, category_name: &str) -> Result<Vec<Product>, ShopError> {
    Ok(Product::repository(store)
        .find_many_by_field("category", category_name)
        .await?)
}

pub async fn active_products_in(
    store: &Store,
    category_name: &str,
) -> Result<Vec<Product>, ShopError> {
    let mut products = products_in(store, category_name).await?;
    products.retain(|product| product.is_active);
    Ok(products)
}

/// URL-safe slug: lower-case ASCII letters, digits and single hyphens.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }
    slug
}
