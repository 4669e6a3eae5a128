//! Update Category slice. Renaming cascades onto the products that reference the old name.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{Entity, ShopError};
use crate::domain::auth::AdminUser;
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{Category, Product, ProductPatch, products_in, slugify};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn update_category_endpoint(
    State(store): State<Store>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateCategoryPayload>,
) -> Result<ApiResponse<Category>, ClientError> {
    let category = update_category(&store, &id, payload).await?;
    Ok(ApiResponse::new("Category updated successfully", category))
}

//----------------------- Implementation --------------------------

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

pub async fn update_category(
    store: &Store,
    id: &str,
    payload: UpdateCategoryPayload,
) -> Result<Category, ShopError> {
    let categories = Category::repository(store);
    let existing = Category::find(store, id).await?;

    let mut patch = CategoryPatch {
        description: payload.description.map(|d| d.trim().to_owned()),
        is_active: payload.is_active,
        ..Default::default()
    };

    let new_name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    if let Some(new_name) = new_name {
        let clash = categories.get_by_field("name", new_name).await?;
        if clash.is_some_and(|other| other.id != id) {
            return Err(ShopError::DuplicateCategory);
        }
        let new_slug = slugify(new_name);
        let slug_clash = categories.get_by_field("slug", new_slug.as_str()).await?;
        if slug_clash.is_some_and(|other| other.id != id) {
            return Err(ShopError::DuplicateCategory);
        }

        if new_name != existing.name {
            rename_products(store, &existing.name, new_name).await?;
        }
        patch.name = Some(new_name.to_owned());
        patch.slug = Some(new_slug);
    }

    categories
        .update(id, &patch)
        .await?
        .ok_or(ShopError::NotFound(Entity::Category))
}

/// Rewrites the category name on every product, one write per product. A failure part way leaves
/// the earlier products renamed.
async fn rename_products(store: &Store, old_name: &str, new_name: &str) -> Result<(), ShopError> {
    let products = Product::repository(store);
    let affected = products_in(store, old_name).await?;
    let patch = ProductPatch {
        category: Some(new_name.to_owned()),
        ..Default::default()
    };
    for (renamed, product) in affected.iter().enumerate() {
        if let Err(e) = products.update(&product.id, &patch).await {
            warn!(
                "Category rename from {old_name} to {new_name} stopped after {renamed} of {} products: {e}",
                affected.len()
            );
            return Err(e.into());
        }
    }
    info!(
        "Category rename from {old_name} to {new_name} updated {} products",
        affected.len()
    );
    Ok(())
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fake::{Fake, Faker};

    use super::*;
    use crate::domain::catalog::{CreateCategoryPayload, NewProduct, create_category};
    use crate::store::MemoryStore;

    async fn category(store: &Store, name: &str) -> Category {
        create_category(
            store,
            CreateCategoryPayload {
                name: Some(name.to_owned()),
                description: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn renaming_cascades_to_products() {
        let store: Store = Arc::new(MemoryStore::new());
        let toys = category(&store, "Toys").await;
        let product = NewProduct {
            category: "Toys".to_owned(),
            ..Faker.fake()
        }
        .insert(&store)
        .await
        .unwrap();

        let renamed = update_category(
            &store,
            &toys.id,
            UpdateCategoryPayload {
                name: Some("Toys & Games".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(renamed.name, "Toys & Games");
        assert_eq!(renamed.slug, "toys-games");
        let product = Product::find(&store, &product.id).await.unwrap();
        assert_eq!(product.category, "Toys & Games");
    }

    #[tokio::test]
    async fn renaming_onto_another_category_is_refused() {
        let store: Store = Arc::new(MemoryStore::new());
        let toys = category(&store, "Toys").await;
        category(&store, "Games").await;

        let result = update_category(
            &store,
            &toys.id,
            UpdateCategoryPayload {
                name: Some("Games".to_owned()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(ShopError::DuplicateCategory)));

        let same_name = update_category(
            &store,
            &toys.id,
            UpdateCategoryPayload {
                name: Some("Toys".to_owned()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!same_name.is_active);
    }
}
