//! Delete Category slice

use axum::extract::{Path, State};
use tracing::info;

use crate::domain::ShopError;
use crate::domain::auth::AdminUser;
use crate::infra::{ApiResponse, ClientError};
use crate::store::Store;

use super::{Category, active_products_in};

//------------------------- Web API ----------------------------

pub async fn delete_category_endpoint(
    State(store): State<Store>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ClientError> {
    delete_category(&store, &id).await?;
    Ok(ApiResponse::message("Category deleted successfully"))
}

//----------------------- Implementation --------------------------

/// Refused while any active product still references the category.
pub async fn delete_category(store: &Store, id: &str) -> Result<(), ShopError> {
    let category = Category::find(store, id).await?;
    let in_use = active_products_in(store, &category.name).await?.len();
    if in_use > 0 {
        return Err(ShopError::CategoryInUse(in_use));
    }
    Category::repository(store).delete(id).await?;
    info!(category = %category.name, "Category deleted");
    Ok(())
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fake::{Fake, Faker};

    use super::*;
    use crate::domain::Entity;
    use crate::domain::catalog::{CreateCategoryPayload, NewProduct, create_category};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn categories_with_active_products_cannot_be_deleted() {
        let store: Store = Arc::new(MemoryStore::new());
        let toys = create_category(
            &store,
            CreateCategoryPayload {
                name: Some("Toys".to_owned()),
                description: None,
            },
        )
        .await
        .unwrap();
        NewProduct {
            category: "Toys".to_owned(),
            ..Faker.fake()
        }
        .insert(&store)
        .await
        .unwrap();

        let result = delete_category(&store, &toys.id).await;
        assert!(matches!(result, Err(ShopError::CategoryInUse(1))));
    }

    #[tokio::test]
    async fn unused_categories_are_deleted() {
        let store: Store = Arc::new(MemoryStore::new());
        let toys = create_category(
            &store,
            CreateCategoryPayload {
                name: Some("Toys".to_owned()),
                description: None,
            },
        )
        .await
        .unwrap();

        delete_category(&store, &toys.id).await.unwrap();

        assert!(matches!(
            Category::find(&store, &toys.id).await,
            Err(ShopError::NotFound(Entity::Category))
        ));
    }
}
