//! Update and Delete Product slice

use axum::extract::{Path, State};
use tracing::info;

use crate::domain::auth::AdminUser;
use crate::domain::{Entity, ShopError};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{Product, ProductPatch};

//------------------------- Web API ----------------------------

pub async fn update_product_endpoint(
    State(store): State<Store>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Payload(patch): Payload<ProductPatch>,
) -> Result<ApiResponse<Product>, ClientError> {
    let product = update_product(&store, &id, &patch).await?;
    Ok(ApiResponse::new("Product updated successfully", product))
}

pub async fn delete_product_endpoint(
    State(store): State<Store>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ClientError> {
    delete_product(&store, &id).await?;
    Ok(ApiResponse::message("Product deleted successfully"))
}

//----------------------- Implementation --------------------------

pub async fn update_product(
    store: &Store,
    id: &str,
    patch: &ProductPatch,
) -> Result<Product, ShopError> {
    if patch.price.is_some_and(|price| price.is_sign_negative())
        || patch.stock.is_some_and(|stock| stock < 0)
    {
        return Err(ShopError::invalid("Price and stock must not be negative"));
    }
    Product::repository(store)
        .update(id, patch)
        .await?
        .ok_or(ShopError::NotFound(Entity::Product))
}

pub async fn delete_product(store: &Store, id: &str) -> Result<(), ShopError> {
    if !Product::repository(store).delete(id).await? {
        return Err(ShopError::NotFound(Entity::Product));
    }
    info!(product_id = id, "Product deleted");
    Ok(())
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fake::{Fake, Faker};
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::catalog::NewProduct;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn only_supplied_fields_change() {
        let store: Store = Arc::new(MemoryStore::new());
        let product = Faker.fake::<NewProduct>().insert(&store).await.unwrap();

        let updated = update_product(
            &store,
            &product.id,
            &ProductPatch {
                price: Some(Decimal::new(2500, 2)),
                set_trending: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.price, Decimal::new(2500, 2));
        assert!(updated.set_trending);
        assert_eq!(updated.name, product.name);
        assert_eq!(updated.stock, product.stock);
    }

    #[tokio::test]
    async fn missing_products_cannot_be_updated_or_deleted() {
        let store: Store = Arc::new(MemoryStore::new());
        let update = update_product(&store, "missing", &ProductPatch::default()).await;
        assert!(matches!(update, Err(ShopError::NotFound(Entity::Product))));
        let delete = delete_product(&store, "missing").await;
        assert!(matches!(delete, Err(ShopError::NotFound(Entity::Product))));
    }

    #[tokio::test]
    async fn deleted_products_are_gone() {
        let store: Store = Arc::new(MemoryStore::new());
        let product = Faker.fake::<NewProduct>().insert(&store).await.unwrap();

        delete_product(&store, &product.id).await.unwrap();

        assert!(matches!(
            Product::find(&store, &product.id).await,
            Err(ShopError::NotFound(Entity::Product))
        ));
    }
}
