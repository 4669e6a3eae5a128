//! Browse Products slice: listing, single product and related products.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::domain::ShopError;
use crate::infra::{ApiResponse, ClientError};
use crate::store::{ListOptions, Page, Store};

use super::Product;

const DEFAULT_RELATED_LIMIT: usize = 4;
const MAX_PAGE_SIZE: usize = 100;

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    pub limit: Option<usize>,
    pub page_token: Option<String>,
    #[serde(default)]
    pub include_total: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedProductsQuery {
    pub limit: Option<usize>,
}

pub async fn list_products_endpoint(
    State(store): State<Store>,
    Query(query): Query<ListProductsQuery>,
) -> Result<ApiResponse<Page<Product>>, ClientError> {
    let page = list_products(&store, &query.into()).await?;
    Ok(ApiResponse::new("Products retrieved successfully", page))
}

pub async fn get_product_endpoint(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Product>, ClientError> {
    let product = Product::find(&store, &id).await?;
    Ok(ApiResponse::new("Product retrieved successfully", product))
}

pub async fn related_products_endpoint(
    State(store): State<Store>,
    Path(id): Path<String>,
    Query(query): Query<RelatedProductsQuery>,
) -> Result<ApiResponse<Vec<Product>>, ClientError> {
    let limit = query.limit.unwrap_or(DEFAULT_RELATED_LIMIT).min(MAX_PAGE_SIZE);
    let related = related_products(&store, &id, limit).await?;
    Ok(ApiResponse::new(
        "Related products retrieved successfully",
        related,
    ))
}

//----------------------- Implementation --------------------------

impl From<ListProductsQuery> for ListOptions {
    fn from(query: ListProductsQuery) -> Self {
        ListOptions {
            limit: query
                .limit
                .filter(|limit| *limit > 0)
                .map(|limit| limit.min(MAX_PAGE_SIZE)),
            page_token: query.page_token,
            include_total: query.include_total,
        }
    }
}

pub async fn list_products(
    store: &Store,
    options: &ListOptions,
) -> Result<Page<Product>, ShopError> {
    Ok(Product::repository(store).list(options).await?)
}

/// Up to `limit` active products related to `id`: same category first, then trending, then any.
pub async fn related_products(
    store: &Store,
    id: &str,
    limit: usize,
) -> Result<Vec<Product>, ShopError> {
    let current = Product::find(store, id).await?;
    let products = Product::repository(store);

    let mut related: Vec<Product> = Vec::new();
    let mut seen: HashSet<String> = HashSet::from([current.id.clone()]);
    let mut take_from = |candidates: Vec<Product>, related: &mut Vec<Product>| {
        for product in candidates {
            if related.len() >= limit {
                break;
            }
            if product.is_active && seen.insert(product.id.clone()) {
                related.push(product);
            }
        }
    };

    take_from(
        products
            .find_many_by_field("category", current.category.as_str())
            .await?,
        &mut related,
    );
    if related.len() < limit {
        take_from(
            products.find_many_by_field("setTrending", true).await?,
            &mut related,
        );
    }
    if related.len() < limit {
        take_from(
            products.find_many_by_field("isActive", true).await?,
            &mut related,
        );
    }
    Ok(related)
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fake::{Fake, Faker};

    use super::*;
    use crate::domain::Entity;
    use crate::domain::catalog::NewProduct;
    use crate::store::MemoryStore;

    async fn insert(store: &Store, product: NewProduct) -> Product {
        product.insert(store).await.unwrap()
    }

    #[tokio::test]
    async fn related_products_prefer_category_then_trending_then_any() {
        let store: Store = Arc::new(MemoryStore::new());
        let lamp = insert(
            &store,
            NewProduct {
                category: "Lighting".to_owned(),
                ..Faker.fake()
            },
        )
        .await;
        let same_category = insert(
            &store,
            NewProduct {
                category: "Lighting".to_owned(),
                ..Faker.fake()
            },
        )
        .await;
        insert(
            &store,
            NewProduct {
                category: "Lighting".to_owned(),
                is_active: false,
                ..Faker.fake()
            },
        )
        .await;
        let trending = insert(
            &store,
            NewProduct {
                category: "Desks".to_owned(),
                set_trending: true,
                ..Faker.fake()
            },
        )
        .await;
        let other = insert(
            &store,
            NewProduct {
                category: "Chairs".to_owned(),
                ..Faker.fake()
            },
        )
        .await;

        let related = related_products(&store, &lamp.id, 4).await.unwrap();
        let ids: Vec<&str> = related.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![same_category.id.as_str(), trending.id.as_str(), other.id.as_str()]);

        let limited = related_products(&store, &lamp.id, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, same_category.id);
    }

    #[tokio::test]
    async fn related_products_of_a_missing_product_is_not_found() {
        let store: Store = Arc::new(MemoryStore::new());
        let result = related_products(&store, "missing", 4).await;
        assert!(matches!(result, Err(ShopError::NotFound(Entity::Product))));
    }

    #[tokio::test]
    async fn listing_pages_through_products_newest_first() {
        let store: Store = Arc::new(MemoryStore::new());
        let mut created = Vec::new();
        for _ in 0..3 {
            created.push(insert(&store, Faker.fake()).await);
        }

        let page = list_products(
            &store,
            &ListOptions {
                limit: Some(2),
                include_total: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(page.total, Some(3));
        assert_eq!(page.items[0].id, created[2].id);
        assert_eq!(page.next_page_token.as_deref(), Some(created[1].id.as_str()));
    }

    #[test]
    fn page_sizes_are_capped() {
        let options = ListOptions::from(ListProductsQuery {
            limit: Some(usize::MAX),
            ..Default::default()
        });
        assert_eq!(options.limit, Some(MAX_PAGE_SIZE));

        let unlimited = ListOptions::from(ListProductsQuery {
            limit: Some(0),
            ..Default::default()
        });
        assert_eq!(unlimited.limit, None);
    }
}
