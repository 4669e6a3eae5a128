//! Browse Categories slice: listing, lookups by id and slug, products of a category.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::domain::ShopError;
use crate::infra::{ApiResponse, ClientError};
use crate::store::{ListOptions, Store};

use super::{Category, Product, active_products_in, products_in};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCategoriesQuery {
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub include_product_count: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProductsQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryWithProducts {
    pub category: Category,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProducts {
    pub category: CategorySummary,
    pub products: Vec<Product>,
    pub total_products: usize,
}

pub async fn list_categories_endpoint(
    State(store): State<Store>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<ApiResponse<Vec<Category>>, ClientError> {
    let categories = list_categories(&store, &query).await?;
    Ok(ApiResponse::new("Categories retrieved successfully", categories))
}

pub async fn get_category_endpoint(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Category>, ClientError> {
    let category = Category::find(&store, &id).await?.with_live_count(&store).await?;
    Ok(ApiResponse::new("Category retrieved successfully", category))
}

pub async fn get_category_by_slug_endpoint(
    State(store): State<Store>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<CategoryWithProducts>, ClientError> {
    let result = category_by_slug(&store, &slug).await?;
    Ok(ApiResponse::new(
        "Category and products retrieved successfully",
        result,
    ))
}

pub async fn category_products_endpoint(
    State(store): State<Store>,
    Path(slug): Path<String>,
    Query(query): Query<CategoryProductsQuery>,
) -> Result<ApiResponse<CategoryProducts>, ClientError> {
    let result = category_products(&store, &slug, &query).await?;
    Ok(ApiResponse::new("Products retrieved successfully", result))
}

//----------------------- Implementation --------------------------

pub async fn list_categories(
    store: &Store,
    query: &ListCategoriesQuery,
) -> Result<Vec<Category>, ShopError> {
    let mut categories = Category::repository(store)
        .list(&ListOptions::default())
        .await?
        .items;
    if !query.include_inactive {
        categories.retain(|category| category.is_active);
    }
    if query.include_product_count {
        categories = futures::future::try_join_all(
            categories
                .into_iter()
                .map(|category| category.with_live_count(store)),
        )
        .await?;
    }
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
}

pub async fn category_by_slug(store: &Store, slug: &str) -> Result<CategoryWithProducts, ShopError> {
    let mut category = Category::find_by_slug(store, slug).await?;
    let products = active_products_in(store, &category.name).await?;
    category.product_count = products.len();
    Ok(CategoryWithProducts { category, products })
}

pub async fn category_products(
    store: &Store,
    slug: &str,
    query: &CategoryProductsQuery,
) -> Result<CategoryProducts, ShopError> {
    let category = Category::find_by_slug(store, slug).await?;
    let mut products = products_in(store, &category.name).await?;
    if !query.include_inactive {
        products.retain(|product| product.is_active);
    }
    // Stored in creation order.
    products.reverse();
    if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
        products.truncate(limit);
    }

    Ok(CategoryProducts {
        total_products: products.len(),
        category: CategorySummary {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
        },
        products,
    })
}

//-------------------------- Tests -------------------------------
