//! Create Category slice

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ShopError;
use crate::domain::auth::AdminUser;
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{Category, slugify};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCategoryPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn create_category_endpoint(
    State(store): State<Store>,
    _admin: AdminUser,
    Payload(payload): Payload<CreateCategoryPayload>,
) -> Result<ApiResponse<Category>, ClientError> {
    let category = create_category(&store, payload).await?;
    Ok(ApiResponse::new("Category created successfully", category))
}

//----------------------- Implementation --------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCategory<'a> {
    name: &'a str,
    slug: &'a str,
    description: &'a str,
    is_active: bool,
    product_count: usize,
}

pub async fn create_category(
    store: &Store,
    payload: CreateCategoryPayload,
) -> Result<Category, ShopError> {
    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ShopError::invalid("Category name is required"));
    }
    let slug = slugify(name);

    let categories = Category::repository(store);
    if categories.get_by_field("name", name).await?.is_some()
        || categories.get_by_field("slug", slug.as_str()).await?.is_some()
    {
        return Err(ShopError::DuplicateCategory);
    }

    let category = categories
        .create(&NewCategory {
            name,
            slug: &slug,
            description: payload.description.as_deref().map(str::trim).unwrap_or_default(),
            is_active: true,
            product_count: 0,
        })
        .await?;
    info!(category = %category.name, slug = %category.slug, "Category created");
    Ok(category)
}

//-------------------------- Tests -------------------------------
