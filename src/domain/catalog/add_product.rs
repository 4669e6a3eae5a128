//! Add Product slice

use axum::extract::State;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::domain::auth::AdminUser;
use crate::domain::{ShopError, non_blank};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{NewProduct, Product};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub set_trending: Option<bool>,
    pub is_active: Option<bool>,
}

pub async fn add_product_endpoint(
    State(store): State<Store>,
    _admin: AdminUser,
    Payload(payload): Payload<AddProductPayload>,
) -> Result<ApiResponse<Product>, ClientError> {
    let product = add_product(&store, payload).await?;
    Ok(ApiResponse::new("Product created successfully", product))
}

//----------------------- Implementation --------------------------

impl TryFrom<AddProductPayload> for NewProduct {
    type Error = ShopError;

    fn try_from(payload: AddProductPayload) -> Result<Self, Self::Error> {
        let (Some(name), Some(description), Some(price), Some(stock), Some(category)) = (
            non_blank(payload.name),
            non_blank(payload.description),
            payload.price,
            payload.stock,
            non_blank(payload.category),
        ) else {
            return Err(ShopError::invalid("Missing required fields"));
        };
        if price.is_sign_negative() || stock < 0 {
            return Err(ShopError::invalid("Price and stock must not be negative"));
        }

        Ok(NewProduct {
            name,
            description,
            price,
            stock,
            category,
            images: payload.images.unwrap_or_default(),
            set_trending: payload.set_trending.unwrap_or(false),
            is_active: payload.is_active.unwrap_or(true),
        })
    }
}

pub async fn add_product(store: &Store, payload: AddProductPayload) -> Result<Product, ShopError> {
    let new_product = NewProduct::try_from(payload)?;
    let product = new_product.insert(store).await?;
    info!(product_id = %product.id, "Product created");
    Ok(product)
}

//-------------------------- Tests -------------------------------
