//! Update Order Status slice

use axum::extract::{Path, State};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::auth::AdminUser;
use crate::domain::{Entity, ShopError};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{Order, OrderStatus, PaymentStatus};

//------------------------- Web API ----------------------------

/// Fields left out are not changed. Any status may follow any other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

pub async fn update_order_status_endpoint(
    State(store): State<Store>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Payload(patch): Payload<OrderStatusPatch>,
) -> Result<ApiResponse<Order>, ClientError> {
    let order = update_order_status(&store, &id, patch).await?;
    Ok(ApiResponse::new("Order updated successfully", order))
}

//----------------------- Implementation --------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredStatusPatch {
    #[serde(flatten)]
    patch: OrderStatusPatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivered_at: Option<Timestamp>,
}

pub async fn update_order_status(
    store: &Store,
    id: &str,
    patch: OrderStatusPatch,
) -> Result<Order, ShopError> {
    let delivered_at =
        (patch.order_status == Some(OrderStatus::Delivered)).then(Timestamp::now);
    let order = Order::repository(store)
        .update(
            id,
            &StoredStatusPatch {
                patch,
                delivered_at,
            },
        )
        .await?
        .ok_or(ShopError::NotFound(Entity::Order))?;
    info!(
        order_id = %order.order_id,
        order_status = %order.order_status,
        payment_status = %order.payment_status,
        "Order status updated"
    );
    Ok(order)
}

//-------------------------- Tests -------------------------------
