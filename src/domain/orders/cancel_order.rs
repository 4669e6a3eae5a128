//! Cancel Order slice

use axum::{
    body::Bytes,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::auth::AuthUser;
use crate::domain::catalog::Product;
use crate::domain::{Entity, ShopError, non_blank};
use crate::infra::{ApiResponse, ClientError};
use crate::store::{CounterAdjustment, Store};

use super::{Order, OrderStatus, PaymentStatus};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderPayload {
    pub reason: Option<String>,
}

/// The body is optional; an empty body cancels without a reason.
pub async fn cancel_order_endpoint(
    State(store): State<Store>,
    _user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ApiResponse<Order>, ClientError> {
    let payload = if body.is_empty() {
        CancelOrderPayload::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ClientError::Payload(e.to_string()))?
    };
    let order = cancel_order(&store, &id, payload).await?;
    Ok(ApiResponse::new("Order cancelled successfully", order))
}

//----------------------- Implementation --------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Cancellation {
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancellation_reason: Option<String>,
}

pub async fn cancel_order(
    store: &Store,
    id: &str,
    payload: CancelOrderPayload,
) -> Result<Order, ShopError> {
    let orders = Order::repository(store);
    let order = Order::find(store, id).await?;
    if !order.order_status.is_cancellable() {
        return Err(ShopError::CannotCancel(order.order_status));
    }

    let cancellation = Cancellation {
        order_status: OrderStatus::Cancelled,
        payment_status: match order.payment_status {
            PaymentStatus::Completed => PaymentStatus::Refunded,
            _ => PaymentStatus::Failed,
        },
        cancellation_reason: non_blank(payload.reason),
    };
    // Only the request that moves the order out of its current status restores stock.
    let Some(cancelled) = orders
        .update_if(id, "orderStatus", order.order_status.to_string(), &cancellation)
        .await?
    else {
        let current = Order::find(store, id).await?;
        return Err(if current.order_status.is_cancellable() {
            ShopError::ConcurrentUpdate(Entity::Order)
        } else {
            ShopError::CannotCancel(current.order_status)
        });
    };

    let restock: Vec<CounterAdjustment> = cancelled
        .items
        .iter()
        .map(|item| CounterAdjustment::new(&item.product_id, item.quantity))
        .collect();
    if let Err(e) = Product::repository(store)
        .adjust_counters("stock", &restock)
        .await
    {
        warn!(order_id = %cancelled.order_id, "Could not restore stock for cancelled order: {e:?}");
    }
    info!(order_id = %cancelled.order_id, "Order cancelled");
    Ok(cancelled)
}

//-------------------------- Tests -------------------------------
