//! Browse Orders slice: a user's order history, order details and public tracking.

use std::cmp::Reverse;

use axum::extract::{Path, Query, State};
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ShopError;
use crate::domain::auth::AuthUser;
use crate::infra::{ApiResponse, ClientError};
use crate::store::Store;

use super::{Order, OrderStatus, PaymentStatus};

const DEFAULT_ORDER_LIMIT: usize = 10;

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserOrdersQuery {
    pub limit: Option<usize>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub order_id: String,
    pub date: Option<Timestamp>,
    pub total: Decimal,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub item_count: usize,
    pub first_item_image: Option<String>,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        OrderSummary {
            item_count: order.items.len(),
            first_item_image: order
                .items
                .into_iter()
                .next()
                .and_then(|item| item.images.into_iter().next()),
            id: order.id,
            order_id: order.order_id,
            date: order.created_at,
            total: order.total,
            order_status: order.order_status,
            payment_status: order.payment_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingLocation {
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub order_id: String,
    pub order_status: OrderStatus,
    pub tracking_number: Option<String>,
    pub created_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub shipping_address: TrackingLocation,
}

impl From<Order> for TrackingInfo {
    fn from(order: Order) -> Self {
        TrackingInfo {
            order_id: order.order_id,
            order_status: order.order_status,
            tracking_number: order.tracking_number,
            created_at: order.created_at,
            delivered_at: order.delivered_at,
            shipping_address: TrackingLocation {
                city: order.shipping_address.city,
                country: order.shipping_address.country,
            },
        }
    }
}

pub async fn user_orders_endpoint(
    State(store): State<Store>,
    _user: AuthUser,
    Path(user_id): Path<String>,
    Query(query): Query<UserOrdersQuery>,
) -> Result<ApiResponse<Vec<OrderSummary>>, ClientError> {
    let orders = user_orders(&store, &user_id, query).await?;
    Ok(ApiResponse::new("Orders retrieved successfully", orders))
}

pub async fn get_order_endpoint(
    State(store): State<Store>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Order>, ClientError> {
    let order = Order::find(&store, &id).await?;
    Ok(ApiResponse::new("Order retrieved successfully", order))
}

pub async fn track_order_endpoint(
    State(store): State<Store>,
    Path(order_id): Path<String>,
) -> Result<ApiResponse<TrackingInfo>, ClientError> {
    let tracking = track_order(&store, &order_id).await?;
    Ok(ApiResponse::new("Order tracking info retrieved", tracking))
}

//----------------------- Implementation --------------------------

/// Newest first, optionally only those with the given status.
pub async fn user_orders(
    store: &Store,
    user_id: &str,
    query: UserOrdersQuery,
) -> Result<Vec<OrderSummary>, ShopError> {
    let mut orders = Order::repository(store)
        .find_many_by_field("userId", user_id)
        .await?;
    if let Some(status) = query.status {
        orders.retain(|order| order.order_status == status);
    }
    orders.sort_by_key(|order| Reverse(order.created_at));
    orders.truncate(query.limit.unwrap_or(DEFAULT_ORDER_LIMIT));
    Ok(orders.into_iter().map(OrderSummary::from).collect())
}

pub async fn track_order(store: &Store, order_id: &str) -> Result<TrackingInfo, ShopError> {
    Ok(Order::find_by_order_id(store, order_id).await?.into())
}

//-------------------------- Tests -------------------------------
