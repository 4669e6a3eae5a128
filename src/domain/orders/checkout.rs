//! Checkout slice: validates the requested items, reserves stock and records the order.

use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::auth::AuthUser;
use crate::domain::cart::Cart;
use crate::domain::catalog::Product;
use crate::domain::{ShopError, non_blank};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::{AdjustOutcome, CounterAdjustment, Store};

use super::{
    Address, NewOrder, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Quote,
    generate_order_id,
};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub user_id: Option<String>,
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub id: String,
    pub order_id: String,
    pub total: Decimal,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

pub async fn checkout_endpoint(
    State(store): State<Store>,
    _user: AuthUser,
    Payload(payload): Payload<CheckoutPayload>,
) -> Result<ApiResponse<CheckoutReceipt>, ClientError> {
    let receipt = checkout(&store, payload).await?;
    Ok(ApiResponse::new("Order created successfully", receipt))
}

//----------------------- Implementation --------------------------

/// Snapshots each requested product, checking it exists, is on sale and has enough stock.
/// Stops at the first failing item.
async fn order_items(store: &Store, items: &[CheckoutItem]) -> Result<Vec<OrderItem>, ShopError> {
    let products = Product::repository(store);
    let mut order_items = Vec::with_capacity(items.len());
    for item in items {
        let product = products
            .get_by_id(&item.product_id)
            .await?
            .ok_or_else(|| ShopError::CheckoutProductNotFound(item.product_id.clone()))?;
        if !product.is_active {
            return Err(ShopError::CheckoutProductUnavailable(product.name));
        }
        if product.stock < item.quantity {
            return Err(ShopError::InsufficientStockFor {
                name: product.name,
                available: product.stock,
            });
        }
        order_items.push(OrderItem {
            total: product.price * Decimal::from(item.quantity),
            product_id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: item.quantity,
            images: product.images,
        });
    }
    Ok(order_items)
}

fn stock_changes(items: &[OrderItem], sign: i64) -> Vec<CounterAdjustment> {
    items
        .iter()
        .map(|item| CounterAdjustment::new(&item.product_id, sign * item.quantity))
        .collect()
}

/// Takes the ordered quantities out of stock in one all-or-nothing step.
async fn reserve_stock(store: &Store, items: &[OrderItem]) -> Result<(), ShopError> {
    let outcome = Product::repository(store)
        .adjust_counters("stock", &stock_changes(items, -1))
        .await?;
    match outcome {
        AdjustOutcome::Applied => Ok(()),
        AdjustOutcome::Rejected { id, current } => {
            let name = items
                .iter()
                .find(|item| item.product_id == id)
                .map(|item| item.name.clone())
                .unwrap_or(id);
            Err(ShopError::InsufficientStockFor {
                name,
                available: current,
            })
        }
    }
}

/// Puts the quantities back after a failed checkout. Failures are logged only.
async fn release_stock(store: &Store, items: &[OrderItem]) {
    if let Err(e) = Product::repository(store)
        .adjust_counters("stock", &stock_changes(items, 1))
        .await
    {
        warn!("Could not release reserved stock: {e:?}");
    }
}

pub async fn checkout(store: &Store, payload: CheckoutPayload) -> Result<CheckoutReceipt, ShopError> {
    let (Some(user_id), false, Some(billing_address), Some(payment_method)) = (
        non_blank(payload.user_id),
        payload.items.is_empty(),
        payload.billing_address,
        payload.payment_method,
    ) else {
        return Err(ShopError::invalid("Missing required checkout information"));
    };
    if payload.items.iter().any(|item| item.quantity < 1) {
        return Err(ShopError::invalid("Quantity must be at least 1"));
    }

    let items = order_items(store, &payload.items).await?;
    let subtotal: Decimal = items.iter().map(|item| item.total).sum();
    let quote = Quote::new(subtotal, &billing_address.country);

    reserve_stock(store, &items).await?;

    let new_order = NewOrder {
        order_id: generate_order_id(),
        user_id,
        subtotal: quote.subtotal,
        shipping: quote.shipping,
        tax: quote.tax,
        total: quote.total,
        shipping_address: payload
            .shipping_address
            .unwrap_or_else(|| billing_address.clone()),
        billing_address,
        payment_method,
        payment_status: PaymentStatus::Pending,
        order_status: OrderStatus::Pending,
        items,
    };
    let order = match Order::repository(store).create(&new_order).await {
        Ok(order) => order,
        Err(e) => {
            release_stock(store, &new_order.items).await;
            return Err(e.into());
        }
    };
    info!(order_id = %order.order_id, user_id = %order.user_id, total = %order.total, "Order created");

    if let Err(e) = Cart::clear_for_user(store, &order.user_id).await {
        warn!(user_id = %order.user_id, "Could not clear cart after checkout: {e:?}");
    }

    Ok(CheckoutReceipt {
        id: order.id,
        order_id: order.order_id,
        total: order.total,
        order_status: order.order_status,
        payment_status: order.payment_status,
    })
}

//-------------------------- Tests -------------------------------
