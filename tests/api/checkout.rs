use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Value, json};
use serial_test::serial;
use shop_server::domain::catalog::Product;

use crate::test_utils::{TestApp, start_test_server};

async fn stock_of(app: &TestApp, product_id: &str) -> i64 {
    Product::find(&app.state.store, product_id)
        .await
        .expect("Product should exist.")
        .stock
}

fn decimal(value: &Value) -> Decimal {
    assert!(value.is_number(), "Amounts are JSON numbers, got {value}.");
    Decimal::from_str(&value.to_string()).expect("Amount should parse.")
}

#[tokio::test]
#[serial]
async fn a_cart_checks_out_into_a_cancellable_order() {
    let app = start_test_server().await;
    let admin = app.register_admin("admin@example.com").await;
    let (uid, token) = app.register("shopper@example.com").await;
    let product_id = app.create_product(&admin, 40.0, 5).await;

    let added = app
        .client()
        .do_post(
            "/api/cart/add",
            json!({"userId": uid, "productId": product_id}),
        )
        .await
        .expect("Add to cart should complete.");
    let cart = added.json_body().expect("Cart should be JSON.");
    assert_eq!(cart["data"]["itemCount"], 1);
    assert_eq!(decimal(&cart["data"]["totalAmount"]), Decimal::from(40));

    let checkout: Value = app
        .http
        .post(app.url("/api/orders/checkout"))
        .bearer_auth(&token)
        .json(&json!({
            "userId": uid,
            "items": [{"productId": product_id, "quantity": 1}],
            "billingAddress": {
                "street": "1 Main St",
                "city": "Springfield",
                "postalCode": "12345",
                "country": "US"
            },
            "paymentMethod": "credit_card"
        }))
        .send()
        .await
        .expect("Checkout should be sent.")
        .json()
        .await
        .expect("Checkout should be JSON.");
    assert_eq!(checkout["message"], "Order created successfully");
    assert_eq!(decimal(&checkout["data"]["total"]), Decimal::new(5320, 2));
    assert_eq!(checkout["data"]["orderStatus"], "pending");
    assert_eq!(stock_of(&app, &product_id).await, 4);

    let cart = app
        .client()
        .do_get(&format!("/api/cart/{uid}"))
        .await
        .expect("Cart should load.")
        .json_body()
        .expect("Cart should be JSON.");
    assert_eq!(cart["data"]["itemCount"], 0);

    let order_id = checkout["data"]["orderId"].as_str().expect("orderId.");
    let tracking = app
        .client()
        .do_get(&format!("/api/orders/track/{order_id}"))
        .await
        .expect("Tracking should load.")
        .json_body()
        .expect("Tracking should be JSON.");
    assert_eq!(tracking["data"]["shippingAddress"]["city"], "Springfield");

    let id = checkout["data"]["id"].as_str().expect("id.");
    let cancelled: Value = app
        .http
        .put(app.url(&format!("/api/orders/{id}/cancel")))
        .bearer_auth(&token)
        .json(&json!({"reason": "Ordered by mistake"}))
        .send()
        .await
        .expect("Cancel should be sent.")
        .json()
        .await
        .expect("Cancel should be JSON.");
    assert_eq!(cancelled["data"]["orderStatus"], "cancelled");
    assert_eq!(cancelled["data"]["cancellationReason"], "Ordered by mistake");
    assert_eq!(stock_of(&app, &product_id).await, 5);
}

#[tokio::test]
#[serial]
async fn checkout_needs_a_bearer_token_and_enough_stock() {
    let app = start_test_server().await;
    let admin = app.register_admin("admin@example.com").await;
    let (uid, token) = app.register("shopper@example.com").await;
    let product_id = app.create_product(&admin, 5.0, 1).await;
    let request = json!({
        "userId": uid,
        "items": [{"productId": product_id, "quantity": 2}],
        "billingAddress": {
            "street": "1 Main St",
            "city": "Springfield",
            "postalCode": "12345",
            "country": "US"
        },
        "paymentMethod": "paypal"
    });

    let anonymous = app
        .http
        .post(app.url("/api/orders/checkout"))
        .json(&request)
        .send()
        .await
        .expect("Checkout should be sent.");
    assert_eq!(anonymous.status(), reqwest::StatusCode::UNAUTHORIZED);

    let short = app
        .http
        .post(app.url("/api/orders/checkout"))
        .bearer_auth(&token)
        .json(&request)
        .send()
        .await
        .expect("Checkout should be sent.");
    assert_eq!(short.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = short.json().await.expect("Error should be JSON.");
    assert_eq!(body["message"], "Insufficient stock for Enamel Mug. Available: 1");
    assert_eq!(stock_of(&app, &product_id).await, 1);
}
