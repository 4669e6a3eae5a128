use axum::http::StatusCode;
use serde_json::{Value, json};
use serial_test::serial;

use crate::test_utils::start_test_server;

#[tokio::test]
#[serial]
async fn products_are_public_to_read_but_admin_only_to_write() {
    let app = start_test_server().await;
    let admin = app.register_admin("admin@example.com").await;
    let (_, customer) = app.register("shopper@example.com").await;
    let product_id = app.create_product(&admin, 12.5, 4).await;

    let listed = app
        .client()
        .do_get("/api/products?includeTotal=true")
        .await
        .expect("Listing should succeed.");
    let body = listed.json_body().expect("Listing should be JSON.");
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], product_id.as_str());

    let new_product = json!({
        "name": "Lamp", "description": "Bright", "price": 20, "stock": 1, "category": "Lighting"
    });
    let anonymous = app
        .http
        .post(app.url("/api/products"))
        .json(&new_product)
        .send()
        .await
        .expect("Request should be sent.");
    assert_eq!(anonymous.status(), reqwest::StatusCode::UNAUTHORIZED);

    let forbidden = app
        .http
        .post(app.url("/api/products"))
        .bearer_auth(&customer)
        .json(&new_product)
        .send()
        .await
        .expect("Request should be sent.");
    assert_eq!(forbidden.status(), reqwest::StatusCode::FORBIDDEN);
    let body: Value = forbidden.json().await.expect("Error should be JSON.");
    assert_eq!(body["message"], "Insufficient permissions");
}

#[tokio::test]
#[serial]
async fn renaming_a_category_moves_its_products() {
    let app = start_test_server().await;
    let admin = app.register_admin("admin@example.com").await;
    app.create_product(&admin, 8.0, 3).await;

    let created: Value = app
        .http
        .post(app.url("/api/categories"))
        .bearer_auth(&admin)
        .json(&json!({"name": "Kitchen", "description": "Cook and serve"}))
        .send()
        .await
        .expect("Request should be sent.")
        .json()
        .await
        .expect("Category should be JSON.");
    let category_id = created["data"]["id"].as_str().expect("Category id.").to_owned();

    let renamed = app
        .http
        .put(app.url(&format!("/api/categories/{category_id}")))
        .bearer_auth(&admin)
        .json(&json!({"name": "Kitchen & Dining"}))
        .send()
        .await
        .expect("Request should be sent.");
    assert_eq!(renamed.status(), reqwest::StatusCode::OK);

    let res = app
        .client()
        .do_get("/api/categories/slug/kitchen-dining/products")
        .await
        .expect("Category products should load.");
    let body = res.json_body().expect("Category products should be JSON.");
    assert_eq!(body["data"]["totalProducts"], 1);
    assert_eq!(body["data"]["products"][0]["category"], "Kitchen & Dining");

    let refused = app
        .http
        .delete(app.url(&format!("/api/categories/{category_id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Request should be sent.");
    assert_eq!(refused.status(), reqwest::StatusCode::CONFLICT);
}
