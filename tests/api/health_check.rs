use axum::http::StatusCode;
use serial_test::serial;

use crate::test_utils::{start_test_server, start_test_server_with};

#[tokio::test]
#[serial]
async fn the_webserver_responds_to_a_simple_get_request() {
    let app = start_test_server().await;

    let res = app
        .client()
        .do_get("/healthcheck")
        .await
        .expect("Health check should succeed.");

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn the_banner_lists_the_api_areas() {
    let app = start_test_server().await;

    let res = app.client().do_get("/").await.expect("Banner should load.");
    let body = res.json_body().expect("Banner should be JSON.");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["endpoints"]["orders"], "/api/orders");
}

#[tokio::test]
#[serial]
async fn unknown_routes_get_an_error_envelope() {
    let app = start_test_server().await;

    let res = app
        .client()
        .do_get("/api/nothing-here")
        .await
        .expect("Request should complete.");
    let body = res.json_body().expect("Error should be JSON.");

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route /api/nothing-here not found");
}

#[tokio::test]
#[serial]
async fn requests_over_the_limit_are_throttled() {
    let app = start_test_server_with(|settings| {
        settings.rate_limit.enabled = true;
        settings.rate_limit.max_requests = 1;
    })
    .await;

    let first = app
        .client()
        .do_get("/healthcheck")
        .await
        .expect("First request should complete.");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .client()
        .do_get("/healthcheck")
        .await
        .expect("Second request should complete.");
    let body = second.json_body().expect("Error should be JSON.");

    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Too many requests");
}
