use std::net::SocketAddr;

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    http::Uri,
    middleware,
    routing::{delete, get, post, put},
};
use futures::FutureExt;
use serde_json::{Value, json};
use tokio::{net::TcpListener, select};
use tokio_graceful_shutdown::{IntoSubsystem, SubsystemHandle};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::domain::{auth, cart, catalog, orders, reviews, wishlist};
use crate::AppState;
use crate::infra::{ApiResponse, ClientError, Settings, rate_limit};

pub struct WebServer {
    state: AppState,
    listener: TcpListener,
}

impl WebServer {
    pub fn new(state: AppState, listener: TcpListener) -> Self {
        Self { state, listener }
    }
}

/// Binds the configured address. Port 0 picks a free port, see [`TcpListener::local_addr`].
pub async fn bind_listener(settings: &Settings) -> anyhow::Result<TcpListener> {
    let address = settings.application.address();
    let socket_addr: SocketAddr = address.parse()
        .inspect_err(|e| error!("Could not parse server address {address}.\nCheck application host and port in configuration settings.\nFailed with {e}"))?;
    let listener = TcpListener::bind(socket_addr)
        .await
        .inspect_err(|e| error!("Could not bind socket address {socket_addr}. Failed with {e}"))?;
    Ok(listener)
}

pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register_endpoint))
        .route("/login", post(auth::login_endpoint))
        .route("/user/{uid}", put(auth::update_user_endpoint));

    let product_routes = Router::new()
        .route(
            "/",
            get(catalog::list_products_endpoint).post(catalog::add_product_endpoint),
        )
        .route(
            "/{id}",
            get(catalog::get_product_endpoint)
                .put(catalog::update_product_endpoint)
                .delete(catalog::delete_product_endpoint),
        )
        .route("/{id}/related", get(catalog::related_products_endpoint));

    let category_routes = Router::new()
        .route(
            "/",
            get(catalog::list_categories_endpoint).post(catalog::create_category_endpoint),
        )
        .route(
            "/{id}",
            get(catalog::get_category_endpoint)
                .put(catalog::update_category_endpoint)
                .delete(catalog::delete_category_endpoint),
        )
        .route("/slug/{slug}", get(catalog::get_category_by_slug_endpoint))
        .route(
            "/slug/{slug}/products",
            get(catalog::category_products_endpoint),
        );

    let review_routes = Router::new()
        .route("/", post(reviews::add_review_endpoint))
        .route(
            "/product/{product_id}",
            get(reviews::product_reviews_endpoint),
        )
        .route("/{id}", get(reviews::get_review_endpoint))
        .route("/{id}/helpful", post(reviews::mark_helpful_endpoint));

    let cart_routes = Router::new()
        .route("/add", post(cart::add_item_endpoint))
        .route("/update", put(cart::update_item_endpoint))
        .route("/{user_id}", get(cart::get_cart_endpoint))
        .route(
            "/{user_id}/item/{product_id}",
            delete(cart::remove_item_endpoint),
        )
        .route(
            "/{user_id}/clear",
            delete(cart::clear_cart_endpoint),
        );

    let wishlist_routes = Router::new()
        .route("/add", post(wishlist::add_to_wishlist_endpoint))
        .route("/{user_id}", get(wishlist::get_wishlist_endpoint))
        .route(
            "/{user_id}/item/{product_id}",
            delete(wishlist::remove_from_wishlist_endpoint),
        )
        .route(
            "/{user_id}/clear",
            delete(wishlist::clear_wishlist_endpoint),
        )
        .route(
            "/{user_id}/status/{product_id}",
            get(wishlist::wishlist_status_endpoint),
        );

    let order_routes = Router::new()
        .route("/checkout", post(orders::checkout_endpoint))
        .route("/user/{user_id}", get(orders::user_orders_endpoint))
        .route("/track/{order_id}", get(orders::track_order_endpoint))
        .route("/{id}", get(orders::get_order_endpoint))
        .route("/{id}/cancel", put(orders::cancel_order_endpoint))
        .route("/{id}/status", put(orders::update_order_status_endpoint));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/products", product_routes)
        .nest("/categories", category_routes)
        .nest("/reviews", review_routes)
        .nest("/cart", cart_routes)
        .nest("/wishlist", wishlist_routes)
        .nest("/orders", order_routes);

    Router::new()
        .route("/", get(banner_endpoint))
        .route("/healthcheck", get(health_check_endpoint))
        .nest("/api", api)
        .fallback(not_found_endpoint)
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[async_trait]
impl IntoSubsystem<anyhow::Error> for WebServer {
    async fn run(self, subsys: SubsystemHandle) -> Result<(), anyhow::Error> {
        let socket_addr = self.listener.local_addr()?;
        let router = build_router(self.state);

        info!("Web server starting on http://{socket_addr}");
        select!(
            result = axum::serve(self.listener, router.into_make_service_with_connect_info::<SocketAddr>()).into_future().map(|result| result.map_err(anyhow::Error::new)) => {
                error!("Web server completed with {result:?}");
            }
            _ = subsys.on_shutdown_requested() => {
                info!("Web server shutdown");
            }
        );
        Ok(())
    }
}

pub async fn banner_endpoint(State(settings): State<Settings>) -> ApiResponse<Value> {
    ApiResponse::new(
        "Shop server is running",
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "environment": settings.environment,
            "endpoints": {
                "auth": "/api/auth",
                "products": "/api/products",
                "categories": "/api/categories",
                "reviews": "/api/reviews",
                "cart": "/api/cart",
                "wishlist": "/api/wishlist",
                "orders": "/api/orders",
                "health": "/healthcheck",
            }
        }),
    )
}

pub async fn health_check_endpoint() -> Result<Json<String>, ClientError> {
    Ok(Json("Ok".to_owned()))
}

async fn not_found_endpoint(uri: Uri) -> ClientError {
    ClientError::NotFound(format!("Route {} not found", uri.path()))
}
