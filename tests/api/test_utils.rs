use serde_json::{Value, json};
use shop_server::{
    AppState, build_subsystems, construct_app_state,
    domain::auth::grant_admin,
    infra::{Settings, StoreBackend, get_config_settings},
    subsystems::bind_listener,
    test_server,
};

pub struct TestApp {
    pub address: String,
    pub state: AppState,
    pub http: reqwest::Client,
}

/// Starts the full server on a free port, backed by a fresh in-memory store.
pub async fn start_test_server() -> TestApp {
    start_test_server_with(|_| {}).await
}

/// Like [`start_test_server`], with a chance to adjust the settings first.
pub async fn start_test_server_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    let mut settings = get_config_settings().expect("Could not read application configuration.");
    settings.application.host = "127.0.0.1".to_owned();
    settings.application.port = 0;
    settings.store.backend = StoreBackend::Memory;
    settings.rate_limit.enabled = false;
    configure(&mut settings);

    let state = construct_app_state(settings)
        .await
        .expect("Expected AppState to be created.");
    let listener = bind_listener(&state.settings)
        .await
        .expect("Expected a free port.");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("Listener should have an address.")
    );
    tokio::spawn(test_server(build_subsystems(state.clone(), listener)));

    TestApp {
        address,
        state,
        http: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn client(&self) -> httpc_test::Client {
        httpc_test::new_client(self.address.clone()).expect("Expected client to be created.")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// Registers a customer and returns `(uid, token)`.
    pub async fn register(&self, email: &str) -> (String, String) {
        let body: Value = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&json!({"email": email, "password": "secret-pass", "fullname": "Test Shopper"}))
            .send()
            .await
            .expect("Register request should be sent.")
            .json()
            .await
            .expect("Register response should be JSON.");
        let uid = body["data"]["user"]["uid"]
            .as_str()
            .expect("Registration should return a uid.")
            .to_owned();
        let token = body["data"]["token"]
            .as_str()
            .expect("Registration should return a token.")
            .to_owned();
        (uid, token)
    }

    /// Registers a user and promotes them to admin. Returns their token.
    pub async fn register_admin(&self, email: &str) -> String {
        let (_, token) = self.register(email).await;
        grant_admin(&self.state.store, email)
            .await
            .expect("Admin role should be granted.");
        token
    }

    /// Creates a product through the admin API and returns its id.
    pub async fn create_product(&self, admin_token: &str, price: f64, stock: i64) -> String {
        let body: Value = self
            .http
            .post(self.url("/api/products"))
            .bearer_auth(admin_token)
            .json(&json!({
                "name": "Enamel Mug",
                "description": "Keeps coffee warm",
                "price": price,
                "stock": stock,
                "category": "Kitchen",
            }))
            .send()
            .await
            .expect("Create product request should be sent.")
            .json()
            .await
            .expect("Create product response should be JSON.");
        body["data"]["id"]
            .as_str()
            .expect("Created product should have an id.")
            .to_owned()
    }
}
