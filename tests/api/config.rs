use serial_test::serial;
use shop_server::infra::{StoreBackend, get_config_settings};

/// Sets environment variables for the duration of `f`.
fn with_env(vars: &[(&str, &str)], f: impl FnOnce()) {
    // Every test in this binary is #[serial], so nothing reads the environment concurrently.
    for (key, value) in vars {
        unsafe { std::env::set_var(key, value) };
    }
    f();
    for (key, _) in vars {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
#[serial]
fn the_test_environment_uses_the_memory_store() {
    with_env(&[("APP_ENVIRONMENT", "test")], || {
        let settings = get_config_settings().expect("Test configuration should load.");
        assert_eq!(settings.environment, "test");
        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.application.port, 0);
        assert_eq!(settings.auth.token_ttl_seconds, 3600);
    });
}

#[test]
#[serial]
fn environment_variables_override_files() {
    with_env(
        &[
            ("APP_ENVIRONMENT", "development"),
            ("APP_APPLICATION__PORT", "5099"),
            ("APP_RATE_LIMIT__MAX_REQUESTS", "7"),
        ],
        || {
            let settings = get_config_settings().expect("Configuration should load.");
            assert_eq!(settings.application.port, 5099);
            assert_eq!(settings.rate_limit.max_requests, 7);
            assert!(!settings.rate_limit.enabled);
        },
    );
}
