mod cli;
mod client_error;
mod config;
mod envelope;
mod rate_limiter;

pub use cli::Cli;
pub use client_error::ClientError;
pub use config::{
    AuthSettings, DatabaseSettings, RateLimitSettings, ServerSettings, Settings, StoreBackend,
    StoreSettings, get_config_settings,
};
pub use envelope::{ApiResponse, Payload};
pub use rate_limiter::{RateLimiter, rate_limit};
