mod rate_limit_sweeper;
mod web_server;

pub use rate_limit_sweeper::RateLimitSweeper;
pub use web_server::{WebServer, bind_listener, build_router};
