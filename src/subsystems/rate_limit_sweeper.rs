use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::select;
use tokio_graceful_shutdown::{IntoSubsystem, SubsystemHandle};
use tracing::{debug, info};

use crate::infra::RateLimiter;

/// Periodically forgets clients whose rate limit window has expired.
pub struct RateLimitSweeper {
    limiter: RateLimiter,
    interval: Duration,
}

impl RateLimitSweeper {
    pub fn new(limiter: RateLimiter, interval: Duration) -> Self {
        Self { limiter, interval }
    }

    async fn start(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            let removed = self.limiter.sweep(Instant::now());
            if removed > 0 {
                debug!(
                    removed,
                    remaining = self.limiter.tracked_clients(),
                    "Expired rate limit windows swept"
                );
            }
        }
    }
}

#[async_trait]
impl IntoSubsystem<anyhow::Error> for RateLimitSweeper {
    async fn run(self, subsys: SubsystemHandle) -> Result<(), anyhow::Error> {
        info!("Rate limit sweeper starting.");
        select!(
            _ = self.start() => {}
            _ = subsys.on_shutdown_requested() => {
                info!("Rate limit sweeper shutdown.");
            }
        );
        Ok(())
    }
}
