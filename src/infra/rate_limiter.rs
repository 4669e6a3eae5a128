//! Fixed-window request throttling per client IP.
//!
//! State lives in the service instance, so several instances behind a load balancer each count
//! separately.

use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::{ClientError, RateLimitSettings};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    enabled: bool,
    window: Duration,
    max_requests: u32,
    windows: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

impl RateLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            enabled: settings.enabled,
            window: Duration::from_secs(settings.window_seconds),
            max_requests: settings.max_requests,
            windows: Arc::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn windows(&self) -> MutexGuard<'_, HashMap<IpAddr, Window>> {
        // A panic while holding the lock cannot leave a window half-written.
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records a request from `ip`, returning `false` when it exceeds the window's allowance.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    pub fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut windows = self.windows();
        match windows.get_mut(&ip) {
            Some(window) if now.saturating_duration_since(window.started) < self.window => {
                if window.count >= self.max_requests {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                windows.insert(
                    ip,
                    Window {
                        started: now,
                        count: 1,
                    },
                );
                true
            }
        }
    }

    /// Drops every window that has expired by `now`. Returns how many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut windows = self.windows();
        let before = windows.len();
        windows.retain(|_, window| now.saturating_duration_since(window.started) < self.window);
        before - windows.len()
    }

    pub fn reset(&self) {
        self.windows().clear();
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows().len()
    }
}

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, ClientError> {
    if limiter.is_enabled() {
        let ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        if !limiter.check(ip) {
            warn!("Rate limit exceeded for {ip}");
            return Err(ClientError::TooManyRequests);
        }
    }
    Ok(next.run(request).await)
}
