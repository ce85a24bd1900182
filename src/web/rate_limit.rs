//! Fixed-window request gate
//!
//! Runs before every handler; over-limit requests are answered with a 429
//! envelope without reaching business logic. In-flight work is never
//! cancelled. Clients are keyed by `X-Forwarded-For` when present (the
//! deployment sits behind a proxy), otherwise they share one window.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use super::router::AppState;

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one request against the client's current window.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        let entry = entry_or_reset(&mut windows, key, now, self.window);
        if entry.1 >= self.max_requests {
            return false;
        }
        entry.1 += 1;
        true
    }
}

fn entry_or_reset<'a>(
    windows: &'a mut HashMap<String, (Instant, u32)>,
    key: &str,
    now: Instant,
    window: Duration,
) -> &'a mut (Instant, u32) {
    let entry = windows
        .entry(key.to_string())
        .or_insert_with(|| (now, 0));
    if now.duration_since(entry.0) >= window {
        *entry = (now, 0);
    }
    entry
}

pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("global");

    if !state.limiter.allow(key) {
        tracing::warn!(client = %key, "rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }

    next.run(request).await
}
