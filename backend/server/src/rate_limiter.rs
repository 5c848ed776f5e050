use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Request, State as AxumState},
    middleware::Next,
    response::Response,
};
use tokio::{sync::Mutex, time::Instant};
use tracing::warn;

use crate::{config::RateLimitConfig, error::AppError, state::State, utils::client_key};

const MAX_TRACKED_CLIENTS: usize = 10_000;

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket per client key.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub async fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let cfg = &self.config;
        let mut lock = self.buckets.lock().await;

        if lock.len() >= MAX_TRACKED_CLIENTS {
            // a bucket that would be full again is indistinguishable from a new one
            lock.retain(|_, bucket| {
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens + elapsed * cfg.refill_per_sec < cfg.capacity
            });
        }

        let bucket = lock.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: cfg.capacity,
            last_refill: now,
        });
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + (elapsed * cfg.refill_per_sec)).min(cfg.capacity);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

pub async fn throttle_otp(
    AxumState(state): AxumState<Arc<State>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);

    if !state.otp_limiter.allow(&key).await {
        warn!(client = %key, "Throttled send-otp request");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}
