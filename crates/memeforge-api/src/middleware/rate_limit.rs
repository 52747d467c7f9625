use crate::error::HttpAppError;
use crate::middleware::client_ip::client_ip_of;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use memeforge_core::AppError;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Fixed-window counter for one client
#[derive(Clone)]
struct RateLimitBucket {
    count: u32,
    reset_at: Instant,
}

impl RateLimitBucket {
    fn new(window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: Instant::now() + window,
        }
    }

    fn check_and_increment(&mut self, limit: u32, window: Duration) -> bool {
        let now = Instant::now();

        if now >= self.reset_at {
            self.count = 0;
            self.reset_at = now + window;
        }

        if self.count < limit {
            self.count += 1;
            true
        } else {
            false
        }
    }

    fn reset_in(&self) -> Duration {
        self.reset_at.saturating_duration_since(Instant::now())
    }
}

/// Result of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_in: Duration,
}

impl RateLimitDecision {
    /// Seconds until the window resets, rounded up so clients never retry early
    pub fn reset_secs(&self) -> u64 {
        let secs = self.reset_in.as_secs();
        let rounded = if self.reset_in.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        };
        rounded.max(1)
    }
}

/// Sharded per-IP rate limiter
///
/// Keys are hashed onto separate mutex-protected maps to reduce lock contention. One instance
/// guards one route family (generate, download) with its own limit and message.
#[derive(Clone)]
pub struct HttpRateLimiter {
    shards: Vec<Arc<Mutex<HashMap<String, RateLimitBucket>>>>,
    limit: u32,
    window: Duration,
    message: &'static str,
    max_buckets: usize,
}

impl HttpRateLimiter {
    pub fn new(limit: u32, window: Duration, message: &'static str) -> Self {
        Self::with_shards(limit, window, message, crate::constants::RATE_LIMITER_SHARD_COUNT)
    }

    pub fn with_shards(
        limit: u32,
        window: Duration,
        message: &'static str,
        shard_count: usize,
    ) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            limit,
            window,
            message,
            max_buckets: 10_000,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// Drop buckets whose window has passed
    pub async fn cleanup_expired_buckets(&self) -> usize {
        let now = Instant::now();
        let mut total_cleaned = 0;

        for shard in &self.shards {
            let mut buckets = shard.lock().await;
            let before = buckets.len();
            buckets.retain(|_, bucket| bucket.reset_at > now);
            total_cleaned += before - buckets.len();
        }

        if total_cleaned > 0 {
            tracing::debug!(
                buckets_cleaned = total_cleaned,
                "Cleaned up expired rate limit buckets"
            );
        }
        total_cleaned
    }

    /// Spawn the periodic bucket cleanup
    pub fn start_cleanup(self: Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.cleanup_expired_buckets().await;
            }
        })
    }

    pub async fn check_rate_limit(&self, key: &str) -> RateLimitDecision {
        let shard_index = self.shard_index(key);
        let mut buckets = self.shards[shard_index].lock().await;

        if buckets.len() >= self.max_buckets {
            let now = Instant::now();
            buckets.retain(|_, bucket| bucket.reset_at > now);

            if buckets.len() >= self.max_buckets {
                let oldest_key = buckets
                    .iter()
                    .min_by_key(|(_, bucket)| bucket.reset_at)
                    .map(|(k, _)| k.clone());

                if let Some(key_to_remove) = oldest_key {
                    buckets.remove(&key_to_remove);
                    tracing::debug!(
                        removed_key = %key_to_remove,
                        shard_index,
                        "Evicted oldest rate limit bucket due to capacity limit"
                    );
                }
            }
        }

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| RateLimitBucket::new(self.window));

        let allowed = bucket.check_and_increment(self.limit, self.window);
        RateLimitDecision {
            allowed,
            limit: self.limit,
            remaining: self.limit.saturating_sub(bucket.count),
            reset_in: bucket.reset_in(),
        }
    }
}

fn insert_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let values = [
        ("RateLimit-Limit", decision.limit.to_string()),
        ("RateLimit-Remaining", decision.remaining.to_string()),
        ("RateLimit-Reset", decision.reset_secs().to_string()),
    ];
    for (name, value) in values {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            headers.insert(name, header_value);
        }
    }
}

/// Per-IP rate limiting middleware
///
/// # Headers
/// - `RateLimit-Limit`: requests allowed per window
/// - `RateLimit-Remaining`: requests left in the current window
/// - `RateLimit-Reset`: seconds until the window resets
/// - `Retry-After`: on 429 responses only
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<HttpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = client_ip_of(request.extensions());
    let decision = rate_limiter.check_rate_limit(client_ip.as_str()).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(
            client_ip = %client_ip.as_str(),
            path = %request.uri().path(),
            limit = decision.limit,
            "Rate limit exceeded"
        );
        HttpAppError(AppError::RateLimited {
            message: rate_limiter.message.to_string(),
            retry_after_secs: decision.reset_secs(),
        })
        .into_response()
    };

    insert_rate_limit_headers(response.headers_mut(), &decision);
    response
}
