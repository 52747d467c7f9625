//! Application-wide constants

/// Name of the visitor session cookie
pub const SESSION_COOKIE_NAME: &str = "memeforge.sid";

/// Session cookie lifetime (24 hours)
pub const SESSION_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Shards per rate limiter
pub const RATE_LIMITER_SHARD_COUNT: usize = 16;

/// How often expired rate limit buckets are dropped
pub const RATE_LIMITER_CLEANUP_INTERVAL_SECS: u64 = 5 * 60;

/// How often expired cooldown entries are dropped
pub const COOLDOWN_PURGE_INTERVAL_SECS: u64 = 60;

/// Room for multipart boundaries and the caption fields on top of the image itself
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Server-wide cap on in-flight requests
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;

pub const GENERATE_RATE_LIMIT_MESSAGE: &str =
    "Too many generate requests, please try again later.";

pub const DOWNLOAD_RATE_LIMIT_MESSAGE: &str =
    "Too many download requests, please try again later.";
