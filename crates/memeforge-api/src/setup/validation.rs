//! Startup configuration checks
//!
//! [`Config::validate`] rejects values that cannot work at all; this pass adds the checks that
//! depend on the deployment and only warrant a warning.

use anyhow::Result;
use memeforge_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!(
            "CORS allows all origins in production; set CORS_ORIGINS to the site origin"
        );
    }

    if config.trusted_proxy_count > 10 {
        tracing::warn!(
            trusted_proxy_count = config.trusted_proxy_count,
            "TRUSTED_PROXY_COUNT is very high - ensure this matches your actual proxy setup"
        );
    }

    if config.retention_max_age_secs < config.cooldown_secs {
        tracing::warn!(
            retention_max_age_secs = config.retention_max_age_secs,
            cooldown_secs = config.cooldown_secs,
            "Generated images expire before the cooldown ends"
        );
    }

    for origin in config.cors_origins.iter().filter(|o| *o != "*") {
        if origin.parse::<axum::http::HeaderValue>().is_err() {
            return Err(anyhow::anyhow!("Invalid CORS origin: {}", origin));
        }
    }

    Ok(())
}
