//! Configuration module
//!
//! Settings are read from the process environment (after loading an optional `.env` file) with
//! typed defaults, then checked by [`Config::validate`] before anything else starts.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::Template;

const SERVER_PORT: u16 = 3000;
const PORT_PROBE_ATTEMPTS: u16 = 20;
const DEV_SESSION_SECRET: &str = "dev-secret-key";
const GENERATE_RATE_LIMIT_PER_HOUR: u32 = 10;
const DOWNLOAD_RATE_LIMIT_PER_HOUR: u32 = 30;
const RATE_LIMIT_WINDOW_SECS: u64 = 60 * 60;
const MAX_UPLOAD_SIZE_MB: usize = 5;
const COOLDOWN_SECS: u64 = 30;
const RETENTION_MAX_AGE_SECS: u64 = 30 * 60;
const SWEEP_INTERVAL_SECS: u64 = 5 * 60;
const COMPOSITE_TIMEOUT_SECS: u64 = 20;
const TRUSTED_PROXY_COUNT: usize = 1;

/// Extensions accepted for uploads, compared case-insensitively
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    /// How many consecutive ports to try when the configured one is taken
    pub port_probe_attempts: u16,
    pub environment: String,
    pub session_secret: String,
    pub cors_origins: Vec<String>,
    pub trusted_proxy_count: usize,
    pub generate_rate_limit_per_hour: u32,
    pub download_rate_limit_per_hour: u32,
    pub rate_limit_window_secs: u64,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub classic_template_file: String,
    pub detailed_template_file: String,
    /// Optional TrueType font replacing the bundled one
    pub font_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub cooldown_secs: u64,
    pub retention_max_age_secs: u64,
    pub sweep_interval_secs: u64,
    pub composite_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            port_probe_attempts: PORT_PROBE_ATTEMPTS,
            environment: "development".to_string(),
            session_secret: DEV_SESSION_SECRET.to_string(),
            cors_origins: vec!["*".to_string()],
            trusted_proxy_count: TRUSTED_PROXY_COUNT,
            generate_rate_limit_per_hour: GENERATE_RATE_LIMIT_PER_HOUR,
            download_rate_limit_per_hour: DOWNLOAD_RATE_LIMIT_PER_HOUR,
            rate_limit_window_secs: RATE_LIMIT_WINDOW_SECS,
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("public/output"),
            template_dir: PathBuf::from("template"),
            classic_template_file: Template::Classic.form_value().to_string(),
            detailed_template_file: Template::Detailed.form_value().to_string(),
            font_path: None,
            max_upload_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            cooldown_secs: COOLDOWN_SECS,
            retention_max_age_secs: RETENTION_MAX_AGE_SECS,
            sweep_interval_secs: SWEEP_INTERVAL_SECS,
            composite_timeout_secs: COMPOSITE_TIMEOUT_SECS,
        }
    }
}

/// Read and parse an environment variable, falling back to `default` when unset or unparsable.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => default,
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or(defaults.environment);

        let session_secret = env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.session_secret);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb = parse_env("MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server_port: parse_env("PORT", SERVER_PORT),
            port_probe_attempts: parse_env("PORT_PROBE_ATTEMPTS", PORT_PROBE_ATTEMPTS),
            environment,
            session_secret,
            cors_origins,
            trusted_proxy_count: parse_env("TRUSTED_PROXY_COUNT", TRUSTED_PROXY_COUNT),
            generate_rate_limit_per_hour: parse_env(
                "RATE_LIMIT_MAX",
                GENERATE_RATE_LIMIT_PER_HOUR,
            ),
            download_rate_limit_per_hour: DOWNLOAD_RATE_LIMIT_PER_HOUR,
            rate_limit_window_secs: RATE_LIMIT_WINDOW_SECS,
            upload_dir: parse_env("UPLOAD_DIR", defaults.upload_dir),
            output_dir: parse_env("OUTPUT_DIR", defaults.output_dir),
            template_dir: parse_env("TEMPLATE_DIR", defaults.template_dir),
            classic_template_file: defaults.classic_template_file,
            detailed_template_file: defaults.detailed_template_file,
            font_path: env::var("FONT_PATH").ok().map(PathBuf::from),
            max_upload_bytes: max_upload_size_mb * 1024 * 1024,
            allowed_extensions: defaults.allowed_extensions,
            cooldown_secs: parse_env("COOLDOWN_SECS", COOLDOWN_SECS),
            retention_max_age_secs: parse_env("RETENTION_MAX_AGE_SECS", RETENTION_MAX_AGE_SECS),
            sweep_interval_secs: parse_env("SWEEP_INTERVAL_SECS", SWEEP_INTERVAL_SECS),
            composite_timeout_secs: parse_env("COMPOSITE_TIMEOUT_SECS", COMPOSITE_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.session_secret == DEV_SESSION_SECRET {
            return Err(anyhow::anyhow!(
                "SESSION_SECRET must be set to a non-default value in production"
            ));
        }
        if self.port_probe_attempts == 0 {
            return Err(anyhow::anyhow!("PORT_PROBE_ATTEMPTS must be at least 1"));
        }
        if self.generate_rate_limit_per_hour == 0 {
            return Err(anyhow::anyhow!("RATE_LIMIT_MAX must be at least 1"));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be at least 1"));
        }
        if self.retention_max_age_secs == 0 || self.sweep_interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "RETENTION_MAX_AGE_SECS and SWEEP_INTERVAL_SECS must be greater than 0"
            ));
        }
        if self.composite_timeout_secs == 0 {
            return Err(anyhow::anyhow!("COMPOSITE_TIMEOUT_SECS must be greater than 0"));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Session cookies carry the `Secure` attribute only in production
    pub fn cookie_secure(&self) -> bool {
        self.is_production()
    }

    pub fn template_asset_path(&self, template: Template) -> PathBuf {
        let file = match template {
            Template::Classic => &self.classic_template_file,
            Template::Detailed => &self.detailed_template_file,
        };
        self.template_dir.join(file)
    }

    pub fn cooldown_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs as i64)
    }

    pub fn retention_max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.retention_max_age_secs as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn composite_timeout(&self) -> Duration {
        Duration::from_secs(self.composite_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_limits() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.generate_rate_limit_per_hour, 10);
        assert_eq!(config.download_rate_limit_per_hour, 30);
        assert_eq!(config.cooldown_window(), chrono::Duration::seconds(30));
        assert_eq!(config.retention_max_age(), chrono::Duration::minutes(30));
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_session_secret() {
        let config = Config {
            environment: "production".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            environment: "production".to_string(),
            session_secret: "a-real-secret-value".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.cookie_secure());
    }

    #[test]
    fn test_template_asset_paths() {
        let config = Config {
            template_dir: PathBuf::from("/srv/templates"),
            ..Config::default()
        };
        assert_eq!(
            config.template_asset_path(Template::Classic),
            PathBuf::from("/srv/templates/phub.png")
        );
        assert_eq!(
            config.template_asset_path(Template::Detailed),
            PathBuf::from("/srv/templates/xnxx.png")
        );
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let config = Config {
            generate_rate_limit_per_hour: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
