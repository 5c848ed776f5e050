use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use anyhow::{Result, anyhow};
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub redis_url: Option<String>,
    pub redis_prefix: String,
    pub otp_ttl: Duration,
    pub otp_rate_limit: RateLimitConfig,
    pub max_body_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
    pub smtp: Option<SmtpConfig>,
    pub mail_from: String,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub capacity: f64,
    pub refill_per_sec: f64,
}

pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub starttls: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("RUST_PORT", "8000")?,
            redis_url: var("REDIS_URL"),
            redis_prefix: try_load("REDIS_PREFIX", "sightings")?,
            otp_ttl: Duration::from_secs(try_load("OTP_TTL_SECONDS", "600")?),
            otp_rate_limit: RateLimitConfig {
                capacity: try_load("OTP_RATE_CAPACITY", "5")?,
                refill_per_sec: try_load("OTP_RATE_REFILL_PER_SEC", "0.0833")?,
            },
            max_body_bytes: try_load("MAX_BODY_BYTES", "16384")?,
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|origins| split_list(&origins))
                .unwrap_or_default(),
            smtp: SmtpConfig::load()?,
            mail_from: try_load("MAIL_FROM", "no-reply@localhost")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 0,
            redis_url: None,
            redis_prefix: "sightings".to_string(),
            otp_ttl: Duration::from_secs(600),
            otp_rate_limit: RateLimitConfig::default(),
            max_body_bytes: 16 * 1024,
            cors_allowed_origins: Vec::new(),
            smtp: None,
            mail_from: "no-reply@localhost".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 5.0,
            refill_per_sec: 5.0 / 60.0,
        }
    }
}

impl SmtpConfig {
    fn load() -> Result<Option<Self>> {
        let Some(host) = var("SMTP_HOST") else {
            info!("SMTP_HOST not set, emails will only be logged");
            return Ok(None);
        };

        let username = var("SMTP_USERNAME");
        let password = match username {
            Some(_) => Some(var("SMTP_PASSWORD").map_or_else(|| read_secret("SMTP_PASSWORD"), Ok)?),
            None => None,
        };

        Ok(Some(Self {
            host,
            port: try_load("SMTP_PORT", "587")?,
            username,
            password,
            starttls: try_load("SMTP_STARTTLS", "true")?,
        }))
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Environment misconfigured: {key}={raw:?} ({e})")
    })
}

fn read_secret(secret_name: &str) -> Result<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path).map(|s| s.trim().to_string()).map_err(|e| {
        warn!("Failed to read {secret_name} from file: {e}");
        anyhow!("Secrets misconfigured: {path} ({e})")
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
