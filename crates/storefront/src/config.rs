//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GRUBLINE_API_BASE_URL` - Base URL of the restaurant API
//!
//! ## Optional
//! - `GRUBLINE_API_TOKEN` - Bearer token for the restaurant API
//! - `GRUBLINE_DATA_DIR` - Directory for the persisted cart and address (default: .grubline)
//! - `GRUBLINE_LANGUAGE` - Initial display language (default: en)
//! - `GRUBLINE_CACHE_TTL_SECS` - Response cache freshness window (default: 600)
//! - `GRUBLINE_HTTP_TIMEOUT_SECS` - API request timeout (default: 10)
//! - `GRUBLINE_KRW_PER_USD` - Won per dollar for payment conversion (default: 1350)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use grubline_core::Language;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::cache::DEFAULT_TTL_SECS;

const DEFAULT_DATA_DIR: &str = ".grubline";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_KRW_PER_USD: &str = "1350";
const MIN_TOKEN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Values that show up when an example `.env` is copied without editing.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Restaurant API connection
    pub api: ApiConfig,
    /// Directory holding the persisted cart and address
    pub data_dir: PathBuf,
    /// Language active at startup
    pub language: Language,
    /// Response cache freshness window
    pub cache_ttl: chrono::Duration,
    /// Payment currency conversion
    pub currency: CurrencyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Restaurant API connection settings.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.grubline.app/v1`
    pub base_url: String,
    /// Bearer token, if the API requires one
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Conversion from menu prices (won) to the payment currency (dollars).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyConfig {
    /// Won per US dollar
    pub krw_per_usd: Decimal,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            krw_per_usd: Decimal::from(1350),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_required_env(vars, "GRUBLINE_API_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("GRUBLINE_API_BASE_URL".to_string(), e.to_string())
        })?;

        let token = get_optional_env(vars, "GRUBLINE_API_TOKEN")
            .map(|value| {
                validate_secret_strength(&value, "GRUBLINE_API_TOKEN")?;
                Ok(SecretString::from(value))
            })
            .transpose()?;

        let timeout_secs = parse_env(
            vars,
            "GRUBLINE_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )?;
        let ttl_secs: i64 =
            parse_env(vars, "GRUBLINE_CACHE_TTL_SECS", &DEFAULT_TTL_SECS.to_string())?;
        if ttl_secs <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "GRUBLINE_CACHE_TTL_SECS".to_string(),
                "must be positive".to_string(),
            ));
        }
        let cache_ttl = chrono::Duration::try_seconds(ttl_secs).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "GRUBLINE_CACHE_TTL_SECS".to_string(),
                "out of range".to_string(),
            )
        })?;

        let krw_per_usd: Decimal = parse_env(vars, "GRUBLINE_KRW_PER_USD", DEFAULT_KRW_PER_USD)?;
        if krw_per_usd <= Decimal::ZERO {
            return Err(ConfigError::InvalidEnvVar(
                "GRUBLINE_KRW_PER_USD".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            api: ApiConfig {
                base_url,
                token,
                timeout: Duration::from_secs(timeout_secs),
            },
            data_dir: PathBuf::from(get_env_or_default(vars, "GRUBLINE_DATA_DIR", DEFAULT_DATA_DIR)),
            language: parse_env(vars, "GRUBLINE_LANGUAGE", Language::default().code())?,
            cache_ttl,
            currency: CurrencyConfig { krw_per_usd },
            sentry_dsn: get_optional_env(vars, "SENTRY_DSN"),
            sentry_environment: get_optional_env(vars, "SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(vars: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    get_optional_env(vars, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(vars: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    vars(key).filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(vars: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(vars, key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(vars: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(vars, key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // Token length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject tokens that are placeholders or too uniform to be real.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_TOKEN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_TOKEN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

impl ApiConfig {
    /// The token for use in an `Authorization` header.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.expose_secret())
    }
}
