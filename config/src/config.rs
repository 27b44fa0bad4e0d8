//! # Configuration Structures
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization
//! - Use `validator` for input validation
//! - Fall back to defaults for every omitted field

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Top-level configuration for the Jotter client.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// println!("Notes API: {}", config.api.base_url);
/// ```
///
/// ## Fields
/// - `api`: notes backend location and transport settings
/// - `identity`: identity provider endpoints, API key and session storage
/// - `observability`: logging level
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    #[validate(nested)]
    pub api: ApiConfig,

    #[serde(default)]
    #[validate(nested)]
    pub identity: IdentityConfig,

    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// `<config dir>/jotter/config.toml`, if the platform has a config dir.
    pub fn default_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jotter").join("config.toml"))
    }
}

/// Notes backend configuration.
///
/// ## Fields
/// - `base_url`: backend root (default: "http://localhost:8080")
/// - `timeout_seconds`: per-request timeout; unset means the transport
///   default
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    #[serde(default)]
    #[validate(range(min = 1, max = 600))]
    pub timeout_seconds: Option<u64>,
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

/// Identity provider configuration.
///
/// ## Fields
/// - `api_key`: Firebase web API key (required for sign-in)
/// - `auth_url`: Identity Toolkit root
/// - `token_url`: Secure Token root
/// - `session_file`: where the refresh token is persisted (default:
///   `<config dir>/jotter/session.json`)
/// - `federated_provider`: provider id for federated sign-in
/// - `federated_id_token`: identity assertion from that provider
/// - `refresh_margin_seconds`: refresh the id token this long before expiry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct IdentityConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_auth_url")]
    #[validate(url)]
    pub auth_url: String,

    #[serde(default = "default_token_url")]
    #[validate(url)]
    pub token_url: String,

    #[serde(default)]
    pub session_file: Option<PathBuf>,

    #[serde(default = "default_federated_provider")]
    #[validate(length(min = 1, max = 255))]
    pub federated_provider: String,

    #[serde(default)]
    pub federated_id_token: Option<String>,

    #[serde(default = "default_refresh_margin_seconds")]
    #[validate(range(max = 3000))]
    pub refresh_margin_seconds: u64,
}

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com";
pub const DEFAULT_FEDERATED_PROVIDER: &str = "google.com";
pub const DEFAULT_REFRESH_MARGIN_SECONDS: u64 = 300;

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_federated_provider() -> String {
    DEFAULT_FEDERATED_PROVIDER.to_string()
}

fn default_refresh_margin_seconds() -> u64 {
    DEFAULT_REFRESH_MARGIN_SECONDS
}

impl IdentityConfig {
    /// Resolved session file location.
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("jotter").join("session.json")))
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            session_file: None,
            federated_provider: default_federated_provider(),
            federated_id_token: None,
            refresh_margin_seconds: default_refresh_margin_seconds(),
        }
    }
}

/// Logging configuration.
///
/// `log_level` is used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    #[validate(custom(function = "validate_log_level"))]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn validate_log_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid log level")),
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_seconds, None);
        assert_eq!(config.identity.federated_provider, "google.com");
        assert_eq!(config.identity.refresh_margin_seconds, 300);
        assert_eq!(config.observability.log_level, "warn");
    }

    #[test]
    fn test_explicit_session_file_wins() {
        let identity = IdentityConfig {
            session_file: Some(PathBuf::from("/tmp/jotter-session.json")),
            ..Default::default()
        };
        assert_eq!(
            identity.session_path(),
            Some(PathBuf::from("/tmp/jotter-session.json"))
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[api]\ntimeout_seconds = 5\n").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_seconds, Some(5));
        assert_eq!(config.identity, IdentityConfig::default());
    }
}
