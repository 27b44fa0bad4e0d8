//! # Environment Variable Loader
//!
//! Loads configuration from `JOTTER_*` environment variables.
//!
//! - `JOTTER_API_BASE_URL`: notes backend root (default: "http://localhost:8080")
//! - `JOTTER_API_TIMEOUT_SECONDS`: request timeout (default: transport default)
//! - `JOTTER_FIREBASE_API_KEY`: identity provider API key
//! - `JOTTER_AUTH_URL`: Identity Toolkit root
//! - `JOTTER_TOKEN_URL`: Secure Token root
//! - `JOTTER_SESSION_FILE`: persisted session location
//! - `JOTTER_FEDERATED_PROVIDER`: federated provider id (default: "google.com")
//! - `JOTTER_FEDERATED_ID_TOKEN`: federated identity assertion
//! - `JOTTER_REFRESH_MARGIN_SECONDS`: early token refresh margin (default: 300)
//! - `JOTTER_LOG_LEVEL`: log level when `RUST_LOG` is unset (default: "warn")

use crate::layer::{ApiLayer, ConfigLayer, IdentityLayer, ObservabilityLayer};
use std::env;
use std::path::PathBuf;

/// A variable was set but could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {key}: {reason}")]
pub struct ConfigEnvError {
    pub key: String,
    pub reason: String,
}

/// Load the fields set through environment variables.
///
/// Unset variables stay `None` in the returned layer; set-but-invalid numeric
/// variables are an error rather than silently ignored.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let layer = load_from_env()?;
///     println!("Notes API override: {:?}", layer.api.base_url);
///     Ok(())
/// }
/// ```
pub fn load_from_env() -> Result<ConfigLayer, ConfigEnvError> {
    Ok(ConfigLayer {
        api: ApiLayer {
            base_url: env::var("JOTTER_API_BASE_URL").ok(),
            timeout_seconds: parse_env("JOTTER_API_TIMEOUT_SECONDS")?,
        },
        identity: IdentityLayer {
            api_key: env::var("JOTTER_FIREBASE_API_KEY").ok(),
            auth_url: env::var("JOTTER_AUTH_URL").ok(),
            token_url: env::var("JOTTER_TOKEN_URL").ok(),
            session_file: env::var("JOTTER_SESSION_FILE").ok().map(PathBuf::from),
            federated_provider: env::var("JOTTER_FEDERATED_PROVIDER").ok(),
            federated_id_token: env::var("JOTTER_FEDERATED_ID_TOKEN").ok(),
            refresh_margin_seconds: parse_env("JOTTER_REFRESH_MARGIN_SECONDS")?,
        },
        observability: ObservabilityLayer {
            log_level: env::var("JOTTER_LOG_LEVEL").ok(),
        },
    })
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigEnvError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(s) => s.trim().parse::<T>().map(Some).map_err(|e| ConfigEnvError {
            key: key.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}
