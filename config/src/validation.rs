//! # Configuration Validation
//!
//! Validates configuration structures using the `validator` crate.

use crate::config::Config;
use validator::Validate;

/// Validate configuration structure.
///
/// ## Validation Rules
/// - `api.base_url`, `identity.auth_url`, `identity.token_url`: valid URLs
/// - `api.timeout_seconds`: 1-600 when set
/// - `identity.federated_provider`: 1-255 characters
/// - `identity.refresh_margin_seconds`: at most 3000
/// - `observability.log_level`: "trace", "debug", "info", "warn" or "error"
pub fn validate(config: &Config) -> Result<(), validator::ValidationErrors> {
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, ObservabilityConfig};

    #[test]
    fn test_validate_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config {
            api: ApiConfig {
                base_url: "not a url".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = Config {
            api: ApiConfig {
                timeout_seconds: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let config = Config {
            observability: ObservabilityConfig {
                log_level: "verbose".to_string(),
            },
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }
}
