use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use config::{
    ApiLayer, Config, ConfigLayer, IdentityLayer, ObservabilityLayer, load_from_env,
    load_from_file, merge_configs, validate,
};
use tracing::debug;

use crate::ux_error;

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (TOML or YAML)
    #[arg(long, global = true, env = "JOTTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Notes backend URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Where the signed-in session is kept
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Resolve configuration: defaults < file < env < flags.
pub fn load(global: &GlobalArgs) -> Result<Config> {
    let file_path = global
        .config
        .clone()
        .or_else(|| Config::default_file_path().filter(|p| p.exists()));

    let from_file = match &file_path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration file");
            load_from_file(path).map_err(|e| ux_error::config_error(&e.to_string()))?
        }
        None => Config::default(),
    };
    let from_env = load_from_env().map_err(|e| ux_error::config_error(&e.to_string()))?;

    let config = merge_configs(
        Config::default(),
        from_file,
        "file",
        from_env,
        "env",
        cli_overrides(global),
        "cli",
    );
    validate(&config).map_err(|e| ux_error::config_error(&e.to_string()))?;
    Ok(config)
}

fn cli_overrides(global: &GlobalArgs) -> Option<ConfigLayer> {
    let layer = ConfigLayer {
        api: ApiLayer {
            base_url: global.api_url.clone(),
            ..ApiLayer::default()
        },
        identity: IdentityLayer {
            session_file: global.session_file.clone(),
            ..IdentityLayer::default()
        },
        observability: ObservabilityLayer {
            log_level: global.log_level.clone(),
        },
    };
    (!layer.is_empty()).then_some(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    fn clear_env() {
        for key in [
            "JOTTER_API_BASE_URL",
            "JOTTER_API_TIMEOUT_SECONDS",
            "JOTTER_LOG_LEVEL",
            "JOTTER_SESSION_FILE",
        ] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_flags_override_env_and_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("jotter.toml");
        std::fs::write(
            &file,
            "[api]\nbase_url = \"http://file:8080\"\ntimeout_seconds = 20\n",
        )
        .unwrap();
        unsafe {
            env::set_var("JOTTER_API_BASE_URL", "http://env:8080");
        }

        let global = GlobalArgs {
            config: Some(file.clone()),
            ..GlobalArgs::default()
        };
        let config = load(&global).unwrap();
        assert_eq!(config.api.base_url, "http://env:8080");
        assert_eq!(config.api.timeout_seconds, Some(20));

        let global = GlobalArgs {
            config: Some(file),
            api_url: Some("http://flag:8080".to_string()),
            ..GlobalArgs::default()
        };
        assert_eq!(load(&global).unwrap().api.base_url, "http://flag:8080");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_default_url_flag_overrides_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("jotter.toml");
        std::fs::write(&file, "[api]\nbase_url = \"http://staging:9000\"\n").unwrap();

        let config = load(&GlobalArgs {
            config: Some(file),
            api_url: Some("http://localhost:8080".to_string()),
            ..GlobalArgs::default()
        })
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
    }

    #[test]
    #[serial]
    fn test_default_level_env_overrides_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("jotter.toml");
        std::fs::write(&file, "[observability]\nlog_level = \"debug\"\n").unwrap();
        unsafe {
            env::set_var("JOTTER_LOG_LEVEL", "warn");
        }

        let config = load(&GlobalArgs {
            config: Some(file),
            ..GlobalArgs::default()
        })
        .unwrap();
        clear_env();
        assert_eq!(config.observability.log_level, "warn");
    }

    #[test]
    fn test_no_flags_means_no_cli_layer() {
        assert!(cli_overrides(&GlobalArgs::default()).is_none());
    }

    #[test]
    #[serial]
    fn test_invalid_file_is_config_error() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("jotter.ini");
        std::fs::write(&file, "base_url=x").unwrap();

        let err = load(&GlobalArgs {
            config: Some(file),
            ..GlobalArgs::default()
        })
        .unwrap_err();
        let ux = err.downcast_ref::<ux_error::UxError>().unwrap();
        assert!(ux.what.contains("Unsupported config file format"));
    }

    #[test]
    #[serial]
    fn test_invalid_url_fails_validation() {
        clear_env();
        let err = load(&GlobalArgs {
            api_url: Some("not a url".to_string()),
            ..GlobalArgs::default()
        })
        .unwrap_err();
        assert!(err.downcast_ref::<ux_error::UxError>().is_some());
    }

    #[test]
    #[serial]
    #[traced_test]
    fn test_explicit_file_is_logged() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("jotter.yaml");
        std::fs::write(&file, "api:\n  base_url: http://yaml:8080\n").unwrap();

        let config = load(&GlobalArgs {
            config: Some(file),
            ..GlobalArgs::default()
        })
        .unwrap();
        assert_eq!(config.api.base_url, "http://yaml:8080");
        assert!(logs_contain("Loading configuration file"));
    }
}
