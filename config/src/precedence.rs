//! # Configuration Precedence
//!
//! Merges configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)

use crate::config::Config;
use crate::layer::ConfigLayer;

/// Merge multiple configuration sources with precedence.
///
/// The file is a complete [`Config`]; only the fields it changes relative to
/// `defaults` are reported. Env and CLI are partial layers: every field they
/// set wins, including one set back to its default.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, merge_configs, load_from_file, load_from_env};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let from_file = load_from_file(Path::new("jotter.toml"))?;
///     let from_env = load_from_env()?;
///
///     let _config = merge_configs(Config::default(), from_file, "file", from_env, "env", None, "cli");
///     Ok(())
/// }
/// ```
pub fn merge_configs(
    defaults: Config,
    file_config: Config,
    file_source_name: &str,
    env_layer: ConfigLayer,
    env_source_name: &str,
    cli_layer: Option<ConfigLayer>,
    cli_source_name: &str,
) -> Config {
    let file_layer = ConfigLayer::changes_from(&defaults, &file_config);
    let mut config = defaults;

    merge_with_logging(&mut config, &file_layer, file_source_name);
    merge_with_logging(&mut config, &env_layer, env_source_name);

    if let Some(cli) = cli_layer {
        merge_with_logging(&mut config, &cli, cli_source_name);
    }

    config
}

fn merge_with_logging(config: &mut Config, layer: &ConfigLayer, source_name: &str) {
    let changes = layer.apply_to(config);
    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }
}
