//! # Configuration System
//!
//! Centralized configuration for the Jotter note client.
//!
//! This crate provides:
//! - Configuration structures for the notes API, the identity provider and
//!   logging
//! - Environment variable loading (`JOTTER_*`)
//! - Configuration file loading (TOML/YAML)
//! - Configuration precedence (CLI > env > file > defaults)
//! - Configuration validation
//!
//! # Best Practices
//!
//! - Uses `validator` crate for input validation
//! - Follows 12-factor app configuration principles
//! - Never logs secrets when reporting which source changed what

pub mod config;
pub mod file_loader;
pub mod layer;
pub mod loader;
pub mod precedence;
pub mod validation;

pub use config::{ApiConfig, Config, IdentityConfig, ObservabilityConfig};
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use layer::{ApiLayer, ConfigLayer, IdentityLayer, ObservabilityLayer};
pub use loader::{ConfigEnvError, load_from_env};
pub use precedence::merge_configs;
pub use validation::validate;
