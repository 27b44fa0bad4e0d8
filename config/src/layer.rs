//! # Partial Configuration Layers
//!
//! Env vars and CLI flags only know what they set. A [`ConfigLayer`] keeps
//! that distinction: `None` means "not given here", so a source that
//! explicitly sets a field back to its default still wins over lower layers.

use std::path::PathBuf;

use crate::config::{ApiConfig, Config, IdentityConfig, ObservabilityConfig};

/// Fields one source explicitly sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub api: ApiLayer,
    pub identity: IdentityLayer,
    pub observability: ObservabilityLayer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiLayer {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityLayer {
    pub api_key: Option<String>,
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub federated_provider: Option<String>,
    pub federated_id_token: Option<String>,
    pub refresh_margin_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityLayer {
    pub log_level: Option<String>,
}

impl ConfigLayer {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The fields of `config` that differ from `base`.
    ///
    /// A parsed file carries serde defaults for everything it omits, so only
    /// its departures from `base` count as set.
    pub fn changes_from(base: &Config, config: &Config) -> Self {
        let Config {
            api,
            identity,
            observability,
        } = config;
        Self {
            api: ApiLayer {
                base_url: differs(&base.api.base_url, &api.base_url),
                timeout_seconds: differs(&base.api.timeout_seconds, &api.timeout_seconds)
                    .flatten(),
            },
            identity: IdentityLayer {
                api_key: differs(&base.identity.api_key, &identity.api_key),
                auth_url: differs(&base.identity.auth_url, &identity.auth_url),
                token_url: differs(&base.identity.token_url, &identity.token_url),
                session_file: differs(&base.identity.session_file, &identity.session_file)
                    .flatten(),
                federated_provider: differs(
                    &base.identity.federated_provider,
                    &identity.federated_provider,
                ),
                federated_id_token: differs(
                    &base.identity.federated_id_token,
                    &identity.federated_id_token,
                )
                .flatten(),
                refresh_margin_seconds: differs(
                    &base.identity.refresh_margin_seconds,
                    &identity.refresh_margin_seconds,
                ),
            },
            observability: ObservabilityLayer {
                log_level: differs(&base.observability.log_level, &observability.log_level),
            },
        }
    }

    /// Write every set field into `config`, returning what changed.
    ///
    /// Secrets are reported by name only.
    pub fn apply_to(&self, config: &mut Config) -> Vec<String> {
        let mut changes = Vec::new();
        self.api.apply_to(&mut config.api, &mut changes);
        self.identity.apply_to(&mut config.identity, &mut changes);
        self.observability
            .apply_to(&mut config.observability, &mut changes);
        changes
    }
}

impl ApiLayer {
    fn apply_to(&self, api: &mut ApiConfig, changes: &mut Vec<String>) {
        set("api.base_url", &mut api.base_url, &self.base_url, changes);
        set_some(
            "api.timeout_seconds",
            &mut api.timeout_seconds,
            &self.timeout_seconds,
            changes,
        );
    }
}

impl IdentityLayer {
    fn apply_to(&self, identity: &mut IdentityConfig, changes: &mut Vec<String>) {
        if let Some(api_key) = &self.api_key {
            if *api_key != identity.api_key {
                changes.push("identity.api_key = ***".to_string());
            }
            identity.api_key.clone_from(api_key);
        }
        set("identity.auth_url", &mut identity.auth_url, &self.auth_url, changes);
        set("identity.token_url", &mut identity.token_url, &self.token_url, changes);
        set_some(
            "identity.session_file",
            &mut identity.session_file,
            &self.session_file,
            changes,
        );
        set(
            "identity.federated_provider",
            &mut identity.federated_provider,
            &self.federated_provider,
            changes,
        );
        if let Some(assertion) = &self.federated_id_token {
            if identity.federated_id_token.as_ref() != Some(assertion) {
                changes.push("identity.federated_id_token = ***".to_string());
            }
            identity.federated_id_token = Some(assertion.clone());
        }
        set(
            "identity.refresh_margin_seconds",
            &mut identity.refresh_margin_seconds,
            &self.refresh_margin_seconds,
            changes,
        );
    }
}

impl ObservabilityLayer {
    fn apply_to(&self, observability: &mut ObservabilityConfig, changes: &mut Vec<String>) {
        set(
            "observability.log_level",
            &mut observability.log_level,
            &self.log_level,
            changes,
        );
    }
}

fn differs<T: Clone + PartialEq>(base: &T, value: &T) -> Option<T> {
    (base != value).then(|| value.clone())
}

fn set<T>(name: &str, slot: &mut T, value: &Option<T>, changes: &mut Vec<String>)
where
    T: Clone + PartialEq + std::fmt::Debug,
{
    if let Some(value) = value {
        if slot != value {
            changes.push(format!("{name} = {value:?}"));
        }
        slot.clone_from(value);
    }
}

fn set_some<T>(name: &str, slot: &mut Option<T>, value: &Option<T>, changes: &mut Vec<String>)
where
    T: Clone + PartialEq + std::fmt::Debug,
{
    if let Some(value) = value {
        if slot.as_ref() != Some(value) {
            changes.push(format!("{name} = {value:?}"));
        }
        *slot = Some(value.clone());
    }
}
