/// `load_config` module: reads the optional static YAML file and injects secrets from the environment.
///
/// # Responsibilities
/// - Parse the YAML file (no secrets) into [`StaticConfig`]; every key has a default
/// - Read `SERVICE_ACCOUNT_KEY` (required) and `DATABASE_URL` (required by `migrate` only)
/// - Fail with `Please provide <NAME> environment variable` before any I/O happens
///
/// # Errors
/// All errors use `anyhow::Error` and surface at the CLI boundary.
use anyhow::{Context, Result};
use docs_migrate_core::config::{RunConfig, DEFAULT_PACKAGE_NAME};
use docs_migrate_core::writer::{DEFAULT_MAX_PAGES_PER_GROUP, MAX_PAGES_PER_GROUP_LIMIT};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::credentials::ServiceAccountKey;

pub const SERVICE_ACCOUNT_KEY_VAR: &str = "SERVICE_ACCOUNT_KEY";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticConfig {
    #[serde(default = "default_package_name")]
    pub package_name: String,
    #[serde(default = "default_max_pages_per_group")]
    pub max_pages_per_group: usize,
    #[serde(default = "default_firestore_endpoint")]
    pub firestore_endpoint: String,
}

fn default_package_name() -> String {
    DEFAULT_PACKAGE_NAME.to_string()
}

fn default_max_pages_per_group() -> usize {
    DEFAULT_MAX_PAGES_PER_GROUP
}

fn default_firestore_endpoint() -> String {
    DEFAULT_FIRESTORE_ENDPOINT.to_string()
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            package_name: default_package_name(),
            max_pages_per_group: default_max_pages_per_group(),
            firestore_endpoint: default_firestore_endpoint(),
        }
    }
}

#[derive(Debug)]
pub struct CliConfig {
    pub run: RunConfig,
    pub firestore_endpoint: String,
    pub service_account: ServiceAccountKey,
    database_url: Option<String>,
}

impl CliConfig {
    /// Legacy store endpoint. Only `migrate` needs it.
    pub fn database_url(&self) -> Result<&str> {
        match self.database_url.as_deref() {
            Some(url) => Ok(url),
            None => {
                error!(var = DATABASE_URL_VAR, "Required environment variable not set");
                anyhow::bail!("Please provide {DATABASE_URL_VAR} environment variable")
            }
        }
    }
}

/// Reads a required, non-empty environment variable.
pub fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            error!(var = name, "Required environment variable not set");
            anyhow::bail!("Please provide {name} environment variable")
        }
    }
}

pub fn load_static_config(path: Option<&Path>) -> Result<StaticConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(StaticConfig::default());
    };
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!("Failed to read config file {:?}: {}", path, e));
        }
    };

    // An empty YAML document deserializes to unit, not to an empty map.
    if content.trim().is_empty() {
        return Ok(StaticConfig::default());
    }

    match serde_yaml::from_str::<StaticConfig>(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Loads the static file (if any) and the secrets. `SERVICE_ACCOUNT_KEY` must be set;
/// `DATABASE_URL` is checked later through [`CliConfig::database_url`].
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let static_conf = load_static_config(path)?;

    if !(1..=MAX_PAGES_PER_GROUP_LIMIT).contains(&static_conf.max_pages_per_group) {
        error!(
            max_pages_per_group = static_conf.max_pages_per_group,
            "max_pages_per_group out of range"
        );
        anyhow::bail!(
            "max_pages_per_group must be between 1 and {MAX_PAGES_PER_GROUP_LIMIT}, got {}",
            static_conf.max_pages_per_group
        );
    }
    if static_conf.package_name.trim().is_empty() {
        anyhow::bail!("package_name must not be empty");
    }

    let raw_key = required_env(SERVICE_ACCOUNT_KEY_VAR)?;
    let service_account: ServiceAccountKey = serde_json::from_str(&raw_key)
        .with_context(|| format!("{SERVICE_ACCOUNT_KEY_VAR} is not a valid service account JSON"))?;
    info!(
        project_id = %service_account.project_id,
        client_email = %service_account.client_email,
        "Service account loaded from env"
    );

    let database_url = std::env::var(DATABASE_URL_VAR)
        .ok()
        .filter(|url| !url.trim().is_empty());

    let run = RunConfig {
        package_name: static_conf.package_name,
        max_pages_per_group: static_conf.max_pages_per_group,
    };
    run.trace_loaded();

    Ok(CliConfig {
        run,
        firestore_endpoint: static_conf.firestore_endpoint.trim_end_matches('/').to_string(),
        service_account,
        database_url,
    })
}
