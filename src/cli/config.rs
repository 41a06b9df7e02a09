//! Configuration file handling for the smokecheck CLI
//!
//! Loads optional settings from ~/.smokecheck/config.toml and resolves each
//! run setting from flags, the config file, and the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::client::{Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// CLI configuration stored in ~/.smokecheck/config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the service under test
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Token posted as `keycloak_token` on login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keycloak_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Stable subject identifier of the test user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<Uuid>,
}

impl CliConfig {
    /// Get the default configuration file path (~/.smokecheck/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Unable to determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".smokecheck");
        path.push("config.toml");

        Ok(path)
    }

    /// Load configuration from the default path, or defaults if there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from_path(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Pick the first non-empty value from flag, config file, then environment variable
fn resolve_value(
    setting: &str,
    flag: Option<String>,
    file: Option<String>,
    env_var: &str,
) -> Option<String> {
    if let Some(value) = flag.filter(|v| !v.is_empty()) {
        debug!("Using {} from command line flag", setting);
        return Some(value);
    }

    if let Some(value) = file.filter(|v| !v.is_empty()) {
        debug!("Using {} from config file", setting);
        return Some(value);
    }

    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            debug!("Using {} from {} environment variable", setting, env_var);
            return Some(value);
        }
    }

    None
}

/// Resolve the base URL
///
/// Checks sources in the following priority order:
/// 1. --base-url command line flag
/// 2. config file
/// 3. SMOKECHECK_BASE_URL environment variable
/// 4. Default: http://localhost:5005
pub fn resolve_base_url(flag: Option<String>, config: &CliConfig) -> String {
    resolve_value("base URL", flag, config.base_url.clone(), "SMOKECHECK_BASE_URL")
        .unwrap_or_else(|| {
            debug!("Using default base URL: {}", DEFAULT_BASE_URL);
            DEFAULT_BASE_URL.to_string()
        })
}

/// Resolve the request timeout in seconds
///
/// Checks sources in the following priority order:
/// 1. --timeout command line flag
/// 2. config file
/// 3. SMOKECHECK_TIMEOUT environment variable
/// 4. Default: 30 seconds
pub fn resolve_timeout(flag: Option<u64>, config: &CliConfig) -> Result<u64> {
    if let Some(timeout) = flag.or(config.timeout) {
        debug!("Using timeout: {} seconds", timeout);
        return Ok(timeout);
    }

    if let Ok(value) = std::env::var("SMOKECHECK_TIMEOUT") {
        if !value.is_empty() {
            return value
                .parse()
                .with_context(|| format!("Invalid SMOKECHECK_TIMEOUT value: '{}'", value));
        }
    }

    Ok(DEFAULT_TIMEOUT_SECS)
}

/// Credential overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CredentialFlags {
    pub keycloak_token: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub sub: Option<Uuid>,
}

/// Resolve the login identity, field by field, falling back to the test identity
pub fn resolve_credentials(flags: CredentialFlags, config: &CliConfig) -> Result<Credentials> {
    let defaults = Credentials::default();

    let keycloak_token = resolve_value(
        "keycloak token",
        flags.keycloak_token,
        config.keycloak_token.clone(),
        "SMOKECHECK_KEYCLOAK_TOKEN",
    )
    .unwrap_or(defaults.keycloak_token);

    let email = resolve_value("email", flags.email, config.email.clone(), "SMOKECHECK_EMAIL")
        .unwrap_or(defaults.email);

    let name = resolve_value("name", flags.name, config.name.clone(), "SMOKECHECK_NAME")
        .unwrap_or(defaults.name);

    let sub = match resolve_value(
        "subject",
        flags.sub.map(|s| s.to_string()),
        config.sub.map(|s| s.to_string()),
        "SMOKECHECK_SUB",
    ) {
        Some(value) => Uuid::parse_str(&value)
            .with_context(|| format!("Subject identifier is not a UUID: '{}'", value))?,
        None => defaults.sub,
    };

    Ok(Credentials { keycloak_token, email, name, sub })
}
