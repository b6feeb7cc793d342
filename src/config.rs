use std::{collections::HashMap, path::PathBuf, time::Duration};

use config::{Config as ConfigLib, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

use crate::audit::FailurePolicy;
use crate::pki::VaultSettings;

pub const DEFAULT_SETTINGS_FILE: &str = "config/settings";

/// Standard Vault client variables and the settings they feed.
const VAULT_ENV: [(&str, &str); 5] = [
    ("VAULT_ADDR", "vault.address"),
    ("VAULT_TOKEN", "vault.token"),
    ("VAULT_NAMESPACE", "vault.namespace"),
    ("VAULT_CACERT", "vault.ca_cert"),
    ("VAULT_SKIP_VERIFY", "vault.skip_verify"),
];

/// Read as a duration: bare seconds (`30`) or unit-suffixed (`30s`, `1m30s`).
const VAULT_TIMEOUT_ENV: &str = "VAULT_CLIENT_TIMEOUT";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub vault: VaultConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    pub address: String,
    #[serde(default)]
    pub token: Option<SecretString>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
    pub skip_verify: bool,
    pub timeout_secs: u64,
}

impl VaultConfig {
    pub fn settings(&self) -> VaultSettings {
        VaultSettings {
            address: self.address.clone(),
            token: self.token.clone(),
            namespace: self.namespace.clone(),
            ca_cert: self.ca_cert.clone(),
            skip_verify: self.skip_verify,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// PKI mount of the authority to audit
    pub mount: String,
    /// Common name search term
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Config {
    pub fn load_with_sources(
        settings_file: &str,
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("vault.address", "https://127.0.0.1:8200")?
            .set_default("vault.skip_verify", false)?
            .set_default("vault.timeout_secs", 60)?
            .set_default("audit.mount", "pki")?
            .set_default("audit.search", "")?
            .set_default("audit.failure_policy", "fail-fast")?
            .add_source(File::with_name(settings_file).required(false));

        // If env_vars is provided, we use it instead of system environment
        // This is to avoid systems variables pollution across tests
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // Should be in the format APP_VAULT__ADDRESS or APP_AUDIT__MOUNT
            builder = builder.add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );
            for (var, key) in VAULT_ENV {
                builder = builder.set_override_option(key, non_empty_var(var))?;
            }
            if let Some(raw) = non_empty_var(VAULT_TIMEOUT_ENV) {
                let secs = parse_duration_secs(&raw).ok_or_else(|| {
                    ConfigError::Message(format!("invalid {VAULT_TIMEOUT_ENV} `{raw}`"))
                })?;
                builder = builder.set_override("vault.timeout_secs", secs.to_string())?;
            }
        }

        builder.build()?.try_deserialize()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parses `90`, `90s`, `2m`, `1h` or combinations such as `1m30s` into
/// whole seconds.
pub fn parse_duration_secs(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse() {
        return Some(secs);
    }

    let mut total: u64 = 0;
    let mut rest = value;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits == 0 {
            return None;
        }
        let amount: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let factor = match &rest[..unit_len] {
            "h" => 3600,
            "m" => 60,
            "s" => 1,
            _ => return None,
        };
        total = total.checked_add(amount.checked_mul(factor)?)?;
        rest = &rest[unit_len..];
    }
    Some(total)
}
