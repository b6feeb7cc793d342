use clap::Parser;
use secrecy::SecretString;

use crate::audit::FailurePolicy;
use crate::config::{Config, DEFAULT_SETTINGS_FILE};

/// Audit the certificates issued by a Vault PKI mount against its CRL
#[derive(Parser, Debug)]
#[command(name = "pki-audit", version, about, long_about = None)]
pub struct Cli {
    /// Vault PKI mount to search through
    #[arg(long = "ca", value_name = "MOUNT")]
    pub mount: Option<String>,

    /// Common name search term
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    /// Override the VAULT_ADDR environment variable
    #[arg(long, value_name = "URL")]
    pub address: Option<String>,

    /// Override the VAULT_TOKEN environment variable
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Settings file, without extension
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE)]
    pub config: String,

    /// Skip certificates that cannot be fetched or decoded instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply(self, config: &mut Config) {
        if let Some(mount) = self.mount {
            config.audit.mount = mount;
        }
        if let Some(search) = self.search {
            config.audit.search = search;
        }
        if let Some(address) = self.address.filter(|a| !a.is_empty()) {
            config.vault.address = address;
        }
        if let Some(token) = self.token.filter(|t| !t.is_empty()) {
            config.vault.token = Some(SecretString::from(token));
        }
        if self.skip_invalid {
            config.audit.failure_policy = FailurePolicy::SkipInvalid;
        }
    }
}
