use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "solpay.yaml";
const ENV_PREFIX: &str = "SOLPAY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub rpc_endpoint: String,
    pub request_timeout_sec: u64,
    pub history_limit: usize,
    pub confirm_poll_interval_ms: u64,
    pub keypair_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_endpoint: "https://api.devnet.solana.com".to_string(),
            request_timeout_sec: 60,
            history_limit: 10,
            confirm_poll_interval_ms: 500,
            keypair_path: None,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file (the explicit one must exist, `solpay.yaml`
    /// is optional), then `SOLPAY_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .context("Failed to serialize default config")?;

        let file = match path {
            Some(path) => config::File::from(path)
                .format(config::FileFormat::Yaml)
                .required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE)
                .format(config::FileFormat::Yaml)
                .required(false),
        };

        config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to build config")?
            .try_deserialize()
            .context("Failed to deserialize config")
    }
}
