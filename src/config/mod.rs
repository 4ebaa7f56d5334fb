use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::infrastructure::ethereum::{ProviderConfig, WalletOptions};

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_PRIVATE_KEY_ENV: &str = "TRACHY_PRIVATE_KEY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: EndpointConfig,
    pub wallet: WalletConfig,
    pub price: PriceConfig,
    pub logging: LoggingConfig,
}

/// Node to talk to. `ws` wins over `rpc` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub rpc: Option<String>,
    pub ws: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignerMode {
    /// Local key if the key variable is set, node accounts otherwise
    #[default]
    Auto,
    /// Unlocked accounts managed by the node
    Node,
    /// Private key from the environment; fail if missing
    LocalKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub signer: SignerMode,
    /// Name of the environment variable holding the private key.
    pub private_key_env: String,
    /// Index into the node's `eth_accounts` when signing with node accounts.
    pub account_index: usize,
    /// How often to poll for account and chain changes.
    pub event_poll_ms: u64,
    /// How often to poll for a transaction receipt.
    pub receipt_poll_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            signer: SignerMode::Auto,
            private_key_env: DEFAULT_PRIVATE_KEY_ENV.to_string(),
            account_index: 0,
            event_poll_ms: 1000,
            receipt_poll_ms: 500,
        }
    }
}

impl WalletConfig {
    pub fn options(&self) -> WalletOptions {
        WalletOptions {
            signer: self.signer,
            private_key_env: self.private_key_env.clone(),
            account_index: self.account_index,
            event_poll: Duration::from_millis(self.event_poll_ms),
            receipt_poll: Duration::from_millis(self.receipt_poll_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    /// Fixed seed for the simulated price series; random when unset.
    pub seed: Option<u64>,
    pub tick_secs: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Log file for the terminal UI; defaults to `<data dir>/trachy.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Endpoint from the file, falling back to the local dev node.
    pub fn provider_config(&self) -> ProviderConfig {
        if let Some(ws) = self.endpoint.ws.as_ref().filter(|s| !s.trim().is_empty()) {
            return ProviderConfig::WebSocket(ws.trim().to_string());
        }
        let rpc = self
            .endpoint
            .rpc
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        ProviderConfig::Http(rpc)
    }

    pub fn price_tick(&self) -> Duration {
        Duration::from_secs(self.price.tick_secs.max(1))
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.logging
            .file
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("trachy.log")))
    }
}

/// Load the config from the default location. A missing file yields the
/// defaults; an unreadable or malformed one is an error.
pub fn load() -> anyhow::Result<Config> {
    match config_path() {
        Some(path) => load_from(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> anyhow::Result<Config> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    toml::from_str::<Config>(&content).with_context(|| format!("invalid config {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TRACHY_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("trachy").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("trachy").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "trachy", "trachy")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("trachy"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("trachy"));
    }
    directories::ProjectDirs::from("io", "trachy", "trachy")
        .map(|dirs| dirs.data_dir().to_path_buf())
}
