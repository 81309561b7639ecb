//! Configuration management for the minter
//!
//! Settings come from the process environment, which `main` first fills in
//! from a `.env` file when one is present. The chain registry is a JSON
//! file with environment variable substitution.

use crate::error::{MinterError, MinterResult};

use ethers::types::{Address, H256};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the signing key
pub const PRIVATE_KEY_ENV: &str = "PRIVATE";
/// Environment variable holding an optional `host:port` HTTP proxy
pub const PROXY_ENV: &str = "PROXY";

pub const DEFAULT_CHAINS_FILE: &str = "chains.json";
pub const DEFAULT_ABI_FILE: &str = "l2_pass_abi.json";
/// L2Pass NFT contract
pub const DEFAULT_CONTRACT: &str = "0x0000049F63Ef0D60aBE49fdD8BEbfa5a68822222";

pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 100;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

lazy_static! {
    static ref ENV_VAR_PATTERN: Regex = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
}

/// Root configuration structure
#[derive(Clone)]
pub struct Settings {
    pub chains_file: PathBuf,
    pub abi_file: PathBuf,
    pub contract_address: Address,
    pub private_key: Option<String>,
    pub proxy: Option<String>,
    pub poll: PollConfig,
    /// Upper bound on the total payment of one mint, in native currency
    pub max_spend: Option<f64>,
}

// The key must never reach the logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("chains_file", &self.chains_file)
            .field("abi_file", &self.abi_file)
            .field("contract_address", &self.contract_address)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("proxy", &self.proxy)
            .field("poll", &self.poll)
            .field("max_spend", &self.max_spend)
            .finish()
    }
}

/// Receipt polling budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Total time a transaction may stay unseen before giving up
    pub timeout: Duration,
    /// Sleep between two receipt queries
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_RECEIPT_TIMEOUT_SECS),
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl Settings {
    /// Load settings from the process environment
    pub fn load() -> MinterResult<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> MinterResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let contract = non_empty("MINTER_CONTRACT").unwrap_or_else(|| DEFAULT_CONTRACT.to_string());
        let contract_address: Address = contract.parse().map_err(|e| {
            MinterError::Config(format!("Invalid contract address {}: {}", contract, e))
        })?;

        let secs = |key: &str, default: u64| -> MinterResult<Duration> {
            match non_empty(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| MinterError::Config(format!("Invalid {}: {}", key, e))),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let poll = PollConfig {
            timeout: secs("MINTER_RECEIPT_TIMEOUT_SECS", DEFAULT_RECEIPT_TIMEOUT_SECS)?,
            interval: secs("MINTER_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?,
        };
        if poll.interval.is_zero() {
            return Err(MinterError::Config(
                "MINTER_POLL_INTERVAL_SECS must be positive".to_string(),
            ));
        }

        let max_spend = non_empty("MINTER_MAX_SPEND")
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|e| MinterError::Config(format!("Invalid MINTER_MAX_SPEND: {}", e)))
            })
            .transpose()?;

        Ok(Self {
            chains_file: non_empty("MINTER_CHAINS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHAINS_FILE)),
            abi_file: non_empty("MINTER_ABI_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ABI_FILE)),
            contract_address,
            private_key: lookup(PRIVATE_KEY_ENV),
            proxy: non_empty(PROXY_ENV),
            poll,
            max_spend,
        })
    }
}

/// A single chain entry of the registry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChainConfig {
    /// Registry key, filled in after parsing
    #[serde(skip)]
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
}

impl ChainConfig {
    /// Explorer link for a transaction: `<explorer_url>tx/0x<hash>`
    pub fn tx_url(&self, tx_hash: H256) -> String {
        format!("{}tx/0x{}", self.explorer_url, hex::encode(tx_hash))
    }
}

/// Chain name -> endpoints, loaded once at startup
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<String, ChainConfig>,
}

impl ChainRegistry {
    /// Load and validate the registry file
    pub fn load(path: &Path) -> MinterResult<Self> {
        let raw = read_file(path)?;
        let registry = Self::parse(&substitute_env_vars(&raw))?;
        tracing::debug!(path = ?path, chains = registry.chains.len(), "Loaded chain registry");
        Ok(registry)
    }

    /// Parse registry JSON
    pub fn parse(json: &str) -> MinterResult<Self> {
        let mut chains: BTreeMap<String, ChainConfig> = serde_json::from_str(json)
            .map_err(|e| MinterError::Config(format!("Failed to parse chain registry: {}", e)))?;

        for (name, chain) in chains.iter_mut() {
            chain.name = name.clone();
        }

        let registry = Self { chains };
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> MinterResult<()> {
        if self.chains.is_empty() {
            return Err(MinterError::Config(
                "Chain registry contains no chains".to_string(),
            ));
        }

        for (name, chain) in &self.chains {
            url::Url::parse(&chain.rpc_url).map_err(|e| {
                MinterError::Config(format!("Chain {} has invalid rpc_url: {}", name, e))
            })?;
            if chain.explorer_url.is_empty() {
                return Err(MinterError::Config(format!(
                    "Chain {} has no explorer_url configured",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Chain names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.chains.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.get(name)
    }
}

/// Read a whole file, reporting a missing one distinctly
pub fn read_file(path: &Path) -> MinterResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MinterError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => MinterError::Config(format!("Failed to read {}: {}", path.display(), e)),
    })
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures<'_>| {
            env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
