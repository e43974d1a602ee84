use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Empty network key")]
    EmptyNetworkKey,

    #[error("Duplicate network key: {0}")]
    DuplicateNetwork(String),

    #[error("Empty chain key in network {0}")]
    EmptyChainKey(String),

    #[error("Duplicate chain key {chain} in network {network}")]
    DuplicateChain { network: String, chain: String },
}

/// Aggregator service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Public listener for the catalog API
    pub listener: Listener,
    /// Listener for health and readiness probes
    pub admin_listener: Listener,
    /// Upper bound for a single upstream fetch. The transport default applies when unset.
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    /// Configured networks, keyed by network identifier.
    ///
    /// Order is significant: the cross-network listing follows it.
    pub networks: IndexMap<String, NetworkConfig>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        let mut keys = HashSet::new();
        for (key, network) in &self.networks {
            if key.trim().is_empty() {
                return Err(ValidationError::EmptyNetworkKey);
            }
            if !keys.insert(key.to_lowercase()) {
                return Err(ValidationError::DuplicateNetwork(key.clone()));
            }
            network.validate(key)?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// Human readable network name, e.g. "Ethereum"
    pub name: String,
    /// Location of the per-network provider payload
    pub source_url: Url,
    /// Chains known for this network. Used to validate the `chain` query
    /// parameter and to resolve chain display names.
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}

impl NetworkConfig {
    fn validate(&self, network: &str) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for chain in &self.chains {
            if chain.key.trim().is_empty() {
                return Err(ValidationError::EmptyChainKey(network.to_string()));
            }
            if !seen.insert(chain.key.to_lowercase()) {
                return Err(ValidationError::DuplicateChain {
                    network: network.to_string(),
                    chain: chain.key.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ChainConfig {
    /// Internal chain key as it appears in provider records
    pub key: String,
    /// Display name
    pub name: String,
}
