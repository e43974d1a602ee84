//! Immutable view over the configured networks.
//!
//! Built once at startup and shared by the fetcher, the aggregator and the
//! write path. All lookups are case-insensitive; iteration follows
//! configuration order.

use crate::config::{ChainConfig, NetworkConfig};
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Networks {
    inner: Arc<IndexMap<String, NetworkConfig>>,
}

impl Networks {
    pub fn new(networks: IndexMap<String, NetworkConfig>) -> Self {
        Self {
            inner: Arc::new(networks),
        }
    }

    /// Resolves a network identifier to its configured key and settings.
    pub fn resolve(&self, network: &str) -> Option<(&str, &NetworkConfig)> {
        self.inner
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(network))
            .map(|(key, config)| (key.as_str(), config))
    }

    /// Network keys in configuration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NetworkConfig)> {
        self.inner.iter().map(|(key, config)| (key.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl NetworkConfig {
    /// Looks up a configured chain by key, ignoring case.
    pub fn chain(&self, key: &str) -> Option<&ChainConfig> {
        self.chains
            .iter()
            .find(|chain| chain.key.eq_ignore_ascii_case(key))
    }

    /// Internal chain key for a user-supplied chain parameter, lower-cased.
    /// `None` when the network does not know the chain.
    pub fn resolve_chain_key(&self, requested: &str) -> Option<String> {
        self.chain(requested).map(|chain| chain.key.to_lowercase())
    }
}
