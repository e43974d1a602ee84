//! Category aggregation across one or all configured networks.

use crate::category::CategoryKey;
use crate::errors::AggregatorError;
use crate::fetcher::PayloadSource;
use crate::metrics_defs::RPC_LISTING_SKIPPED;
use crate::networks::Networks;
use crate::normalize::{filter_by_chain, normalize_entity};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::counter;
use std::sync::Arc;
use tokio::task::JoinSet;

/// One provider record. Upstream records are not validated; absent fields
/// stay absent.
pub type Entity = Value;

const UNKNOWN_CHAIN: &str = "Unknown";

/// Entities per category, in source order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvidersMap(pub IndexMap<CategoryKey, Vec<Entity>>);

impl ProvidersMap {
    pub fn get(&self, category: CategoryKey) -> &[Entity] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = CategoryKey> + '_ {
        self.0.keys().copied()
    }

    pub fn into_inner(self) -> IndexMap<CategoryKey, Vec<Entity>> {
        self.0
    }
}

/// An RPC entity tagged with the network it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcListing {
    pub network: String,
    #[serde(rename = "networkName")]
    pub network_name: String,
    /// Chain display name
    pub chain: String,
    pub rpc: Entity,
}

#[derive(Clone)]
pub struct Aggregator {
    networks: Networks,
    source: Arc<dyn PayloadSource>,
}

impl Aggregator {
    pub fn new(networks: Networks, source: Arc<dyn PayloadSource>) -> Self {
        Self { networks, source }
    }

    pub fn networks(&self) -> &Networks {
        &self.networks
    }

    /// Providers of one network, for one category or all of them.
    ///
    /// An unrecognised `category` is ignored and every category is returned.
    /// A `chain` that the network does not know is ignored as well.
    pub async fn providers(
        &self,
        network: &str,
        category: Option<&str>,
        chain: Option<&str>,
    ) -> Result<ProvidersMap, AggregatorError> {
        let (key, config) = self
            .networks
            .resolve(network)
            .ok_or_else(|| AggregatorError::Configuration(network.to_string()))?;

        let chain_key = chain.and_then(|requested| {
            let resolved = config.resolve_chain_key(requested);
            if resolved.is_none() {
                tracing::debug!(network = key, chain = requested, "Ignoring unknown chain");
            }
            resolved
        });

        let categories = match category.map(str::parse::<CategoryKey>) {
            Some(Ok(category)) => vec![category],
            Some(Err(e)) => {
                tracing::debug!(network = key, error = %e, "Ignoring category filter");
                CategoryKey::ALL.to_vec()
            }
            None => CategoryKey::ALL.to_vec(),
        };

        let mut payload = self.source.fetch(key).await?;

        let mut result = IndexMap::with_capacity(categories.len());
        for category in categories {
            let entities = match payload.remove(category.as_str()) {
                Some(Value::Array(entities)) => entities,
                Some(_) => {
                    tracing::warn!(network = key, %category, "Category payload is not an array");
                    Vec::new()
                }
                None => Vec::new(),
            };

            let normalized = entities.into_iter().map(normalize_entity).collect();
            result.insert(category, filter_by_chain(normalized, chain_key.as_deref()));
        }

        Ok(ProvidersMap(result))
    }

    /// RPC providers of every configured network, flattened.
    ///
    /// Networks are fetched concurrently. A network that fails is logged and
    /// left out; the listing itself never fails. Output follows network
    /// configuration order, then source order.
    pub async fn rpc_listing(&self) -> Vec<RpcListing> {
        let mut join_set = JoinSet::new();

        for (index, network) in self.networks.keys().enumerate() {
            let aggregator = self.clone();
            let network = network.to_string();
            join_set.spawn(async move {
                let result = aggregator
                    .providers(&network, Some(CategoryKey::Rpc.as_str()), None)
                    .await;
                (index, network, result)
            });
        }

        let mut per_network = Vec::with_capacity(self.networks.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, network, Ok(providers))) => {
                    per_network.push((index, network, providers));
                }
                Ok((_, network, Err(e))) => {
                    counter!(RPC_LISTING_SKIPPED).increment(1);
                    tracing::warn!(network = %network, error = %e, "Skipping network in RPC listing");
                }
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
        per_network.sort_by_key(|(index, _, _)| *index);

        per_network
            .into_iter()
            .flat_map(|(_, network, providers)| self.tag_rpcs(&network, providers))
            .collect()
    }

    fn tag_rpcs(&self, network: &str, providers: ProvidersMap) -> Vec<RpcListing> {
        let Some((key, config)) = self.networks.resolve(network) else {
            return Vec::new();
        };

        providers
            .into_inner()
            .swap_remove(&CategoryKey::Rpc)
            .unwrap_or_default()
            .into_iter()
            .map(|rpc| {
                let chain = match rpc.get("chain").and_then(Value::as_str) {
                    Some(raw) => config
                        .chain(raw)
                        .map(|chain| chain.name.clone())
                        .unwrap_or_else(|| raw.to_string()),
                    None => UNKNOWN_CHAIN.to_string(),
                };

                RpcListing {
                    network: key.to_string(),
                    network_name: config.name.clone(),
                    chain,
                    rpc,
                }
            })
            .collect()
    }
}
