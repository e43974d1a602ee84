//! Typed provider records, one variant per category.
//!
//! Upstream records are accepted permissively: every field is optional and a
//! field with an unexpected shape reads as absent instead of rejecting the
//! record.

use aggregator::{CategoryKey, ProvidersMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single field of a record, as seen by filters, search and sorting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Flag(bool),
    List(&'a [String]),
}

pub(crate) trait AsFieldValue {
    fn as_field_value(&self) -> FieldValue<'_>;
}

impl AsFieldValue for Option<String> {
    fn as_field_value(&self) -> FieldValue<'_> {
        self.as_deref().map_or(FieldValue::Absent, FieldValue::Text)
    }
}

impl AsFieldValue for Option<bool> {
    fn as_field_value(&self) -> FieldValue<'_> {
        self.map_or(FieldValue::Absent, FieldValue::Flag)
    }
}

impl AsFieldValue for Option<Vec<String>> {
    fn as_field_value(&self) -> FieldValue<'_> {
        self.as_deref().map_or(FieldValue::Absent, FieldValue::List)
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub trait Lenient: Sized {
        fn from_json(value: Value) -> Option<Self>;
    }

    impl Lenient for String {
        fn from_json(value: Value) -> Option<Self> {
            match value {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        }
    }

    impl Lenient for bool {
        fn from_json(value: Value) -> Option<Self> {
            match value {
                Value::Bool(b) => Some(b),
                Value::Number(n) => n.as_i64().map(|n| n != 0),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => Some(true),
                    "false" | "no" | "0" | "" => Some(false),
                    _ => None,
                },
                _ => None,
            }
        }
    }

    impl Lenient for Vec<String> {
        fn from_json(value: Value) -> Option<Self> {
            match value {
                Value::Array(items) => Some(items.into_iter().filter_map(String::from_json).collect()),
                // Canonical files store arrays as JSON literals; legacy records join with commas.
                Value::String(s) if s.trim_start().starts_with('[') => {
                    serde_json::from_str::<Value>(&s).ok().and_then(Self::from_json)
                }
                Value::String(s) => Some(
                    s.split(',')
                        .map(str::trim)
                        .filter(|token| !token.is_empty())
                        .map(String::from)
                        .collect(),
                ),
                _ => None,
            }
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Lenient,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(T::from_json))
    }
}

/// Declares a category record. Every record carries `slug`, `provider`,
/// `chain`, `starred` and `actionButtons` on top of its own fields.
macro_rules! provider_record {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $field:ident: $ty:ty => $key:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::deserialize")]
            pub slug: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::deserialize")]
            pub provider: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::deserialize")]
            pub chain: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::deserialize")]
            pub starred: Option<bool>,
            #[serde(rename = "actionButtons", default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::deserialize")]
            pub action_buttons: Option<Vec<String>>,
            $(
                #[serde(rename = $key, default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::deserialize")]
                pub $field: Option<$ty>,
            )*
        }

        impl $name {
            fn value(&self, key: &str) -> FieldValue<'_> {
                match key {
                    "slug" => self.slug.as_field_value(),
                    "provider" => self.provider.as_field_value(),
                    "chain" => self.chain.as_field_value(),
                    "starred" => self.starred.as_field_value(),
                    "actionButtons" => self.action_buttons.as_field_value(),
                    $( $key => self.$field.as_field_value(), )*
                    _ => FieldValue::Absent,
                }
            }
        }
    };
}

provider_record! {
    /// Node/RPC endpoint plan.
    RpcProvider {
        plan: String => "plan",
        node_type: String => "nodeType",
        access_price: String => "accessPrice",
        query_price: String => "queryPrice",
        uptime_sla: String => "uptimeSla",
        bandwidth_sla: String => "bandwidthSla",
        blocks_behind_sla: String => "blocksBehindSla",
        trial: bool => "trial",
        available_apis: Vec<String> => "availableApis",
        limitations: Vec<String> => "limitations",
        security_improvements: Vec<String> => "securityImprovements",
        monitoring_and_analytics: Vec<String> => "monitoringAndAnalytics",
        regions: Vec<String> => "regions",
        verified_uptime: String => "verifiedUptime",
        verified_latency: String => "verifiedLatency",
        verified_blocks_behind_avg: String => "verifiedBlocksBehindAvg",
        address: String => "address",
    }
}

provider_record! {
    IndexingProvider {
        plan: String => "plan",
        pricing: String => "pricing",
        query_language: String => "queryLanguage",
        historical_data: bool => "historicalData",
        real_time: bool => "realTime",
        free_tier: bool => "freeTier",
        supported_data: Vec<String> => "supportedData",
        apis: Vec<String> => "apis",
    }
}

provider_record! {
    ExplorerProvider {
        pricing: String => "pricing",
        api_available: bool => "apiAvailable",
        open_source: bool => "openSource",
        features: Vec<String> => "features",
    }
}

provider_record! {
    OracleProvider {
        oracle_type: String => "oracleType",
        update_frequency: String => "updateFrequency",
        pricing: String => "pricing",
        decentralized: bool => "decentralized",
        data_feeds: Vec<String> => "dataFeeds",
    }
}

provider_record! {
    BridgeProvider {
        fee: String => "fee",
        finality_time: String => "finalityTime",
        security_model: String => "securityModel",
        destination_chains: Vec<String> => "destinationChains",
        tokens: Vec<String> => "tokens",
    }
}

provider_record! {
    DevToolProvider {
        tool_type: String => "toolType",
        pricing: String => "pricing",
        open_source: bool => "openSource",
        languages: Vec<String> => "languages",
    }
}

provider_record! {
    FaucetProvider {
        amount_per_request: String => "amountPerRequest",
        cooldown: String => "cooldown",
        requires_auth: bool => "requiresAuth",
        tokens: Vec<String> => "tokens",
    }
}

provider_record! {
    AnalyticProvider {
        pricing: String => "pricing",
        real_time: bool => "realTime",
        api_access: bool => "apiAccess",
        data_sources: Vec<String> => "dataSources",
        features: Vec<String> => "features",
    }
}

provider_record! {
    WalletProvider {
        wallet_type: String => "walletType",
        custody: String => "custody",
        multisig: bool => "multisig",
        hardware_support: bool => "hardwareSupport",
        platforms: Vec<String> => "platforms",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Rpc(RpcProvider),
    Indexing(IndexingProvider),
    Explorer(ExplorerProvider),
    Oracle(OracleProvider),
    Bridge(BridgeProvider),
    DevTool(DevToolProvider),
    Faucet(FaucetProvider),
    Analytic(AnalyticProvider),
    Wallet(WalletProvider),
}

macro_rules! with_record {
    ($entity:expr, $record:ident => $body:expr) => {
        match $entity {
            Entity::Rpc($record) => $body,
            Entity::Indexing($record) => $body,
            Entity::Explorer($record) => $body,
            Entity::Oracle($record) => $body,
            Entity::Bridge($record) => $body,
            Entity::DevTool($record) => $body,
            Entity::Faucet($record) => $body,
            Entity::Analytic($record) => $body,
            Entity::Wallet($record) => $body,
        }
    };
}

impl Entity {
    /// Parses an upstream record into the shape of `category`.
    ///
    /// Only fails when the record is not a JSON object.
    pub fn from_json(category: CategoryKey, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match category {
            CategoryKey::Rpc => Entity::Rpc(serde_json::from_value(value)?),
            CategoryKey::Indexing => Entity::Indexing(serde_json::from_value(value)?),
            CategoryKey::Explorer => Entity::Explorer(serde_json::from_value(value)?),
            CategoryKey::Oracle => Entity::Oracle(serde_json::from_value(value)?),
            CategoryKey::Bridge => Entity::Bridge(serde_json::from_value(value)?),
            CategoryKey::DevTool => Entity::DevTool(serde_json::from_value(value)?),
            CategoryKey::Faucet => Entity::Faucet(serde_json::from_value(value)?),
            CategoryKey::Analytic => Entity::Analytic(serde_json::from_value(value)?),
            CategoryKey::Wallet => Entity::Wallet(serde_json::from_value(value)?),
        })
    }

    pub fn category(&self) -> CategoryKey {
        match self {
            Entity::Rpc(_) => CategoryKey::Rpc,
            Entity::Indexing(_) => CategoryKey::Indexing,
            Entity::Explorer(_) => CategoryKey::Explorer,
            Entity::Oracle(_) => CategoryKey::Oracle,
            Entity::Bridge(_) => CategoryKey::Bridge,
            Entity::DevTool(_) => CategoryKey::DevTool,
            Entity::Faucet(_) => CategoryKey::Faucet,
            Entity::Analytic(_) => CategoryKey::Analytic,
            Entity::Wallet(_) => CategoryKey::Wallet,
        }
    }

    pub fn provider(&self) -> Option<&str> {
        with_record!(self, record => record.provider.as_deref())
    }

    pub fn chain(&self) -> Option<&str> {
        with_record!(self, record => record.chain.as_deref())
    }

    /// Only an explicit `true` counts as starred.
    pub fn is_starred(&self) -> bool {
        with_record!(self, record => record.starred == Some(true))
    }

    /// Value of the field with wire key `key`. Unknown keys read as absent.
    pub fn value(&self, key: &str) -> FieldValue<'_> {
        with_record!(self, record => record.value(key))
    }
}

/// Typed entities per category, as received from the read endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    categories: IndexMap<CategoryKey, Vec<Entity>>,
}

impl Catalog {
    /// Converts a raw providers map. Records that are not objects are dropped.
    pub fn from_providers(providers: ProvidersMap) -> Self {
        let categories = providers
            .into_inner()
            .into_iter()
            .map(|(category, records)| {
                let entities = records
                    .into_iter()
                    .filter_map(|record| match Entity::from_json(category, record) {
                        Ok(entity) => Some(entity),
                        Err(e) => {
                            tracing::debug!(%category, error = %e, "Dropping malformed record");
                            None
                        }
                    })
                    .collect();
                (category, entities)
            })
            .collect();

        Self { categories }
    }

    pub fn entities(&self, category: CategoryKey) -> &[Entity] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = CategoryKey> + '_ {
        self.categories.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rpc_record_fields() {
        let entity = Entity::from_json(
            CategoryKey::Rpc,
            json!({
                "provider": "Alchemy",
                "chain": "mainnet",
                "plan": "Growth",
                "starred": "TRUE",
                "trial": false,
                "queryPrice": 0.5,
                "availableApis": ["eth", "net"],
                "regions": "us-east, eu-west",
                "limitations": "[\"rate limited\"]",
                "unknownField": 42,
            }),
        )
        .unwrap();

        assert_eq!(entity.category(), CategoryKey::Rpc);
        assert_eq!(entity.provider(), Some("Alchemy"));
        assert!(entity.is_starred());
        assert_eq!(entity.value("plan"), FieldValue::Text("Growth"));
        assert_eq!(entity.value("trial"), FieldValue::Flag(false));
        assert_eq!(entity.value("queryPrice"), FieldValue::Text("0.5"));
        assert_eq!(
            entity.value("availableApis"),
            FieldValue::List(&["eth".to_string(), "net".to_string()])
        );
        assert_eq!(
            entity.value("regions"),
            FieldValue::List(&["us-east".to_string(), "eu-west".to_string()])
        );
        assert_eq!(
            entity.value("limitations"),
            FieldValue::List(&["rate limited".to_string()])
        );
        assert_eq!(entity.value("unknownField"), FieldValue::Absent);
        assert_eq!(entity.value("address"), FieldValue::Absent);
    }

    #[test]
    fn test_malformed_fields_read_as_absent() {
        let entity = Entity::from_json(
            CategoryKey::Wallet,
            json!({
                "provider": ["not", "a", "string"],
                "multisig": "sometimes",
                "platforms": {"ios": true},
                "starred": null,
            }),
        )
        .unwrap();

        assert_eq!(entity.provider(), None);
        assert!(!entity.is_starred());
        assert_eq!(entity.value("multisig"), FieldValue::Absent);
        assert_eq!(entity.value("platforms"), FieldValue::Absent);
    }

    #[test]
    fn test_non_object_record_is_rejected() {
        assert!(Entity::from_json(CategoryKey::Oracle, json!("chainlink")).is_err());
    }

    #[test]
    fn test_catalog_drops_only_malformed_records() {
        let providers: ProvidersMap = serde_json::from_value(json!({
            "rpc": [{"provider": "Alchemy"}, 7, {"provider": "Infura"}],
            "faucet": [],
        }))
        .unwrap();

        let catalog = Catalog::from_providers(providers);
        let providers: Vec<_> = catalog
            .entities(CategoryKey::Rpc)
            .iter()
            .map(Entity::provider)
            .collect();

        assert_eq!(providers, vec![Some("Alchemy"), Some("Infura")]);
        assert!(catalog.entities(CategoryKey::Faucet).is_empty());
        assert!(catalog.entities(CategoryKey::Bridge).is_empty());
        assert_eq!(
            catalog.categories().collect::<Vec<_>>(),
            vec![CategoryKey::Rpc, CategoryKey::Faucet]
        );
    }
}
