use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of provider categories served by the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryKey {
    #[serde(rename = "rpc")]
    Rpc,
    #[serde(rename = "indexing")]
    Indexing,
    #[serde(rename = "explorer")]
    Explorer,
    #[serde(rename = "oracle")]
    Oracle,
    #[serde(rename = "bridge")]
    Bridge,
    #[serde(rename = "devTool")]
    DevTool,
    #[serde(rename = "faucet")]
    Faucet,
    #[serde(rename = "analytic")]
    Analytic,
    #[serde(rename = "wallet")]
    Wallet,
}

impl CategoryKey {
    /// Every category, in response order.
    pub const ALL: [CategoryKey; 9] = [
        CategoryKey::Rpc,
        CategoryKey::Indexing,
        CategoryKey::Explorer,
        CategoryKey::Oracle,
        CategoryKey::Bridge,
        CategoryKey::DevTool,
        CategoryKey::Faucet,
        CategoryKey::Analytic,
        CategoryKey::Wallet,
    ];

    /// Key used in upstream payloads and API responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::Rpc => "rpc",
            CategoryKey::Indexing => "indexing",
            CategoryKey::Explorer => "explorer",
            CategoryKey::Oracle => "oracle",
            CategoryKey::Bridge => "bridge",
            CategoryKey::DevTool => "devTool",
            CategoryKey::Faucet => "faucet",
            CategoryKey::Analytic => "analytic",
            CategoryKey::Wallet => "wallet",
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for CategoryKey {
    type Err = UnknownCategory;

    /// Matches the wire key, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
