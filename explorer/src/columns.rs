//! Column metadata per category.
//!
//! Column ids are the wire keys of the underlying record fields.

use aggregator::CategoryKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a column can be filtered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// Numeric threshold, passes when the value is at least the threshold
    Range,
    /// Single value, or Yes/No for boolean fields
    Select,
    /// Any of a set of values
    MultiSelect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnDef {
    pub id: &'static str,
    pub header: &'static str,
    pub filter: Option<FilterKind>,
    pub visible_by_default: bool,
}

const fn column(id: &'static str, header: &'static str) -> ColumnDef {
    ColumnDef {
        id,
        header,
        filter: None,
        visible_by_default: true,
    }
}

impl ColumnDef {
    const fn range(mut self) -> Self {
        self.filter = Some(FilterKind::Range);
        self
    }

    const fn select(mut self) -> Self {
        self.filter = Some(FilterKind::Select);
        self
    }

    const fn multi(mut self) -> Self {
        self.filter = Some(FilterKind::MultiSelect);
        self
    }

    const fn hidden(mut self) -> Self {
        self.visible_by_default = false;
        self
    }
}

static RPC_COLUMNS: &[ColumnDef] = &[
    column("provider", "Provider"),
    column("plan", "Plan"),
    column("nodeType", "Node Type").select(),
    column("chain", "Chain").select(),
    column("accessPrice", "Access Price").range(),
    column("queryPrice", "Query Price").range(),
    column("uptimeSla", "Uptime SLA").range(),
    column("bandwidthSla", "Bandwidth SLA").range().hidden(),
    column("blocksBehindSla", "Blocks Behind SLA").range().hidden(),
    column("trial", "Trial").select(),
    column("availableApis", "Available APIs").multi(),
    column("limitations", "Limitations").multi().hidden(),
    column("securityImprovements", "Security").multi().hidden(),
    column("monitoringAndAnalytics", "Monitoring").multi().hidden(),
    column("regions", "Regions").multi(),
    column("verifiedUptime", "Verified Uptime").range().hidden(),
    column("verifiedLatency", "Verified Latency").range().hidden(),
    column("verifiedBlocksBehindAvg", "Verified Blocks Behind").range().hidden(),
    column("address", "Address").hidden(),
    column("slug", "Slug").hidden(),
    column("actionButtons", "Links"),
];

static INDEXING_COLUMNS: &[ColumnDef] = &[
    column("provider", "Provider"),
    column("plan", "Plan"),
    column("chain", "Chain").select(),
    column("pricing", "Pricing").range(),
    column("queryLanguage", "Query Language").select(),
    column("historicalData", "Historical Data").select(),
    column("realTime", "Real Time").select(),
    column("freeTier", "Free Tier").select(),
    column("supportedData", "Supported Data").multi(),
    column("apis", "APIs").multi().hidden(),
    column("slug", "Slug").hidden(),
    column("actionButtons", "Links"),
];

static EXPLORER_COLUMNS: &[ColumnDef] = &[
    column("provider", "Provider"),
    column("chain", "Chain").select(),
    column("pricing", "Pricing").range(),
    column("apiAvailable", "API").select(),
    column("openSource", "Open Source").select(),
    column("features", "Features").multi(),
    column("slug", "Slug").hidden(),
    column("actionButtons", "Links"),
];

static ORACLE_COLUMNS: &[ColumnDef] = &[
    column("provider", "Provider"),
    column("chain", "Chain").select(),
    column("oracleType", "Type").select(),
    column("updateFrequency", "Update Frequency").range(),
    column("pricing", "Pricing").range().hidden(),
    column("decentralized", "Decentralized").select(),
    column("dataFeeds", "Data Feeds").multi(),
    column("slug", "Slug").hidden(),
    column("actionButtons", "Links"),
];

static BRIDGE_COLUMNS: &[ColumnDef] = &[
    column("provider", "Provider"),
    column("chain", "Chain").select(),
    column("destinationChains", "Destinations").multi(),
    column("fee", "Fee").range(),
    column("finalityTime", "Finality").range(),
    column("securityModel", "Security Model").select(),
    column("tokens", "Tokens").multi().hidden(),
    column("slug", "Slug").hidden(),
    column("actionButtons", "Links"),
];

static DEV_TOOL_COLUMNS: &[ColumnDef] = &[
    column("provider", "Provider"),
    column("chain", "Chain").select(),
    column("toolType", "Type").select(),
    column("pricing", "Pricing").range(),
    column("openSource", "Open Source").select(),
    column("languages", "Languages").multi(),
    column("slug", "Slug").hidden(),
    column("actionButtons", "Links"),
];

static FAUCET_COLUMNS: &[ColumnDef] = &[
    column("provider", "Provider"),
    column("chain", "Chain").select(),
    column("amountPerRequest", "Amount").range(),
    column("cooldown", "Cooldown").range(),
    column("requiresAuth", "Requires Auth").select(),
    column("tokens", "Tokens").multi(),
    column("slug", "Slug").hidden(),
    column("actionButtons", "Links"),
];

static ANALYTIC_COLUMNS: &[ColumnDef] = &[
    column("provider", "Provider"),
    column("chain", "Chain").select(),
    column("pricing", "Pricing").range(),
    column("realTime", "Real Time").select(),
    column("apiAccess", "API Access").select(),
    column("dataSources", "Data Sources").multi(),
    column("features", "Features").multi().hidden(),
    column("slug", "Slug").hidden(),
    column("actionButtons", "Links"),
];

static WALLET_COLUMNS: &[ColumnDef] = &[
    column("provider", "Provider"),
    column("walletType", "Type").select(),
    column("custody", "Custody").select(),
    column("multisig", "Multisig").select(),
    column("hardwareSupport", "Hardware").select(),
    column("platforms", "Platforms").multi(),
    column("chain", "Chain").select().hidden(),
    column("slug", "Slug").hidden(),
    column("actionButtons", "Links"),
];

/// Columns of `category`, in display order.
pub fn columns(category: CategoryKey) -> &'static [ColumnDef] {
    match category {
        CategoryKey::Rpc => RPC_COLUMNS,
        CategoryKey::Indexing => INDEXING_COLUMNS,
        CategoryKey::Explorer => EXPLORER_COLUMNS,
        CategoryKey::Oracle => ORACLE_COLUMNS,
        CategoryKey::Bridge => BRIDGE_COLUMNS,
        CategoryKey::DevTool => DEV_TOOL_COLUMNS,
        CategoryKey::Faucet => FAUCET_COLUMNS,
        CategoryKey::Analytic => ANALYTIC_COLUMNS,
        CategoryKey::Wallet => WALLET_COLUMNS,
    }
}

pub fn column_def(category: CategoryKey, id: &str) -> Option<&'static ColumnDef> {
    columns(category).iter().find(|column| column.id == id)
}

/// Declared default visibility of every column of `category`, with the ids
/// in `hidden` forced off.
pub fn default_visibility(category: CategoryKey, hidden: &[String]) -> BTreeMap<String, bool> {
    columns(category)
        .iter()
        .map(|column| {
            let visible = column.visible_by_default && !hidden.iter().any(|id| id == column.id);
            (column.id.to_string(), visible)
        })
        .collect()
}
