//! Metrics definitions for the aggregator.

use shared::metrics_defs::{MetricDef, MetricType};

pub const UPSTREAM_FETCH_DURATION: MetricDef = MetricDef {
    name: "upstream.fetch.duration",
    metric_type: MetricType::Histogram,
    description: "Time to fetch and parse one network payload in seconds. Tagged with network.",
};

pub const UPSTREAM_FETCH_FAILURES: MetricDef = MetricDef {
    name: "upstream.fetch.failures",
    metric_type: MetricType::Counter,
    description: "Number of failed network payload fetches. Tagged with network.",
};

pub const RPC_LISTING_SKIPPED: MetricDef = MetricDef {
    name: "rpc_listing.skipped_networks",
    metric_type: MetricType::Counter,
    description: "Networks left out of the cross-network RPC listing because they failed",
};

pub const ALL_METRICS: &[MetricDef] = &[
    UPSTREAM_FETCH_DURATION,
    UPSTREAM_FETCH_FAILURES,
    RPC_LISTING_SKIPPED,
];
