pub mod aggregate;
pub mod api;
pub mod category;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod metrics_defs;
pub mod networks;
pub mod normalize;

#[cfg(test)]
mod testutils;

pub use aggregate::{Aggregator, Entity, ProvidersMap, RpcListing};
pub use category::CategoryKey;
pub use errors::AggregatorError;
