//! Client-side exploration of the provider catalog: typed entities, column
//! metadata, provider grouping and faceted filtering.

pub mod client;
pub mod columns;
pub mod config;
pub mod entity;
pub mod facets;
pub mod filters;
pub mod grouping;
pub mod search;
pub mod view;

pub use aggregator::CategoryKey;
pub use entity::{Catalog, Entity, FieldValue};
pub use view::{View, ViewState};
