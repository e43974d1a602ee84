//! Filter metadata and facet counts derived from the working entity set.

use crate::columns::{FilterKind, column_def, columns};
use crate::entity::{Entity, FieldValue};
use crate::filters::{NO, YES, field_number, field_tokens};
use crate::grouping::Row;
use aggregator::CategoryKey;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Filter configuration for one column. Recomputed whenever the working
/// set changes, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterMeta {
    Range {
        key: &'static str,
        min: f64,
        max: f64,
        step: f64,
    },
    Select {
        key: &'static str,
        options: Vec<String>,
    },
    MultiSelect {
        key: &'static str,
        options: Vec<String>,
    },
}

impl FilterMeta {
    pub fn key(&self) -> &'static str {
        match self {
            FilterMeta::Range { key, .. }
            | FilterMeta::Select { key, .. }
            | FilterMeta::MultiSelect { key, .. } => *key,
        }
    }
}

/// Values a field contributes as options. Select columns take the whole
/// text, multi-select columns split it.
fn option_tokens(kind: FilterKind, field: FieldValue<'_>) -> Vec<&str> {
    match (kind, field) {
        (FilterKind::Select, FieldValue::Text(text)) => {
            if text.trim().is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
        _ => field_tokens(field),
    }
}

/// Distinct options, `Yes`/`No` first when present, the rest sorted.
fn ordered_options<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let distinct: BTreeSet<&str> = tokens.into_iter().collect();

    let mut options = Vec::with_capacity(distinct.len());
    for flag in [YES, NO] {
        if distinct.contains(flag) {
            options.push(flag.to_string());
        }
    }
    options.extend(
        distinct
            .into_iter()
            .filter(|token| *token != YES && *token != NO)
            .map(str::to_string),
    );
    options
}

/// Derives filter metadata for every filterable column of `category`.
/// Range columns without a numeric value and select columns without any
/// option are omitted.
pub fn derive_filter_meta(category: CategoryKey, entities: &[Entity]) -> Vec<FilterMeta> {
    let mut metas = Vec::new();

    for column in columns(category) {
        let Some(kind) = column.filter else {
            continue;
        };

        match kind {
            FilterKind::Range => {
                let numbers: Vec<f64> = entities
                    .iter()
                    .filter_map(|entity| field_number(entity.value(column.id)))
                    .collect();
                if numbers.is_empty() {
                    continue;
                }

                let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
                let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let step = if numbers.iter().all(|n| n.fract() == 0.0) {
                    1.0
                } else {
                    0.01
                };
                metas.push(FilterMeta::Range {
                    key: column.id,
                    min,
                    max,
                    step,
                });
            }
            FilterKind::Select | FilterKind::MultiSelect => {
                let options = ordered_options(
                    entities
                        .iter()
                        .flat_map(|entity| option_tokens(kind, entity.value(column.id))),
                );
                if options.is_empty() {
                    continue;
                }

                metas.push(if kind == FilterKind::Select {
                    FilterMeta::Select {
                        key: column.id,
                        options,
                    }
                } else {
                    FilterMeta::MultiSelect {
                        key: column.id,
                        options,
                    }
                });
            }
        }
    }

    metas
}

/// Number of visible leaf rows carrying each option of a select or
/// multi-select column. Empty for other columns.
pub fn facet_counts(rows: &[Row<'_>], category: CategoryKey, column: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    let Some(kind) = column_def(category, column).and_then(|def| def.filter) else {
        return counts;
    };
    if kind == FilterKind::Range {
        return counts;
    }

    for leaf in rows.iter().flat_map(|row| row.leaves()) {
        let distinct: BTreeSet<&str> = option_tokens(kind, leaf.value(column)).into_iter().collect();
        for token in distinct {
            *counts.entry(token.to_string()).or_insert(0) += 1;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_by_provider;
    use serde_json::json;

    fn rpcs() -> Vec<Entity> {
        [
            json!({"provider": "Alchemy", "plan": "Free", "nodeType": "Full", "accessPrice": "$0", "trial": true, "regions": ["US", "EU"]}),
            json!({"provider": "Alchemy", "plan": "Growth", "nodeType": "Archive", "accessPrice": "$49/mo", "trial": false, "regions": "EU, Asia"}),
            json!({"provider": "Ankr", "plan": "Premium", "nodeType": "Full", "accessPrice": "120", "uptimeSla": "99.9%"}),
        ]
        .into_iter()
        .map(|value| Entity::from_json(CategoryKey::Rpc, value).unwrap())
        .collect()
    }

    fn meta<'a>(metas: &'a [FilterMeta], key: &str) -> Option<&'a FilterMeta> {
        metas.iter().find(|meta| meta.key() == key)
    }

    #[test]
    fn test_range_meta() {
        let metas = derive_filter_meta(CategoryKey::Rpc, &rpcs());

        assert_eq!(
            meta(&metas, "accessPrice"),
            Some(&FilterMeta::Range {
                key: "accessPrice",
                min: 0.0,
                max: 120.0,
                step: 1.0,
            })
        );
        assert_eq!(
            meta(&metas, "uptimeSla"),
            Some(&FilterMeta::Range {
                key: "uptimeSla",
                min: 99.9,
                max: 99.9,
                step: 0.01,
            })
        );
        // No numeric value anywhere
        assert_eq!(meta(&metas, "queryPrice"), None);
    }

    #[test]
    fn test_select_meta() {
        let metas = derive_filter_meta(CategoryKey::Rpc, &rpcs());

        assert_eq!(
            meta(&metas, "trial"),
            Some(&FilterMeta::Select {
                key: "trial",
                options: vec!["Yes".to_string(), "No".to_string()],
            })
        );
        assert_eq!(
            meta(&metas, "nodeType"),
            Some(&FilterMeta::Select {
                key: "nodeType",
                options: vec!["Archive".to_string(), "Full".to_string()],
            })
        );
        assert_eq!(
            meta(&metas, "regions"),
            Some(&FilterMeta::MultiSelect {
                key: "regions",
                options: vec!["Asia".to_string(), "EU".to_string(), "US".to_string()],
            })
        );
        assert_eq!(meta(&metas, "limitations"), None);
    }

    #[test]
    fn test_meta_serialization() {
        let metas = derive_filter_meta(CategoryKey::Rpc, &rpcs());
        let value = serde_json::to_value(meta(&metas, "regions").unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"kind": "multiSelect", "key": "regions", "options": ["Asia", "EU", "US"]})
        );
    }

    #[test]
    fn test_facet_counts_over_leaves() {
        let entities = rpcs();
        let rows = group_by_provider(&entities);

        let regions = facet_counts(&rows, CategoryKey::Rpc, "regions");
        assert_eq!(regions.get("EU"), Some(&2));
        assert_eq!(regions.get("US"), Some(&1));
        assert_eq!(regions.get("Asia"), Some(&1));

        let node_types = facet_counts(&rows, CategoryKey::Rpc, "nodeType");
        assert_eq!(node_types.get("Full"), Some(&2));
        assert_eq!(node_types.get("Archive"), Some(&1));

        assert!(facet_counts(&rows, CategoryKey::Rpc, "accessPrice").is_empty());
        assert!(facet_counts(&rows, CategoryKey::Rpc, "nope").is_empty());
    }
}
