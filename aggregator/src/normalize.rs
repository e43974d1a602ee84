//! Stateless per-entity transforms applied on the server before data leaves
//! the aggregation boundary.

use serde_json::Value;

const CHAIN_FIELD: &str = "chain";

/// Lower-cases the `chain` field when it is present and a string.
/// Every other field passes through untouched.
pub fn normalize_entity(mut entity: Value) -> Value {
    if let Some(Value::String(chain)) = entity.get_mut(CHAIN_FIELD) {
        *chain = chain.to_lowercase();
    }
    entity
}

/// Keeps only entities whose `chain` equals `chain_key`, ignoring case.
///
/// Returns the input unchanged when no key is given, when there are no
/// entities, or when the first entity has no `chain` field (the category
/// is not chain-scoped).
pub fn filter_by_chain(entities: Vec<Value>, chain_key: Option<&str>) -> Vec<Value> {
    let Some(key) = chain_key else {
        return entities;
    };

    let chain_scoped = entities
        .first()
        .is_some_and(|first| first.get(CHAIN_FIELD).is_some());
    if !chain_scoped {
        return entities;
    }

    let key = key.to_lowercase();
    entities
        .into_iter()
        .filter(|entity| {
            entity
                .get(CHAIN_FIELD)
                .and_then(Value::as_str)
                .is_some_and(|chain| chain.to_lowercase() == key)
        })
        .collect()
}
