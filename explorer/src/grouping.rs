//! Provider grouping.
//!
//! Rows sharing the exact same `provider` collapse into a [`GroupRow`] when
//! there is more than one of them. Ordering is deterministic: starred rows
//! first (a group is starred when any child is), then groups before single
//! rows, otherwise input order.

use crate::entity::Entity;
use indexmap::IndexMap;

pub const UNKNOWN_PROVIDER: &str = "Unknown";

/// Synthetic row clustering several plans of one provider. Never leaves the client.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupRow<'a> {
    pub provider: String,
    pub children: Vec<&'a Entity>,
    pub count: usize,
}

impl GroupRow<'_> {
    pub fn is_starred(&self) -> bool {
        self.children.iter().any(|child| child.is_starred())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Row<'a> {
    Single(&'a Entity),
    Group(GroupRow<'a>),
}

impl<'a> Row<'a> {
    pub fn is_group(&self) -> bool {
        matches!(self, Row::Group(_))
    }

    pub fn is_starred(&self) -> bool {
        match self {
            Row::Single(entity) => entity.is_starred(),
            Row::Group(group) => group.is_starred(),
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            Row::Single(entity) => entity.provider().unwrap_or(UNKNOWN_PROVIDER),
            Row::Group(group) => &group.provider,
        }
    }

    /// Entities under this row: the entity itself, or the group's children.
    pub fn leaves(&self) -> &[&'a Entity] {
        match self {
            Row::Single(entity) => std::slice::from_ref(entity),
            Row::Group(group) => &group.children,
        }
    }
}

/// Groups `entities` by provider and orders the resulting rows.
pub fn group_by_provider<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Vec<Row<'a>> {
    let mut buckets: IndexMap<&'a str, Vec<&'a Entity>> = IndexMap::new();
    for entity in entities {
        let provider = entity.provider().unwrap_or(UNKNOWN_PROVIDER);
        buckets.entry(provider).or_default().push(entity);
    }

    let mut rows: Vec<Row<'a>> = buckets
        .into_iter()
        .map(|(provider, mut members)| {
            if members.len() == 1 {
                Row::Single(members[0])
            } else {
                sort_starred_first(&mut members);
                Row::Group(GroupRow {
                    provider: provider.to_string(),
                    count: members.len(),
                    children: members,
                })
            }
        })
        .collect();

    order_rows(&mut rows);
    rows
}

/// Stable: starred entities first.
pub fn sort_starred_first(entities: &mut [&Entity]) {
    entities.sort_by_key(|entity| !entity.is_starred());
}

/// Stable: starred rows first, then groups before single rows.
pub fn order_rows(rows: &mut [Row<'_>]) {
    rows.sort_by_key(|row| (!row.is_starred(), !row.is_group()));
}
