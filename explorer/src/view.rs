//! Explicit view state and the row pipeline built from it.
//!
//! A view is computed as: free-text search over visible columns, grouping by
//! provider, column filters evaluated on leaves, starred/group ordering, and
//! finally an optional column sort.

use crate::columns::{ColumnDef, FilterKind, column_def, columns, default_visibility};
use crate::config::Config;
use crate::entity::{Entity, FieldValue};
use crate::facets;
use crate::filters::{FilterValue, field_number, flag_label, matches_search};
use crate::grouping::{Row, group_by_provider, order_rows};
use aggregator::CategoryKey;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ViewError {
    #[error("Unknown column {column} for category {category}")]
    UnknownColumn {
        category: CategoryKey,
        column: String,
    },

    #[error("Column {0} cannot be filtered")]
    NotFilterable(String),

    #[error("Column {column} expects a {expected:?} filter")]
    KindMismatch { column: String, expected: FilterKind },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

/// Everything the user controls about the catalog table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub category: CategoryKey,
    /// Chain narrowing requested from the server
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub search: String,
    pub column_visibility: BTreeMap<String, bool>,
    #[serde(default)]
    pub filters: BTreeMap<String, FilterValue>,
    #[serde(default)]
    pub sort: Option<SortState>,
    /// Providers whose group rows are expanded
    #[serde(default)]
    pub expanded: BTreeSet<String>,
}

impl ViewState {
    pub fn new(category: CategoryKey, config: &Config) -> Self {
        Self {
            category,
            chain: None,
            search: String::new(),
            column_visibility: default_visibility(category, config.hidden_columns(category)),
            filters: BTreeMap::new(),
            sort: None,
            expanded: BTreeSet::new(),
        }
    }

    /// Moves to another category. Filters, sort, expansion and column
    /// visibility start over; search and chain carry across.
    pub fn switch_category(&mut self, category: CategoryKey, config: &Config) {
        if category == self.category {
            return;
        }

        let search = std::mem::take(&mut self.search);
        let chain = self.chain.take();
        *self = Self {
            search,
            chain,
            ..Self::new(category, config)
        };
    }

    fn column(&self, id: &str) -> Result<&'static ColumnDef, ViewError> {
        column_def(self.category, id).ok_or_else(|| ViewError::UnknownColumn {
            category: self.category,
            column: id.to_string(),
        })
    }

    /// Activates a filter. An empty multi-select clears the column's filter.
    pub fn set_filter(&mut self, column: &str, value: FilterValue) -> Result<(), ViewError> {
        let def = self.column(column)?;
        let Some(expected) = def.filter else {
            return Err(ViewError::NotFilterable(column.to_string()));
        };
        if value.kind() != expected {
            return Err(ViewError::KindMismatch {
                column: column.to_string(),
                expected,
            });
        }

        match value {
            FilterValue::MultiSelect(selected) if selected.is_empty() => {
                self.filters.remove(def.id);
            }
            value => {
                self.filters.insert(def.id.to_string(), value);
            }
        }
        Ok(())
    }

    pub fn clear_filter(&mut self, column: &str) {
        self.filters.remove(column);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn set_column_visible(&mut self, column: &str, visible: bool) -> Result<(), ViewError> {
        let def = self.column(column)?;
        self.column_visibility.insert(def.id.to_string(), visible);
        Ok(())
    }

    pub fn set_sort(&mut self, column: &str, descending: bool) -> Result<(), ViewError> {
        let def = self.column(column)?;
        self.sort = Some(SortState {
            column: def.id.to_string(),
            descending,
        });
        Ok(())
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Returns whether the group is now expanded.
    pub fn toggle_expanded(&mut self, provider: &str) -> bool {
        if self.expanded.remove(provider) {
            false
        } else {
            self.expanded.insert(provider.to_string());
            true
        }
    }

    pub fn is_expanded(&self, provider: &str) -> bool {
        self.expanded.contains(provider)
    }

    /// Columns missing from the visibility map fall back to their declared default.
    pub fn is_visible(&self, column: &str) -> bool {
        match self.column_visibility.get(column) {
            Some(visible) => *visible,
            None => column_def(self.category, column).is_some_and(|def| def.visible_by_default),
        }
    }

    pub fn visible_columns(&self) -> Vec<&'static ColumnDef> {
        columns(self.category)
            .iter()
            .filter(|def| self.is_visible(def.id))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Rows of one category as shown for a given [`ViewState`].
#[derive(Clone, Debug, PartialEq)]
pub struct View<'a> {
    pub category: CategoryKey,
    pub rows: Vec<Row<'a>>,
}

impl<'a> View<'a> {
    pub fn build(entities: &'a [Entity], state: &ViewState) -> Self {
        build_view(entities, state)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &'a Entity> + '_ {
        self.rows.iter().flat_map(|row| row.leaves().iter().copied())
    }

    pub fn leaf_count(&self) -> usize {
        self.rows.iter().map(|row| row.leaves().len()).sum()
    }

    pub fn facet_counts(&self, column: &str) -> BTreeMap<String, usize> {
        facets::facet_counts(&self.rows, self.category, column)
    }
}

pub fn build_view<'a>(entities: &'a [Entity], state: &ViewState) -> View<'a> {
    let visible = state.visible_columns();
    let needle = state.search.trim().to_lowercase();

    let searched = entities
        .iter()
        .filter(|entity| matches_search(entity, visible.iter().map(|def| def.id), &needle));
    let mut rows = group_by_provider(searched);

    if !state.filters.is_empty() {
        rows = rows
            .into_iter()
            .filter_map(|row| apply_filters(row, &state.filters))
            .collect();
        order_rows(&mut rows);
    }

    if let Some(sort) = &state.sort {
        if let Some(def) = column_def(state.category, &sort.column) {
            sort_rows(&mut rows, def, sort.descending);
        }
    }

    View {
        category: state.category,
        rows,
    }
}

fn passes(entity: &Entity, filters: &BTreeMap<String, FilterValue>) -> bool {
    filters
        .iter()
        .all(|(column, value)| value.matches(entity.value(column)))
}

/// Filters from the leaves: a group survives when any child passes and keeps
/// only the children that do. A group left with one child becomes a single
/// row, the same shape searching it down to one child would give.
fn apply_filters<'a>(row: Row<'a>, filters: &BTreeMap<String, FilterValue>) -> Option<Row<'a>> {
    match row {
        Row::Single(entity) => passes(entity, filters).then_some(row),
        Row::Group(mut group) => {
            group.children.retain(|child| passes(child, filters));
            match group.children.len() {
                0 => None,
                1 => Some(Row::Single(group.children[0])),
                _ => {
                    group.count = group.children.len();
                    Some(Row::Group(group))
                }
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(entity: &Entity, def: &ColumnDef) -> Option<SortKey> {
    let field = entity.value(def.id);
    if def.filter == Some(FilterKind::Range) {
        return field_number(field).map(SortKey::Number);
    }

    match field {
        FieldValue::Text(text) if !text.trim().is_empty() => Some(SortKey::Text(text.to_lowercase())),
        FieldValue::List(items) if !items.is_empty() => Some(SortKey::Text(items.join(", ").to_lowercase())),
        FieldValue::Flag(flag) => Some(SortKey::Text(flag_label(flag).to_lowercase())),
        _ => None,
    }
}

/// Absent values sort last in both directions.
fn compare_keys(a: Option<SortKey>, b: Option<SortKey>, descending: bool) -> Ordering {
    let ordering = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(SortKey::Number(a)), Some(SortKey::Number(b))) => a.total_cmp(&b),
        (Some(SortKey::Text(a)), Some(SortKey::Text(b))) => a.cmp(&b),
        (Some(SortKey::Number(_)), Some(SortKey::Text(_))) => Ordering::Less,
        (Some(SortKey::Text(_)), Some(SortKey::Number(_))) => Ordering::Greater,
    };

    if descending { ordering.reverse() } else { ordering }
}

fn sort_rows(rows: &mut [Row<'_>], def: &ColumnDef, descending: bool) {
    for row in rows.iter_mut() {
        if let Row::Group(group) = row {
            group
                .children
                .sort_by(|a, b| compare_keys(sort_key(a, def), sort_key(b, def), descending));
        }
    }

    rows.sort_by(|a, b| {
        let first = |row: &Row<'_>| row.leaves().first().and_then(|leaf| sort_key(leaf, def));
        compare_keys(first(a), first(b), descending)
    });
}
