//! Column predicates and free-text search.

use crate::columns::FilterKind;
use crate::entity::{Entity, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const YES: &str = "Yes";
pub const NO: &str = "No";

/// Active filter value for one column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FilterValue {
    /// Minimum accepted value
    Range(f64),
    /// Exact value, or "Yes"/"No" for boolean fields
    Select(String),
    /// Accepted values; an empty set disables the filter
    MultiSelect(BTreeSet<String>),
}

impl FilterValue {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Range(_) => FilterKind::Range,
            FilterValue::Select(_) => FilterKind::Select,
            FilterValue::MultiSelect(_) => FilterKind::MultiSelect,
        }
    }

    pub fn matches(&self, field: FieldValue<'_>) -> bool {
        match self {
            FilterValue::Range(threshold) => range_matches(field, *threshold),
            FilterValue::Select(selected) => select_matches(field, selected),
            FilterValue::MultiSelect(selected) => multi_select_matches(field, selected),
        }
    }
}

/// First numeric token in `text`.
///
/// Handles plain numbers, currency prefixes ("$0.50"), thousands separators
/// ("1,000") and ranges ("50-200" yields the first bound).
pub fn extract_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let first_digit = bytes.iter().position(u8::is_ascii_digit)?;
    let start = match first_digit.checked_sub(1) {
        Some(prev) if bytes[prev] == b'.' => prev,
        _ => first_digit,
    };

    let mut token = String::new();
    let mut seen_dot = false;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        match byte {
            b'0'..=b'9' => token.push(byte as char),
            b'.' if !seen_dot => {
                seen_dot = true;
                token.push('.');
            }
            b',' if !seen_dot
                && bytes
                    .get(start + offset + 1)
                    .is_some_and(u8::is_ascii_digit) => {}
            _ => break,
        }
    }

    token.parse().ok()
}

/// Numeric value of a field for range filtering and sorting.
pub fn field_number(field: FieldValue<'_>) -> Option<f64> {
    match field {
        FieldValue::Text(text) => extract_number(text),
        _ => None,
    }
}

/// Passes when the extracted number is at least `threshold`. Fields without a
/// number never pass.
pub fn range_matches(field: FieldValue<'_>, threshold: f64) -> bool {
    field_number(field).is_some_and(|value| value >= threshold)
}

/// Boolean fields compare against a Yes/No toggle, everything else by
/// string equality.
pub fn select_matches(field: FieldValue<'_>, selected: &str) -> bool {
    match field {
        FieldValue::Flag(flag) => flag_label(flag) == selected,
        FieldValue::Text(text) => text == selected,
        FieldValue::List(items) => items.iter().any(|item| item == selected),
        FieldValue::Absent => false,
    }
}

/// Passes when any selected value is among the field's tokens.
pub fn multi_select_matches(field: FieldValue<'_>, selected: &BTreeSet<String>) -> bool {
    if selected.is_empty() {
        return true;
    }
    field_tokens(field)
        .iter()
        .any(|token| selected.contains(*token))
}

/// Tokens of a field for multi-value matching and facet options. Text is
/// treated as a comma-joined list.
pub fn field_tokens(field: FieldValue<'_>) -> Vec<&str> {
    match field {
        FieldValue::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect(),
        FieldValue::List(items) => items
            .iter()
            .map(|item| item.trim())
            .filter(|token| !token.is_empty())
            .collect(),
        FieldValue::Flag(flag) => vec![flag_label(flag)],
        FieldValue::Absent => Vec::new(),
    }
}

pub const fn flag_label(flag: bool) -> &'static str {
    if flag { YES } else { NO }
}

/// Case-insensitive substring search over the text and list fields in
/// `columns`. `needle` must already be lower-cased; an empty needle matches.
pub fn matches_search<'c>(
    entity: &Entity,
    columns: impl IntoIterator<Item = &'c str>,
    needle: &str,
) -> bool {
    if needle.is_empty() {
        return true;
    }

    columns
        .into_iter()
        .any(|column| match entity.value(column) {
            FieldValue::Text(text) => text.to_lowercase().contains(needle),
            FieldValue::List(items) => items
                .iter()
                .any(|item| item.to_lowercase().contains(needle)),
            FieldValue::Flag(_) | FieldValue::Absent => false,
        })
}
