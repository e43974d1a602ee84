use crate::columns::column_def;
use aggregator::CategoryKey;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Unknown column {column} for category {category}")]
    UnknownColumn {
        category: CategoryKey,
        column: String,
    },
}

/// Explorer view defaults
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Columns hidden by default on top of each category's declared defaults.
    #[serde(default)]
    pub hidden_columns: BTreeMap<CategoryKey, Vec<String>>,
    /// Quiet period before typed search text takes effect. Read by
    /// interactive front ends through [`Config::search_settle`]; one-shot
    /// queries ignore it.
    #[serde(default = "default_search_settle_ms")]
    pub search_settle_ms: u64,
}

fn default_search_settle_ms() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hidden_columns: BTreeMap::new(),
            search_settle_ms: default_search_settle_ms(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (category, hidden) in &self.hidden_columns {
            for column in hidden {
                if column_def(*category, column).is_none() {
                    return Err(ValidationError::UnknownColumn {
                        category: *category,
                        column: column.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn hidden_columns(&self, category: CategoryKey) -> &[String] {
        self.hidden_columns
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn search_settle(&self) -> Duration {
        Duration::from_millis(self.search_settle_ms)
    }
}
