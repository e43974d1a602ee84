//! `browse`: query a running server and print the grouped, filtered view.

use crate::config::Config;
use crate::errors::CliError;
use aggregator::CategoryKey;
use clap::Args;
use comfy_table::{Attribute, Cell, Table};
use explorer::client::CatalogClient;
use explorer::columns::ColumnDef;
use explorer::facets::{FilterMeta, derive_filter_meta};
use explorer::filters::{FilterValue, flag_label};
use explorer::grouping::Row;
use explorer::{Entity, FieldValue, View, ViewState};
use std::collections::BTreeSet;
use std::fmt::Write;
use url::Url;

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Network key, e.g. eth
    pub network: String,

    #[arg(long, default_value = "rpc")]
    pub category: CategoryKey,

    #[arg(long)]
    pub chain: Option<String>,

    /// Server to query. Defaults to the configured listener.
    #[arg(long)]
    pub url: Option<Url>,

    /// Exact match, Yes/No for boolean columns
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    pub filters: Vec<String>,

    /// Minimum value
    #[arg(long = "range", value_name = "COLUMN=NUMBER")]
    pub ranges: Vec<String>,

    /// Any of the comma-separated values
    #[arg(long = "multi", value_name = "COLUMN=A,B")]
    pub multi: Vec<String>,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, value_name = "COLUMN[:desc]")]
    pub sort: Option<String>,

    /// Also show these hidden columns
    #[arg(long = "show", value_name = "COLUMN")]
    pub show: Vec<String>,

    /// Print group rows without their children
    #[arg(long)]
    pub collapse: bool,

    /// Print filter options with their counts
    #[arg(long)]
    pub facets: bool,
}

fn split_assignment(arg: &str) -> Result<(&str, &str), CliError> {
    arg.split_once('=')
        .map(|(column, value)| (column.trim(), value.trim()))
        .filter(|(column, _)| !column.is_empty())
        .ok_or_else(|| CliError::Usage(format!("expected COLUMN=VALUE, got {arg:?}")))
}

/// Builds the view state described by the command line.
pub fn view_state(config: &Config, args: &BrowseArgs) -> Result<ViewState, CliError> {
    let mut state = ViewState::new(args.category, &config.explorer);
    state.chain = args.chain.clone();
    state.search = args.search.clone().unwrap_or_default();

    for arg in &args.filters {
        let (column, value) = split_assignment(arg)?;
        state.set_filter(column, FilterValue::Select(value.to_string()))?;
    }
    for arg in &args.ranges {
        let (column, value) = split_assignment(arg)?;
        let threshold = value
            .parse()
            .map_err(|_| CliError::Usage(format!("{column}: {value:?} is not a number")))?;
        state.set_filter(column, FilterValue::Range(threshold))?;
    }
    for arg in &args.multi {
        let (column, values) = split_assignment(arg)?;
        let selected: BTreeSet<String> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        state.set_filter(column, FilterValue::MultiSelect(selected))?;
    }

    if let Some(sort) = &args.sort {
        let (column, descending) = match sort.rsplit_once(':') {
            Some((column, "desc")) => (column, true),
            Some((column, "asc")) => (column, false),
            Some(_) => return Err(CliError::Usage(format!("invalid sort {sort:?}"))),
            None => (sort.as_str(), false),
        };
        state.set_sort(column, descending)?;
    }

    for column in &args.show {
        state.set_column_visible(column, true)?;
    }

    Ok(state)
}

fn cell(entity: &Entity, column: &ColumnDef) -> Cell {
    match entity.value(column.id) {
        FieldValue::Absent => Cell::new("-"),
        FieldValue::Text(text) => Cell::new(text),
        FieldValue::Flag(flag) => Cell::new(flag_label(flag)),
        FieldValue::List(items) => Cell::new(items.join(", ")),
    }
}

fn entity_row(entity: &Entity, columns: &[&ColumnDef], indent: bool) -> Vec<Cell> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| match entity.value(column.id) {
            FieldValue::Text(text) if indent && i == 0 => Cell::new(format!("  {text}")),
            _ => cell(entity, column),
        })
        .collect()
}

/// Renders the view as a table. Group rows are followed by their children
/// when expanded.
pub fn render(view: &View<'_>, state: &ViewState) -> String {
    let columns = state.visible_columns();

    let mut table = Table::new();
    table.set_header(columns.iter().map(|c| Cell::new(c.header)));

    for row in &view.rows {
        match row {
            Row::Single(entity) => {
                table.add_row(entity_row(entity, &columns, false));
            }
            Row::Group(group) => {
                let expanded = state.is_expanded(&group.provider);
                let marker = if expanded { "-" } else { "+" };
                let mut header = vec![Cell::new(""); columns.len()];
                if let Some(first) = header.first_mut() {
                    *first = Cell::new(format!("{marker} {} ({})", group.provider, group.count))
                        .add_attribute(Attribute::Bold);
                }
                table.add_row(header);

                if expanded {
                    for child in &group.children {
                        table.add_row(entity_row(child, &columns, true));
                    }
                }
            }
        }
    }

    format!(
        "{table}\n{} rows, {} offerings\n",
        view.rows.len(),
        view.leaf_count()
    )
}

/// Filter options of the working set, with counts under the current view.
pub fn render_facets(entities: &[Entity], view: &View<'_>) -> String {
    let mut out = String::new();
    for meta in derive_filter_meta(view.category, entities) {
        match meta {
            FilterMeta::Range { key, min, max, step } => {
                let _ = writeln!(out, "{key}: {min} to {max} (step {step})");
            }
            FilterMeta::Select { key, options } | FilterMeta::MultiSelect { key, options } => {
                let counts = view.facet_counts(key);
                let listed: Vec<String> = options
                    .iter()
                    .map(|option| format!("{option} ({})", counts.get(option).copied().unwrap_or(0)))
                    .collect();
                let _ = writeln!(out, "{key}: {}", listed.join(", "));
            }
        }
    }
    out
}

fn default_url(config: &Config) -> Result<Url, CliError> {
    let listener = &config.aggregator.listener;
    let host = match listener.host.as_str() {
        "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
        host => host,
    };
    Ok(Url::parse(&format!("http://{host}:{}/", listener.port))?)
}

pub async fn run(config: &Config, args: BrowseArgs) -> Result<(), CliError> {
    let mut state = view_state(config, &args)?;
    let url = match &args.url {
        Some(url) => url.clone(),
        None => default_url(config)?,
    };

    let client = CatalogClient::new(url);
    let catalog = client
        .providers(&args.network, Some(args.category), state.chain.as_deref())
        .await?;
    let entities = catalog.entities(args.category);

    if !args.collapse {
        let view = View::build(entities, &state);
        let providers: Vec<String> = view
            .rows
            .iter()
            .filter(|row| row.is_group())
            .map(|row| row.provider().to_string())
            .collect();
        for provider in providers {
            state.toggle_expanded(&provider);
        }
    }

    let view = View::build(entities, &state);
    print!("{}", render(&view, &state));
    if args.facets {
        print!("\n{}", render_facets(entities, &view));
    }
    Ok(())
}
