//! Canonical RPC record file codec.
//!
//! One comma-separated line per offering, 22 columns in a fixed order.
//! Booleans are `TRUE`/`FALSE`, collections are JSON array literals (empty
//! string when empty) and reserved or blank optional columns are `null`.

use crate::form::RpcFormData;
use serde_json::Value;
use std::borrow::Cow;

pub const COLUMNS: [&str; 22] = [
    "slug",
    "provider",
    "plan",
    "nodeType",
    "chain",
    "accessPrice",
    "queryPrice",
    "uptimeSla",
    "bandwidthSla",
    "blocksBehindSla",
    "starred",
    "trial",
    "availableApis",
    "limitations",
    "securityImprovements",
    "monitoringAndAnalytics",
    "regions",
    "verifiedUptime",
    "verifiedLatency",
    "verifiedBlocksBehindAvg",
    "actionButtons",
    "address",
];

pub const HEADER: &str = "slug,provider,plan,nodeType,chain,accessPrice,queryPrice,uptimeSla,bandwidthSla,blocksBehindSla,starred,trial,availableApis,limitations,securityImprovements,monitoringAndAnalytics,regions,verifiedUptime,verifiedLatency,verifiedBlocksBehindAvg,actionButtons,address";

const NULL: &str = "null";

/// Quotes `value` when it contains a comma, a quote or a line break.
pub fn escape_csv(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn optional(value: &str) -> Cow<'_, str> {
    if value.trim().is_empty() {
        Cow::Borrowed(NULL)
    } else {
        escape_csv(value)
    }
}

fn flag(value: bool) -> Cow<'static, str> {
    Cow::Borrowed(if value { "TRUE" } else { "FALSE" })
}

fn list(items: &[String]) -> Cow<'static, str> {
    if items.is_empty() {
        return Cow::Borrowed("");
    }
    let literal = Value::from(items.to_vec()).to_string();
    Cow::Owned(escape_csv(&literal).into_owned())
}

/// Encodes `form` as one line of the canonical file, without a line terminator.
pub fn encode_line(form: &RpcFormData) -> String {
    let fields: [Cow<'_, str>; 22] = [
        escape_csv(&form.slug),
        escape_csv(&form.provider),
        escape_csv(&form.plan),
        escape_csv(&form.node_type),
        escape_csv(&form.chain),
        optional(&form.access_price),
        optional(&form.query_price),
        optional(&form.uptime_sla),
        optional(&form.bandwidth_sla),
        optional(form.blocks_behind_sla.trim()),
        flag(form.starred),
        flag(form.trial),
        list(&form.available_apis),
        list(&form.limitations),
        list(&form.security_improvements),
        list(&form.monitoring_and_analytics),
        list(&form.regions),
        Cow::Borrowed(NULL),
        Cow::Borrowed(NULL),
        Cow::Borrowed(NULL),
        list(&form.action_buttons),
        optional(&form.address),
    ];
    fields.join(",")
}

/// Appends `line` to `existing` file content.
///
/// Existing non-blank lines are kept byte for byte and in order; blank lines
/// are dropped. Absent or blank content starts from [`HEADER`]. The result
/// ends with a newline.
pub fn merge(existing: Option<&str>, line: &str) -> String {
    let mut lines: Vec<&str> = existing
        .unwrap_or_default()
        .split('\n')
        .filter(|l| !l.trim().is_empty())
        .collect();
    if lines.is_empty() {
        lines.push(HEADER);
    }
    lines.push(line);

    let mut merged = lines.join("\n");
    merged.push('\n');
    merged
}
