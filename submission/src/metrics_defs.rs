//! Metrics definitions for the write path.

use shared::metrics_defs::{MetricDef, MetricType};

pub const SUBMISSIONS_ACCEPTED: MetricDef = MetricDef {
    name: "submissions.accepted",
    metric_type: MetricType::Counter,
    description: "Change requests opened for new RPC records. Tagged with network.",
};

pub const SUBMISSIONS_CONFLICTS: MetricDef = MetricDef {
    name: "submissions.conflicts",
    metric_type: MetricType::Counter,
    description: "Submissions rejected because the branch or change request already exists. Tagged with network.",
};

pub const ALL_METRICS: &[MetricDef] = &[SUBMISSIONS_ACCEPTED, SUBMISSIONS_CONFLICTS];
