//! Write path: validate a new RPC offering, append it to the network's
//! canonical record file and open a change request for it.

pub mod api;
pub mod change_request;
pub mod codec;
pub mod config;
pub mod form;
pub mod github;
pub mod metrics_defs;
pub mod service;

#[cfg(test)]
mod testutils;

pub use change_request::{ChangeRequestPublisher, PublishError, PublishedChangeRequest};
pub use form::RpcFormData;
pub use service::{SubmissionError, SubmissionService};
