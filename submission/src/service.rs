//! Submission flow: validate, read the current file, append, publish.
//!
//! Every submission gets its own branch, so concurrent submissions never
//! overwrite each other. They also do not see each other's pending rows;
//! reconciliation happens when the change requests are merged.

use crate::change_request::{ChangeRequest, ChangeRequestPublisher, PublishError, PublishedChangeRequest};
use crate::codec::{encode_line, merge};
use crate::config::Config;
use crate::form::{RpcFormData, ValidationError, branch_name};
use crate::metrics_defs::{SUBMISSIONS_ACCEPTED, SUBMISSIONS_CONFLICTS};
use aggregator::networks::Networks;
use shared::counter;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),

    #[error("unknown network {0}")]
    UnknownNetwork(String),

    /// Branch or change request already exists. Retrying needs different input.
    #[error("{0}")]
    Conflict(String),

    #[error("publishing failed: {0}")]
    Publish(#[source] PublishError),
}

impl From<PublishError> for SubmissionError {
    fn from(error: PublishError) -> Self {
        match error {
            PublishError::AlreadyExists(message) => SubmissionError::Conflict(message),
            other => SubmissionError::Publish(other),
        }
    }
}

#[derive(Clone)]
pub struct SubmissionService {
    networks: Networks,
    publisher: Arc<dyn ChangeRequestPublisher>,
    config: Config,
}

impl SubmissionService {
    pub fn new(networks: Networks, publisher: Arc<dyn ChangeRequestPublisher>, config: Config) -> Self {
        Self {
            networks,
            publisher,
            config,
        }
    }

    /// Proposes `form` as a new row of the network's record file.
    pub async fn submit(
        &self,
        network: &str,
        form: RpcFormData,
    ) -> Result<PublishedChangeRequest, SubmissionError> {
        let (key, network_config) = self
            .networks
            .resolve(network)
            .ok_or_else(|| SubmissionError::UnknownNetwork(network.to_string()))?;
        form.validate()?;

        let path = self.config.records_path(key);
        let existing = self.publisher.read_file(&path).await?;
        let line = encode_line(&form);
        let content = merge(existing.as_ref().map(|file| file.content.as_str()), &line);

        let title = format!(
            "Add {} {} RPC on {}",
            form.provider.trim(),
            form.plan.trim(),
            network_config.name
        );
        let request = ChangeRequest {
            branch: branch_name(key, &form),
            path,
            content,
            previous_revision: existing.map(|file| file.revision),
            commit_message: title.clone(),
            title,
            body: format!("Appends one record:\n\n```\n{line}\n```\n"),
        };

        let label = key.to_string();
        match self.publisher.publish(request).await {
            Ok(published) => {
                counter!(SUBMISSIONS_ACCEPTED, "network" => label).increment(1);
                tracing::info!(network = key, branch = %published.branch, number = published.number, "Submitted RPC record");
                Ok(published)
            }
            Err(PublishError::AlreadyExists(message)) => {
                counter!(SUBMISSIONS_CONFLICTS, "network" => label).increment(1);
                tracing::info!(network = key, reason = %message, "Submission conflicts with an existing change request");
                Err(SubmissionError::Conflict(message))
            }
            Err(e) => {
                tracing::error!(network = key, error = %e, "Submission failed");
                Err(e.into())
            }
        }
    }
}
