//! Hand-off to the hosting service that reviews record changes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    /// The branch or the change request is already there.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response {status}: {message}")]
    Unexpected { status: u16, message: String },
}

/// Current content of a file on the base branch.
#[derive(Clone, Debug, PartialEq)]
pub struct ExistingFile {
    pub content: String,
    /// Opaque revision the update is based on
    pub revision: String,
}

/// One file update proposed on its own branch.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRequest {
    pub branch: String,
    pub path: String,
    pub content: String,
    /// Revision of the file that `content` replaces, `None` when creating it.
    pub previous_revision: Option<String>,
    pub commit_message: String,
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublishedChangeRequest {
    pub branch: String,
    pub url: String,
    pub number: u64,
}

#[async_trait]
pub trait ChangeRequestPublisher: Send + Sync {
    /// Reads `path` from the base branch. `None` when the file does not exist.
    async fn read_file(&self, path: &str) -> Result<Option<ExistingFile>, PublishError>;

    /// Creates the branch, commits the file and opens the change request.
    async fn publish(&self, request: ChangeRequest) -> Result<PublishedChangeRequest, PublishError>;
}
