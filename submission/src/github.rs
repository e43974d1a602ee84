//! GitHub REST implementation of [`ChangeRequestPublisher`].
//!
//! Files are read and written through the contents API, the branch is cut
//! from the base branch head through the git refs API and the change request
//! is a pull request.

use crate::change_request::{
    ChangeRequest, ChangeRequestPublisher, ExistingFile, PublishError, PublishedChangeRequest,
};
use crate::config::GithubConfig;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    html_url: String,
}

#[derive(Deserialize, Default)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

impl ErrorResponse {
    fn already_exists(&self) -> bool {
        std::iter::once(self.message.as_str())
            .chain(self.errors.iter().filter_map(|e| e.message.as_deref()))
            .any(|message| message.to_lowercase().contains("already exists"))
    }

    fn describe(&self) -> String {
        let details: Vec<&str> = self
            .errors
            .iter()
            .filter_map(|e| e.message.as_deref())
            .collect();
        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.message, details.join("; "))
        }
    }
}

pub struct GithubPublisher {
    client: reqwest::Client,
    repo_url: String,
    base_branch: String,
}

impl GithubPublisher {
    pub fn new(config: &GithubConfig, token: &str) -> Result<Self, PublishError> {
        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e: InvalidHeaderValue| PublishError::Unexpected {
                status: 0,
                message: format!("invalid token: {e}"),
            })?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("infradex"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(GithubPublisher {
            client,
            repo_url: format!("{}/repos/{}/{}", config.api_url(), config.owner, config.repo),
            base_branch: config.base_branch.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.repo_url, path.trim_start_matches('/'))
    }

    /// Sends `request`, turning non-success responses into errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, PublishError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        let error: ErrorResponse = serde_json::from_str(&body).unwrap_or_else(|_| ErrorResponse {
            message: body,
            ..Default::default()
        });

        if status == StatusCode::UNPROCESSABLE_ENTITY && error.already_exists() {
            return Err(PublishError::AlreadyExists(error.describe()));
        }
        Err(PublishError::Unexpected {
            status: status.as_u16(),
            message: error.describe(),
        })
    }

    /// Commits the new content to the branch and opens the pull request.
    async fn commit_and_open(&self, request: &ChangeRequest) -> Result<PullResponse, PublishError> {
        let mut commit = json!({
            "message": request.commit_message,
            "content": STANDARD.encode(request.content.as_bytes()),
            "branch": request.branch,
        });
        if let Some(revision) = &request.previous_revision {
            commit["sha"] = json!(revision);
        }
        self.send(
            self.client
                .put(self.endpoint(&format!("contents/{}", request.path)))
                .json(&commit),
        )
        .await?;

        let pull = self
            .send(self.client.post(self.endpoint("pulls")).json(&json!({
                "title": request.title,
                "head": request.branch,
                "base": self.base_branch,
                "body": request.body,
            })))
            .await?
            .json()
            .await?;
        Ok(pull)
    }

    async fn delete_branch(&self, branch: &str) -> Result<(), PublishError> {
        let url = self.endpoint(&format!("git/refs/heads/{branch}"));
        self.send(self.client.delete(url)).await?;
        tracing::debug!(branch, "Deleted branch");
        Ok(())
    }

    async fn base_head(&self) -> Result<String, PublishError> {
        let url = self.endpoint(&format!("git/ref/heads/{}", self.base_branch));
        let head: RefResponse = self.send(self.client.get(url)).await?.json().await?;
        Ok(head.object.sha)
    }
}

#[async_trait]
impl ChangeRequestPublisher for GithubPublisher {
    async fn read_file(&self, path: &str) -> Result<Option<ExistingFile>, PublishError> {
        let request = self
            .client
            .get(self.endpoint(&format!("contents/{path}")))
            .query(&[("ref", self.base_branch.as_str())]);

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(PublishError::Unexpected { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let file: ContentsResponse = response.json().await?;
        // The API wraps the base64 payload across lines.
        let encoded: String = file.content.split_whitespace().collect();
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| PublishError::Unexpected {
                status: 200,
                message: format!("invalid base64 content for {path}: {e}"),
            })?;
        let content = String::from_utf8(bytes).map_err(|e| PublishError::Unexpected {
            status: 200,
            message: format!("{path} is not UTF-8: {e}"),
        })?;

        Ok(Some(ExistingFile {
            content,
            revision: file.sha,
        }))
    }

    async fn publish(&self, request: ChangeRequest) -> Result<PublishedChangeRequest, PublishError> {
        let head = self.base_head().await?;

        self.send(self.client.post(self.endpoint("git/refs")).json(&json!({
            "ref": format!("refs/heads/{}", request.branch),
            "sha": head,
        })))
        .await?;
        tracing::debug!(branch = %request.branch, base = %head, "Created branch");

        // A branch left behind turns every retry of this submission into a conflict
        let pull = match self.commit_and_open(&request).await {
            Ok(pull) => pull,
            Err(e) => {
                if let Err(cleanup) = self.delete_branch(&request.branch).await {
                    tracing::warn!(branch = %request.branch, error = %cleanup, "Could not delete branch of failed submission");
                }
                return Err(e);
            }
        };

        tracing::info!(branch = %request.branch, number = pull.number, "Opened pull request");

        Ok(PublishedChangeRequest {
            branch: request.branch,
            url: pull.html_url,
            number: pull.number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::spawn_router;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::Value;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const TOKEN: &str = "t0ken";

    /// Requests received by the mock, as (method and path, body).
    type Log = Arc<Mutex<Vec<(String, Value)>>>;

    #[derive(Clone, Default)]
    struct Mock {
        log: Log,
        refs: Arc<Mutex<HashSet<String>>>,
        flaky_writes: Arc<AtomicUsize>,
    }

    fn authorized(headers: &AxumHeaders) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {TOKEN}"))
    }

    async fn contents(
        headers: AxumHeaders,
        Path(path): Path<String>,
    ) -> (AxumStatus, Json<Value>) {
        if !authorized(&headers) {
            return (AxumStatus::UNAUTHORIZED, Json(json!({"message": "Bad credentials"})));
        }
        if path != "eth/rpc.csv" {
            return (AxumStatus::NOT_FOUND, Json(json!({"message": "Not Found"})));
        }
        // Wrapped like the real API
        let encoded = STANDARD.encode("slug,provider\nold,row\n");
        let (first, second) = encoded.split_at(8);
        (
            AxumStatus::OK,
            Json(json!({"content": format!("{first}\n{second}\n"), "sha": "file-sha"})),
        )
    }

    async fn base_ref(Path(branch): Path<String>) -> (AxumStatus, Json<Value>) {
        if branch == "main" {
            (AxumStatus::OK, Json(json!({"object": {"sha": "head-sha"}})))
        } else {
            (AxumStatus::NOT_FOUND, Json(json!({"message": "Not Found"})))
        }
    }

    async fn create_ref(State(mock): State<Mock>, Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
        let name = body["ref"].as_str().unwrap_or_default().to_string();
        if name == "refs/heads/add-rpc/eth/taken" || !mock.refs.lock().unwrap().insert(name) {
            return (
                AxumStatus::UNPROCESSABLE_ENTITY,
                Json(json!({"message": "Reference already exists"})),
            );
        }
        mock.log.lock().unwrap().push(("POST git/refs".to_string(), body));
        (AxumStatus::CREATED, Json(json!({})))
    }

    async fn delete_ref(State(mock): State<Mock>, Path(branch): Path<String>) -> AxumStatus {
        mock.refs.lock().unwrap().remove(&format!("refs/heads/{branch}"));
        mock.log
            .lock()
            .unwrap()
            .push((format!("DELETE git/refs/heads/{branch}"), Value::Null));
        AxumStatus::NO_CONTENT
    }

    async fn write_contents(
        State(mock): State<Mock>,
        Path(path): Path<String>,
        Json(body): Json<Value>,
    ) -> (AxumStatus, Json<Value>) {
        // The first write to this path races another commit
        if path == "eth/flaky.csv" && mock.flaky_writes.fetch_add(1, Ordering::SeqCst) == 0 {
            return (
                AxumStatus::CONFLICT,
                Json(json!({"message": "eth/flaky.csv does not match file-sha"})),
            );
        }
        mock.log.lock().unwrap().push((format!("PUT contents/{path}"), body));
        (AxumStatus::CREATED, Json(json!({})))
    }

    async fn create_pull(State(mock): State<Mock>, Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
        if body["head"] == "add-rpc/eth/open-pr" {
            return (
                AxumStatus::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "message": "Validation Failed",
                    "errors": [{"message": "A pull request already exists for infra-org:add-rpc/eth/open-pr."}]
                })),
            );
        }
        mock.log.lock().unwrap().push(("POST pulls".to_string(), body));
        (
            AxumStatus::CREATED,
            Json(json!({"number": 42, "html_url": "https://github.com/infra-org/providers/pull/42"})),
        )
    }

    async fn spawn_github(token: &str) -> (GithubPublisher, Log) {
        let mock = Mock::default();
        let log = mock.log.clone();
        let repo = "/api/repos/infra-org/providers";
        let app = Router::new()
            .route(&format!("{repo}/contents/{{*path}}"), get(contents).put(write_contents))
            .route(&format!("{repo}/git/ref/heads/{{*branch}}"), get(base_ref))
            .route(&format!("{repo}/git/refs"), post(create_ref))
            .route(&format!("{repo}/git/refs/heads/{{*branch}}"), delete(delete_ref))
            .route(&format!("{repo}/pulls"), post(create_pull))
            .with_state(mock);
        let addr = spawn_router(app).await;

        let config: GithubConfig = serde_yaml::from_str(&format!(
            "owner: infra-org\nrepo: providers\napi_url: http://{addr}/api\n"
        ))
        .unwrap();
        (GithubPublisher::new(&config, token).unwrap(), log)
    }

    fn request(branch: &str) -> ChangeRequest {
        ChangeRequest {
            branch: branch.to_string(),
            path: "eth/rpc.csv".to_string(),
            content: "slug,provider\nold,row\nnew,row\n".to_string(),
            previous_revision: Some("file-sha".to_string()),
            commit_message: "Add new RPC".to_string(),
            title: "Add new RPC".to_string(),
            body: "new,row".to_string(),
        }
    }

    #[tokio::test]
    async fn test_read_file() {
        let (github, _) = spawn_github(TOKEN).await;

        let file = github.read_file("eth/rpc.csv").await.unwrap().unwrap();
        assert_eq!(file.content, "slug,provider\nold,row\n");
        assert_eq!(file.revision, "file-sha");

        assert_eq!(github.read_file("sol/rpc.csv").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_publish() {
        let (github, log) = spawn_github(TOKEN).await;

        let published = github.publish(request("add-rpc/eth/new")).await.unwrap();
        assert_eq!(
            published,
            PublishedChangeRequest {
                branch: "add-rpc/eth/new".to_string(),
                url: "https://github.com/infra-org/providers/pull/42".to_string(),
                number: 42,
            }
        );

        let log = log.lock().unwrap();
        let steps: Vec<&str> = log.iter().map(|(step, _)| step.as_str()).collect();
        assert_eq!(steps, ["POST git/refs", "PUT contents/eth/rpc.csv", "POST pulls"]);

        assert_eq!(log[0].1, json!({"ref": "refs/heads/add-rpc/eth/new", "sha": "head-sha"}));

        let commit = &log[1].1;
        assert_eq!(commit["branch"], "add-rpc/eth/new");
        assert_eq!(commit["sha"], "file-sha");
        let content = STANDARD.decode(commit["content"].as_str().unwrap()).unwrap();
        assert_eq!(content, b"slug,provider\nold,row\nnew,row\n");

        assert_eq!(log[2].1["base"], "main");
        assert_eq!(log[2].1["head"], "add-rpc/eth/new");
    }

    #[tokio::test]
    async fn test_new_file_has_no_revision() {
        let (github, log) = spawn_github(TOKEN).await;

        let request = ChangeRequest {
            previous_revision: None,
            ..request("add-rpc/eth/fresh")
        };
        github.publish(request).await.unwrap();

        let log = log.lock().unwrap();
        assert!(log[1].1.get("sha").is_none());
    }

    #[tokio::test]
    async fn test_already_exists() {
        let (github, log) = spawn_github(TOKEN).await;

        let error = github.publish(request("add-rpc/eth/taken")).await.unwrap_err();
        assert!(
            matches!(&error, PublishError::AlreadyExists(message) if message == "Reference already exists"),
            "{error:?}"
        );
        assert!(log.lock().unwrap().is_empty());

        let error = github.publish(request("add-rpc/eth/open-pr")).await.unwrap_err();
        assert!(matches!(error, PublishError::AlreadyExists(_)), "{error:?}");
    }

    #[tokio::test]
    async fn test_failed_publish_deletes_branch_and_retry_succeeds() {
        let (github, log) = spawn_github(TOKEN).await;
        let flaky = || ChangeRequest {
            path: "eth/flaky.csv".to_string(),
            ..request("add-rpc/eth/flaky")
        };

        let error = github.publish(flaky()).await.unwrap_err();
        assert!(
            matches!(&error, PublishError::Unexpected { status: 409, .. }),
            "{error:?}"
        );
        {
            let log = log.lock().unwrap();
            let steps: Vec<&str> = log.iter().map(|(step, _)| step.as_str()).collect();
            assert_eq!(steps, ["POST git/refs", "DELETE git/refs/heads/add-rpc/eth/flaky"]);
        }

        let published = github.publish(flaky()).await.unwrap();
        assert_eq!(published.branch, "add-rpc/eth/flaky");

        let log = log.lock().unwrap();
        let steps: Vec<&str> = log.iter().skip(2).map(|(step, _)| step.as_str()).collect();
        assert_eq!(steps, ["POST git/refs", "PUT contents/eth/flaky.csv", "POST pulls"]);
    }

    #[tokio::test]
    async fn test_unexpected_status() {
        let (github, _) = spawn_github("wrong").await;

        let error = github.read_file("eth/rpc.csv").await.unwrap_err();
        match error {
            PublishError::Unexpected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
