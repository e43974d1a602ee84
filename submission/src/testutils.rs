use crate::change_request::{
    ChangeRequest, ChangeRequestPublisher, ExistingFile, PublishError, PublishedChangeRequest,
};
use aggregator::config::NetworkConfig;
use aggregator::networks::Networks;
use async_trait::async_trait;
use axum::Router;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use tokio::net::TcpListener;

/// eth and sol, without chains.
pub fn test_networks() -> Networks {
    let network = |name: &str| NetworkConfig {
        name: name.to_string(),
        source_url: "http://127.0.0.1:1/payload.json".parse().unwrap(),
        chains: vec![],
    };
    Networks::new(IndexMap::from([
        ("eth".to_string(), network("Ethereum")),
        ("sol".to_string(), network("Solana")),
    ]))
}

/// Publisher keeping files and change requests in memory. Publishing to a
/// branch that was already used fails like the hosting service does.
#[derive(Default)]
pub struct MemoryPublisher {
    files: Mutex<HashMap<String, ExistingFile>>,
    published: Mutex<Vec<ChangeRequest>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files.lock().unwrap().insert(
            path.to_string(),
            ExistingFile {
                content: content.to_string(),
                revision: format!("rev-{path}"),
            },
        );
        self
    }

    pub fn published(&self) -> Vec<ChangeRequest> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChangeRequestPublisher for MemoryPublisher {
    async fn read_file(&self, path: &str) -> Result<Option<ExistingFile>, PublishError> {
        Ok(self.files.lock().unwrap().get(path).cloned())
    }

    async fn publish(&self, request: ChangeRequest) -> Result<PublishedChangeRequest, PublishError> {
        let mut published = self.published.lock().unwrap();
        if published.iter().any(|r| r.branch == request.branch) {
            return Err(PublishError::AlreadyExists(format!(
                "branch {} already exists",
                request.branch
            )));
        }

        let number = published.len() as u64 + 1;
        let result = PublishedChangeRequest {
            branch: request.branch.clone(),
            url: format!("https://example.org/pulls/{number}"),
            number,
        };
        published.push(request);
        Ok(result)
    }
}

/// Runs `app` on an ephemeral local port.
pub async fn spawn_router(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
