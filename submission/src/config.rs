use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("records_path must contain {{network}}: {0}")]
    MissingNetworkPlaceholder(String),

    #[error("github.{0} must not be empty")]
    EmptyGithubField(&'static str),
}

/// Write path configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    pub github: GithubConfig,
    /// Location of a network's canonical record file in the repository.
    #[serde(default = "default_records_path")]
    pub records_path: String,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.records_path.contains("{network}") {
            return Err(ValidationError::MissingNetworkPlaceholder(
                self.records_path.clone(),
            ));
        }
        self.github.validate()
    }

    pub fn records_path(&self, network: &str) -> String {
        self.records_path.replace("{network}", network)
    }
}

fn default_records_path() -> String {
    "{network}/rpc.csv".to_string()
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GithubConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// REST API root, [`DEFAULT_API_URL`] when unset
    #[serde(default)]
    pub api_url: Option<Url>,
}

impl GithubConfig {
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_ref()
            .map_or(DEFAULT_API_URL, Url::as_str)
            .trim_end_matches('/')
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("base_branch", &self.base_branch),
            ("token_env", &self.token_env),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyGithubField(name));
            }
        }
        Ok(())
    }
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
