//! `encode-rpc` and `submit-rpc`.

use crate::config::Config;
use crate::errors::CliError;
use aggregator::networks::Networks;
use std::path::Path;
use std::sync::Arc;
use submission::RpcFormData;
use submission::codec::{HEADER, encode_line};
use submission::github::GithubPublisher;
use submission::{SubmissionService, config::Config as SubmissionConfig};

/// Reads a form from a YAML or JSON file.
pub fn read_form(path: &Path) -> Result<RpcFormData, CliError> {
    let file = std::fs::File::open(path)?;
    Ok(serde_yaml::from_reader(file)?)
}

/// Canonical line for `form`, preceded by the header when asked.
pub fn encode(form: &RpcFormData, header: bool) -> Result<String, CliError> {
    form.validate()?;
    let line = encode_line(form);
    Ok(if header {
        format!("{HEADER}\n{line}")
    } else {
        line
    })
}

pub fn encode_rpc(path: &Path, header: bool) -> Result<(), CliError> {
    let form = read_form(path)?;
    println!("{}", encode(&form, header)?);
    Ok(())
}

/// Write path backed by GitHub. The token is read from the configured
/// environment variable.
pub fn submission_service(
    networks: Networks,
    config: &SubmissionConfig,
) -> Result<SubmissionService, CliError> {
    let token_env = &config.github.token_env;
    let token = std::env::var(token_env).map_err(|_| CliError::MissingToken(token_env.clone()))?;
    let publisher = GithubPublisher::new(&config.github, &token)?;

    Ok(SubmissionService::new(
        networks,
        Arc::new(publisher),
        config.clone(),
    ))
}

pub async fn submit_rpc(config: &Config, network: &str, path: &Path) -> Result<(), CliError> {
    let Some(submission_config) = &config.submission else {
        return Err(CliError::Usage(
            "submit-rpc needs a submission section in the config".to_string(),
        ));
    };

    let form = read_form(path)?;
    let networks = Networks::new(config.aggregator.networks.clone());
    let service = submission_service(networks, submission_config)?;

    let published = service.submit(network, form).await?;
    println!("{}", serde_json::to_string_pretty(&published)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_encode_from_yaml_file() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(
            tmp,
            r#"
slug: drpc-free
provider: dRPC
plan: Free
chain: mainnet
trial: true
regions: [EU, US]
"#
        )
        .expect("write yaml");

        let form = read_form(tmp.path()).expect("read form");
        let encoded = encode(&form, true).expect("encode");

        let mut lines = encoded.lines();
        assert_eq!(lines.next(), Some(HEADER));
        let line = lines.next().expect("record line");
        assert!(line.starts_with("drpc-free,dRPC,Free,,mainnet,null,"));
        assert!(line.contains(r#",FALSE,TRUE,,,,,"[""EU"",""US""]",null,null,null,,null"#));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_encode_rejects_invalid_form() {
        let form = RpcFormData {
            slug: "x".into(),
            ..Default::default()
        };
        assert!(matches!(
            encode(&form, false),
            Err(CliError::Validation(submission::form::ValidationError::Blank("provider")))
        ));
    }
}
