//! The RPC offering a submitter fills in.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{0} must not be blank")]
    Blank(&'static str),

    #[error("slug {0:?} has no usable characters")]
    InvalidSlug(String),

    #[error("action button {0:?} is not a single [label](url) link")]
    InvalidActionButton(String),

    /// Records are one per line, so no field may contain a line break.
    #[error("{0} must not contain line breaks")]
    LineBreak(&'static str),
}

/// Write-side RPC record. The verification columns of the canonical file
/// are reserved and have no counterpart here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcFormData {
    pub slug: String,
    pub provider: String,
    pub plan: String,
    pub node_type: String,
    pub chain: String,
    pub address: String,
    pub access_price: String,
    pub query_price: String,
    pub uptime_sla: String,
    pub bandwidth_sla: String,
    pub blocks_behind_sla: String,
    pub starred: bool,
    pub trial: bool,
    pub available_apis: Vec<String>,
    pub limitations: Vec<String>,
    pub security_improvements: Vec<String>,
    pub monitoring_and_analytics: Vec<String>,
    pub regions: Vec<String>,
    pub action_buttons: Vec<String>,
}

impl RpcFormData {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("slug", &self.slug),
            ("provider", &self.provider),
            ("plan", &self.plan),
            ("chain", &self.chain),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::Blank(name));
            }
        }

        for (name, value) in self.text_fields() {
            if value.contains(['\n', '\r']) {
                return Err(ValidationError::LineBreak(name));
            }
        }

        if branch_slug(&self.slug).is_empty() {
            return Err(ValidationError::InvalidSlug(self.slug.clone()));
        }

        for button in &self.action_buttons {
            if !is_markdown_link(button) {
                return Err(ValidationError::InvalidActionButton(button.clone()));
            }
        }

        Ok(())
    }

    fn text_fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        let scalars = [
            ("slug", &self.slug),
            ("provider", &self.provider),
            ("plan", &self.plan),
            ("nodeType", &self.node_type),
            ("chain", &self.chain),
            ("address", &self.address),
            ("accessPrice", &self.access_price),
            ("queryPrice", &self.query_price),
            ("uptimeSla", &self.uptime_sla),
            ("bandwidthSla", &self.bandwidth_sla),
            ("blocksBehindSla", &self.blocks_behind_sla),
        ];
        let lists = [
            ("availableApis", &self.available_apis),
            ("limitations", &self.limitations),
            ("securityImprovements", &self.security_improvements),
            ("monitoringAndAnalytics", &self.monitoring_and_analytics),
            ("regions", &self.regions),
            ("actionButtons", &self.action_buttons),
        ];

        scalars
            .into_iter()
            .map(|(name, value)| (name, value.as_str()))
            .chain(
                lists
                    .into_iter()
                    .flat_map(|(name, items)| items.iter().map(move |item| (name, item.as_str()))),
            )
    }
}

/// `[label](url)` with a non-empty label and an absolute URL, nothing else.
pub fn is_markdown_link(text: &str) -> bool {
    let Some(inner) = text.trim().strip_prefix('[') else {
        return false;
    };
    let Some((label, rest)) = inner.split_once("](") else {
        return false;
    };
    let Some(target) = rest.strip_suffix(')') else {
        return false;
    };

    !label.trim().is_empty()
        && !label.contains(['[', ']'])
        && !target.contains(char::is_whitespace)
        && Url::parse(target).is_ok()
}

/// Slug reduced to `[a-z0-9-]`, without leading, trailing or repeated dashes.
pub fn branch_slug(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    for c in slug.trim().chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Branch that carries one submission.
pub fn branch_name(network: &str, form: &RpcFormData) -> String {
    format!("add-rpc/{}/{}", network.to_lowercase(), branch_slug(&form.slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> RpcFormData {
        RpcFormData {
            slug: "alchemy-growth".into(),
            provider: "Alchemy".into(),
            plan: "Growth".into(),
            chain: "mainnet".into(),
            action_buttons: vec!["[Website](https://alchemy.com)".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let form: RpcFormData = serde_json::from_value(json!({
            "slug": "ankr-premium",
            "provider": "Ankr",
            "plan": "Premium",
            "chain": "mainnet",
            "nodeType": "Archive",
            "blocksBehindSla": "2",
            "availableApis": ["eth", "net"],
            "starred": true
        }))
        .unwrap();

        assert_eq!(form.node_type, "Archive");
        assert_eq!(form.blocks_behind_sla, "2");
        assert_eq!(form.available_apis, vec!["eth", "net"]);
        assert!(form.starred);
        assert!(!form.trial);
        assert!(form.regions.is_empty());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_required_fields() {
        assert!(valid().validate().is_ok());

        let form = RpcFormData {
            plan: "  ".into(),
            ..valid()
        };
        assert_eq!(form.validate(), Err(ValidationError::Blank("plan")));

        let form = RpcFormData {
            slug: "!!!".into(),
            ..valid()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::InvalidSlug("!!!".into()))
        );
    }

    #[test]
    fn test_line_breaks_rejected() {
        let form = RpcFormData {
            plan: "Growth\r\nTier".into(),
            ..valid()
        };
        assert_eq!(form.validate(), Err(ValidationError::LineBreak("plan")));

        let form = RpcFormData {
            limitations: vec!["none".into(), "a\n\nb".into()],
            ..valid()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::LineBreak("limitations"))
        );

        let form = RpcFormData {
            address: "wss://rpc.example.org\n".into(),
            ..valid()
        };
        assert_eq!(form.validate(), Err(ValidationError::LineBreak("address")));
    }

    #[test]
    fn test_action_buttons() {
        assert!(is_markdown_link("[Docs](https://docs.example.org/rpc)"));
        assert!(is_markdown_link(" [Docs](https://docs.example.org) "));
        assert!(!is_markdown_link("https://docs.example.org"));
        assert!(!is_markdown_link("[](https://docs.example.org)"));
        assert!(!is_markdown_link("[Docs](not a url)"));
        assert!(!is_markdown_link("[Docs](https://a.org) [More](https://b.org)"));

        let form = RpcFormData {
            action_buttons: vec!["[Site](https://ok.org)".into(), "plain".into()],
            ..valid()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::InvalidActionButton("plain".into()))
        );
    }

    #[test]
    fn test_branch_name() {
        assert_eq!(branch_slug("Alchemy Growth_2024!"), "alchemy-growth-2024");
        assert_eq!(branch_slug("--a--b--"), "a-b");
        assert_eq!(branch_name("ETH", &valid()), "add-rpc/eth/alchemy-growth");
    }
}
