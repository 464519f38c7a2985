//! Configuration loading for the client
//!
//! ```json
//! {
//!   "agreement": "0xcfa0000000000000000000000000000000000001",
//!   "event_name": "FlowUpdated",
//!   "from_block": 0,
//!   "to_block": "latest"
//! }
//! ```

use flowledger_core::{AccountId, TokenId};
use flowledger_ports::{BlockTag, EventQuery, FLOW_UPDATED_EVENT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address of the flow agreement contract
    pub agreement: AccountId,

    /// Log event carrying flow updates
    #[serde(default = "default_event_name")]
    pub event_name: String,

    /// First block of history replayed by listings
    #[serde(default)]
    pub from_block: u64,

    /// Last block replayed by listings
    #[serde(default)]
    pub to_block: BlockTag,
}

fn default_event_name() -> String {
    FLOW_UPDATED_EVENT.to_string()
}

impl ClientConfig {
    /// Full-history configuration for the agreement at `agreement`
    pub fn new(agreement: AccountId) -> Self {
        Self {
            agreement,
            event_name: default_event_name(),
            from_block: 0,
            to_block: BlockTag::Latest,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Log query for `token` over the configured block range
    pub fn event_query(&self, token: &TokenId) -> EventQuery {
        EventQuery {
            event: self.event_name.clone(),
            token: token.clone(),
            sender: None,
            receiver: None,
            from_block: self.from_block,
            to_block: self.to_block,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = ClientConfig::from_json(r#"{ "agreement": "0xcfa" }"#).unwrap();
        assert_eq!(config, ClientConfig::new(AccountId::new("0xcfa")));
        assert_eq!(config.event_name, "FlowUpdated");
    }

    #[test]
    fn test_block_range() {
        let config = ClientConfig::from_json(
            r#"{ "agreement": "0xcfa", "from_block": 10, "to_block": { "number": 20 } }"#,
        )
        .unwrap();
        let query = config.event_query(&TokenId::new("fDAIx"));
        assert_eq!(query.from_block, 10);
        assert_eq!(query.to_block, BlockTag::Number(20));
        assert_eq!(query.sender, None);
        assert_eq!(query.receiver, None);
    }

    #[test]
    fn test_agreement_is_required() {
        assert!(matches!(
            ClientConfig::from_json("{}"),
            Err(ConfigError::Parse(_))
        ));
    }
}
