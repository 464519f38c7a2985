//! Configuration loading for the ledger simulator

use chrono::{DateTime, Duration, Utc};
use flowledger_core::{AccountId, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Order in which `get_past_events` hands back matching events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrder {
    /// Log order, as a node returns it
    #[default]
    Chronological,
    /// Newest first; exercises order-independence of consumers
    Reversed,
}

/// Root configuration for the ledger simulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Address the flow agreement is deployed at
    #[serde(default = "default_agreement")]
    pub agreement: AccountId,

    /// Time of block `start_block`
    #[serde(default = "default_genesis_time")]
    pub genesis_time: Timestamp,

    /// Seconds between consecutive blocks
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,

    /// Deposit locked per flow, in seconds of flow
    #[serde(default = "default_liquidation_period_secs")]
    pub liquidation_period_secs: u64,

    /// Block height before the first call
    #[serde(default)]
    pub start_block: u64,

    #[serde(default)]
    pub event_order: EventOrder,
}

fn default_agreement() -> AccountId {
    AccountId::new("0xcfa0000000000000000000000000000000000001")
}

fn default_genesis_time() -> Timestamp {
    DateTime::<Utc>::UNIX_EPOCH
}

fn default_block_time_secs() -> u64 {
    12
}

fn default_liquidation_period_secs() -> u64 {
    4 * 60 * 60
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            agreement: default_agreement(),
            genesis_time: default_genesis_time(),
            block_time_secs: default_block_time_secs(),
            liquidation_period_secs: default_liquidation_period_secs(),
            start_block: 0,
            event_order: EventOrder::default(),
        }
    }
}

impl SimulatorConfig {
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
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Interval between blocks, `None` if `block_time_secs` does not fit
    /// a chrono duration
    pub fn block_time(&self) -> Option<Duration> {
        i64::try_from(self.block_time_secs)
            .ok()
            .and_then(Duration::try_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_time().is_none() {
            return Err(ConfigError::Invalid(format!(
                "block_time_secs {} is out of range",
                self.block_time_secs
            )));
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
