//! Node configuration
//!
//! Loaded from a JSON file. Every field has a default, so a partial file (or
//! no file) is valid. Token amounts are decimal strings in base units.

use crate::account::{Address, AddressError};
use crate::constants::{
    BPS_DENOMINATOR, DEFAULT_BLOCK_INTERVAL_MS, DEFAULT_RPC_PORT, DEFAULT_TRANSFER_FEE_BPS,
    ONE_TOKEN,
};
use crate::{Amount, BlockNumber};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid owner address: {0}")]
    Owner(#[from] AddressError),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChefConfig {
    /// Operator address; the well-known "owner" devnet account when unset
    pub owner: Option<String>,
    /// Block the simulated chain starts at
    pub genesis_block: BlockNumber,
    /// Blocks between genesis and the start of the reward period
    pub start_offset: u64,
    /// Length of the reward period in blocks
    pub period_length: u64,
    #[serde(with = "amount_string")]
    pub reward_per_block: Amount,
    /// Tokens the owner sends to the chef at first start
    #[serde(with = "amount_string")]
    pub funding: Amount,
    pub transfer_fee_bps: u32,
    #[serde(with = "amount_string")]
    pub pair_reserve0: Amount,
    #[serde(with = "amount_string")]
    pub pair_reserve1: Amount,
    pub block_interval_ms: u64,
    pub rpc_port: u16,
    pub db_path: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for ChefConfig {
    fn default() -> Self {
        Self {
            owner: None,
            genesis_block: 1,
            start_offset: 5,
            period_length: 100,
            reward_per_block: 5 * ONE_TOKEN,
            funding: 10_000 * ONE_TOKEN,
            transfer_fee_bps: DEFAULT_TRANSFER_FEE_BPS,
            pair_reserve0: 50 * ONE_TOKEN,
            pair_reserve1: 1_000_000 * ONE_TOKEN,
            block_interval_ms: DEFAULT_BLOCK_INTERVAL_MS,
            rpc_port: DEFAULT_RPC_PORT,
            db_path: "chef_data".to_string(),
            log_json: false,
        }
    }
}

impl ChefConfig {
    /// Read and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_length == 0 {
            return Err(ConfigError::Invalid(
                "period_length must be greater than 0".into(),
            ));
        }
        if self.reward_per_block == 0 {
            return Err(ConfigError::Invalid(
                "reward_per_block must be greater than 0".into(),
            ));
        }
        if self.transfer_fee_bps > BPS_DENOMINATOR {
            return Err(ConfigError::Invalid(format!(
                "transfer_fee_bps must not exceed {}",
                BPS_DENOMINATOR
            )));
        }
        if self.block_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "block_interval_ms must be greater than 0".into(),
            ));
        }
        self.owner_address()?;
        Ok(())
    }

    pub fn owner_address(&self) -> Result<Address, AddressError> {
        match &self.owner {
            Some(text) => text.parse(),
            None => Ok(Address::from_label("owner")),
        }
    }

    pub fn start_block(&self) -> BlockNumber {
        self.genesis_block.saturating_add(self.start_offset)
    }

    pub fn end_block(&self) -> BlockNumber {
        self.start_block().saturating_add(self.period_length)
    }
}

/// Serde adapter carrying `u128` amounts as decimal strings
pub mod amount_string {
    use crate::Amount;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.trim().parse::<Amount>().map_err(D::Error::custom)
    }
}
