//! Development network bootstrap
//!
//! Builds the simulated chain and deploys a funded chef on it, the same way
//! every time for a given config.

use super::{Chef, ChefConfig, ConfigError};
use crate::account::{Address, AddressError};
use crate::chain::{RewardToken, SimChain, TokenError};
use crate::schedule::ChefError;
use thiserror::Error;
use tracing::info;

/// Label of the chef's holder account
pub const CHEF_LABEL: &str = "chef";

/// Label of the pair account
pub const PAIR_LABEL: &str = "pair";

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    #[error("Chef error: {0}")]
    Chef(#[from] ChefError),
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Simulated chain plus the chef deployed on it
#[derive(Debug, Clone)]
pub struct Devnet {
    pub chain: SimChain,
    pub chef: Chef,
}

/// Create the chain, deploy the chef and fund it from the owner.
///
/// Funding goes through a regular token transfer, so the chef starts with
/// `funding` minus the transfer fee.
pub fn create_devnet(config: &ChefConfig) -> Result<Devnet, NodeError> {
    config.validate()?;
    let owner = config.owner_address()?;

    let mut chain = SimChain::new(
        config.genesis_block,
        config.transfer_fee_bps,
        Address::from_label(PAIR_LABEL),
        config.pair_reserve0,
        config.pair_reserve1,
    )?;

    let chef = Chef::deploy(
        Address::from_label(CHEF_LABEL),
        owner,
        config.start_block(),
        config.end_block(),
        config.reward_per_block,
    )?;

    chain.token_mut().mint(&owner, config.funding)?;
    chain.transfer(&owner, chef.address(), config.funding)?;
    info!(
        chef = %chef.address(),
        funded = %chain.balance_of(chef.address()),
        "devnet created"
    );

    Ok(Devnet { chain, chef })
}

/// Names of the deployment settings where a restored snapshot and `config`
/// disagree. The snapshot wins on restore; these are only reported.
pub fn snapshot_drift(
    config: &ChefConfig,
    chef: &Chef,
    chain: &SimChain,
) -> Result<Vec<&'static str>, NodeError> {
    let mut drift = Vec::new();
    if *chef.owner() != config.owner_address()? {
        drift.push("owner");
    }
    if chef.start_block() != config.start_block() {
        drift.push("start_block");
    }
    if chef.end_block() != config.end_block() {
        drift.push("end_block");
    }
    if chef.reward_per_block() != config.reward_per_block {
        drift.push("reward_per_block");
    }
    if chain.token().fee_bps() != config.transfer_fee_bps {
        drift.push("transfer_fee_bps");
    }
    Ok(drift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{BlockClock, LiquidityPool};
    use crate::constants::ONE_TOKEN;

    #[test]
    fn test_devnet_funding_is_net_of_fee() {
        let devnet = create_devnet(&ChefConfig::default()).unwrap();
        assert_eq!(
            devnet.chain.balance_of(devnet.chef.address()),
            9_800 * ONE_TOKEN
        );
        assert_eq!(devnet.chain.current_block(), 1);
        assert_eq!(devnet.chef.start_block(), 6);
        assert_eq!(devnet.chef.end_block(), 106);
    }

    #[test]
    fn test_devnet_is_deterministic() {
        let a = create_devnet(&ChefConfig::default()).unwrap();
        let b = create_devnet(&ChefConfig::default()).unwrap();
        assert_eq!(a.chef, b.chef);
        assert_eq!(a.chain.get_reserves(), b.chain.get_reserves());
    }

    #[test]
    fn test_snapshot_matching_config_has_no_drift() {
        let config = ChefConfig::default();
        let devnet = create_devnet(&config).unwrap();
        assert!(snapshot_drift(&config, &devnet.chef, &devnet.chain)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_snapshot_drift_names_changed_settings() {
        let devnet = create_devnet(&ChefConfig::default()).unwrap();
        let config = ChefConfig {
            owner: Some(Address::from_label("new-owner").to_string()),
            period_length: 200,
            transfer_fee_bps: 0,
            ..ChefConfig::default()
        };

        let drift = snapshot_drift(&config, &devnet.chef, &devnet.chain).unwrap();
        assert_eq!(drift, vec!["owner", "end_block", "transfer_fee_bps"]);
    }
}
