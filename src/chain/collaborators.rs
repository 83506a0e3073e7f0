//! Interfaces of the external collaborators
//!
//! The engine never advances the clock, never moves tokens on its own
//! account and never prices a swap. It reads the block number through
//! [`BlockClock`], pays out through [`PayoutRouter`] and drains its balance
//! through [`RewardToken`].

use crate::account::Address;
use crate::{Amount, BlockNumber};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token collaborator errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },
    #[error("Balance overflow")]
    BalanceOverflow,
}

/// Payout collaborator errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayoutError {
    #[error("Token transfer failed: {0}")]
    Token(#[from] TokenError),
    #[error("Payout rejected: {0}")]
    Rejected(String),
}

/// Monotonic block counter owned by the environment
pub trait BlockClock {
    fn current_block(&self) -> BlockNumber;
}

/// Fungible reward token.
///
/// Implementations may charge a fee on transfer, so the recipient can be
/// credited less than `amount`. Callers must re-query balances instead of
/// computing them.
pub trait RewardToken {
    fn balance_of(&self, holder: &Address) -> Amount;

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;
}

/// Pool reserves snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    /// Paired asset reserve
    pub reserve0: Amount,
    /// Reward token reserve
    pub reserve1: Amount,
    /// Block of the last reserve update
    pub block_timestamp_last: u64,
}

/// Liquidity pool reserves query
pub trait LiquidityPool {
    fn get_reserves(&self) -> Reserves;
}

/// Downstream payout capability.
///
/// Routes `amount` of the reward token held by `from` and reports how much
/// the holder's balance actually decreased, which may differ from `amount`.
pub trait PayoutRouter {
    fn route(&mut self, from: &Address, amount: Amount) -> Result<Amount, PayoutError>;
}
