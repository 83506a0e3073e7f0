//! In-memory chain simulation
//!
//! A fee-on-transfer reward token, a two-asset pair and a block counter.
//! The development node and the test suites run the engine against this.
//! Nothing here is part of the settlement logic.

use super::{
    BlockClock, LiquidityPool, PayoutError, PayoutRouter, Reserves, RewardToken, TokenError,
};
use crate::account::Address;
use crate::constants::BPS_DENOMINATOR;
use crate::{Amount, BlockNumber};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reward token that burns a fixed share of every transfer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeToken {
    balances: HashMap<Address, Amount>,
    fee_bps: u32,
    total_burned: Amount,
}

impl FeeToken {
    pub fn new(fee_bps: u32) -> Self {
        Self {
            balances: HashMap::new(),
            fee_bps: fee_bps.min(BPS_DENOMINATOR),
            total_burned: 0,
        }
    }

    /// Credit `amount` out of thin air (funding and test setup only)
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;
        Ok(())
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    pub fn total_burned(&self) -> Amount {
        self.total_burned
    }

    /// Fee charged on a transfer of `amount`, rounded down
    pub fn fee_for(&self, amount: Amount) -> Amount {
        let denominator = BPS_DENOMINATOR as Amount;
        let bps = self.fee_bps as Amount;
        // Split to keep `amount * bps` from overflowing
        (amount / denominator) * bps + (amount % denominator) * bps / denominator
    }
}

impl RewardToken for FeeToken {
    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }

        let fee = self.fee_for(amount);
        let received = amount - fee;
        let credited = self
            .balance_of(to)
            .checked_add(received)
            .ok_or(TokenError::BalanceOverflow)?;

        if from == to {
            self.balances.insert(*from, have - fee);
        } else {
            self.balances.insert(*from, have - amount);
            self.balances.insert(*to, credited);
        }
        self.total_burned += fee;
        Ok(())
    }
}

/// Reward token / paired asset pool.
///
/// Reserves only move on [`Pair::sync`]; there is no swap logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pair {
    address: Address,
    reserve0: Amount,
    reserve1: Amount,
    block_timestamp_last: u64,
}

impl Pair {
    pub fn new(address: Address, reserve0: Amount, reserve1: Amount) -> Self {
        Self {
            address,
            reserve0,
            reserve1,
            block_timestamp_last: 0,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Match the reward-token reserve to the pair's actual token balance
    pub fn sync(&mut self, token_balance: Amount, block: BlockNumber) {
        self.reserve1 = token_balance;
        self.block_timestamp_last = block;
    }

    pub fn reserves(&self) -> Reserves {
        Reserves {
            reserve0: self.reserve0,
            reserve1: self.reserve1,
            block_timestamp_last: self.block_timestamp_last,
        }
    }
}

/// Simulated chain: block counter, reward token and pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimChain {
    block: BlockNumber,
    token: FeeToken,
    pair: Pair,
}

impl SimChain {
    /// Create a chain at `genesis_block` whose pair already holds
    /// `reserve1` reward tokens against `reserve0` of the paired asset.
    pub fn new(
        genesis_block: BlockNumber,
        fee_bps: u32,
        pair_address: Address,
        reserve0: Amount,
        reserve1: Amount,
    ) -> Result<Self, TokenError> {
        let mut token = FeeToken::new(fee_bps);
        token.mint(&pair_address, reserve1)?;

        let mut pair = Pair::new(pair_address, reserve0, reserve1);
        pair.sync(reserve1, genesis_block);

        Ok(Self {
            block: genesis_block,
            token,
            pair,
        })
    }

    /// Advance the block number by `blocks`
    pub fn mine(&mut self, blocks: u64) -> BlockNumber {
        self.block = self.block.saturating_add(blocks);
        self.block
    }

    /// Advance until the block number is at least `target`
    pub fn mine_to(&mut self, target: BlockNumber) -> BlockNumber {
        if target > self.block {
            self.block = target;
        }
        self.block
    }

    pub fn token(&self) -> &FeeToken {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut FeeToken {
        &mut self.token
    }

    pub fn pair(&self) -> &Pair {
        &self.pair
    }
}

impl BlockClock for SimChain {
    fn current_block(&self) -> BlockNumber {
        self.block
    }
}

impl RewardToken for SimChain {
    fn balance_of(&self, holder: &Address) -> Amount {
        self.token.balance_of(holder)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        self.token.transfer(from, to, amount)?;
        if to == self.pair.address() || from == self.pair.address() {
            let balance = self.token.balance_of(self.pair.address());
            self.pair.sync(balance, self.block);
        }
        Ok(())
    }
}

impl LiquidityPool for SimChain {
    fn get_reserves(&self) -> Reserves {
        self.pair.reserves()
    }
}

impl PayoutRouter for SimChain {
    /// Donate `amount` to the pair and sync its reserves
    fn route(&mut self, from: &Address, amount: Amount) -> Result<Amount, PayoutError> {
        if from == self.pair.address() {
            return Err(PayoutError::Rejected("pair cannot pay itself".to_string()));
        }

        let before = self.token.balance_of(from);
        let pair_address = *self.pair.address();
        RewardToken::transfer(self, from, &pair_address, amount)?;
        let after = self.token.balance_of(from);

        Ok(before.saturating_sub(after))
    }
}
