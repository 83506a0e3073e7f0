//! Reward schedule accounting
//!
//! Linear accrual at `reward_per_block` over `(start_block, end_block]`,
//! measured from `last_settled_block`. A rate change settles first, so the
//! current rate always applies to every unsettled block and no rate history
//! is kept.
//!
//! Every mutation is split into a pure `plan_*` step that validates and
//! computes the next state, and an infallible `commit_*` step. Callers that
//! must perform a fallible side effect in between (paying out) commit only
//! after it succeeded.

use super::{ChefError, ChefResult};
use crate::{Amount, BlockNumber};
use serde::{Deserialize, Serialize};

/// Phase of the schedule as seen at a given block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulePhase {
    /// `current_block <= start_block`
    NotStarted,
    /// Accruing or waiting for the closing claim
    Accruing,
    /// A claim settled at or after `end_block`; terminal
    Closed,
}

/// Settlement computed by [`RewardSchedule::plan_settlement`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// `last_settled_block` before the settlement
    pub from: BlockNumber,
    /// `last_settled_block` after the settlement
    pub to: BlockNumber,
    /// Reward accrued over `(from, to]`
    pub amount: Amount,
    /// Whether `to` is the end of the reward period
    pub reaches_end: bool,
}

/// Rate change computed by [`RewardSchedule::plan_rate_update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePlan {
    /// Settlement at the old rate, realized before the switch
    pub settlement: Settlement,
    pub previous_rate: Amount,
    pub new_rate: Amount,
}

/// Reward schedule of one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSchedule {
    start_block: BlockNumber,
    end_block: BlockNumber,
    reward_per_block: Amount,
    last_settled_block: BlockNumber,
    closed: bool,
}

impl RewardSchedule {
    /// Create a schedule. Requires `start_block < end_block` and a non-zero
    /// rate.
    pub fn new(
        start_block: BlockNumber,
        end_block: BlockNumber,
        reward_per_block: Amount,
    ) -> ChefResult<Self> {
        if start_block >= end_block {
            return Err(ChefError::InvalidConfig(format!(
                "start block {} must precede end block {}",
                start_block, end_block
            )));
        }
        if reward_per_block == 0 {
            return Err(ChefError::InvalidConfig(
                "reward per block must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            start_block,
            end_block,
            reward_per_block,
            last_settled_block: start_block,
            closed: false,
        })
    }

    pub fn start_block(&self) -> BlockNumber {
        self.start_block
    }

    pub fn end_block(&self) -> BlockNumber {
        self.end_block
    }

    pub fn reward_per_block(&self) -> Amount {
        self.reward_per_block
    }

    pub fn last_settled_block(&self) -> BlockNumber {
        self.last_settled_block
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn phase(&self, current_block: BlockNumber) -> SchedulePhase {
        if self.closed {
            SchedulePhase::Closed
        } else if current_block <= self.start_block {
            SchedulePhase::NotStarted
        } else {
            SchedulePhase::Accruing
        }
    }

    /// Reward accrued and not yet settled at `current_block`.
    ///
    /// Pure; errors only with `ArithmeticOverflow` on a misconfigured rate.
    pub fn pending_rewards(&self, current_block: BlockNumber) -> ChefResult<Amount> {
        if current_block <= self.start_block || current_block <= self.last_settled_block {
            return Ok(0);
        }

        let upto = current_block.min(self.end_block);
        if upto <= self.last_settled_block {
            return Ok(0);
        }

        let blocks = (upto - self.last_settled_block) as Amount;
        blocks
            .checked_mul(self.reward_per_block)
            .ok_or(ChefError::ArithmeticOverflow)
    }

    /// Compute the settlement up to `current_block` without applying it.
    ///
    /// At or before `start_block` the settlement is empty and leaves
    /// `last_settled_block` where it is.
    pub fn plan_settlement(&self, current_block: BlockNumber) -> ChefResult<Settlement> {
        let amount = self.pending_rewards(current_block)?;
        let upto = current_block.min(self.end_block);
        let to = if current_block <= self.start_block {
            self.last_settled_block
        } else {
            upto.max(self.last_settled_block)
        };

        Ok(Settlement {
            from: self.last_settled_block,
            to,
            amount,
            reaches_end: upto >= self.end_block,
        })
    }

    pub fn commit_settlement(&mut self, settlement: &Settlement) {
        self.last_settled_block = self.last_settled_block.max(settlement.to);
    }

    /// Settle up to `current_block` and return the amount settled
    pub fn settle_up_to(&mut self, current_block: BlockNumber) -> ChefResult<Amount> {
        let settlement = self.plan_settlement(current_block)?;
        self.commit_settlement(&settlement);
        Ok(settlement.amount)
    }

    /// Enter the terminal state
    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    pub fn plan_rate_update(
        &self,
        new_rate: Amount,
        current_block: BlockNumber,
    ) -> ChefResult<RatePlan> {
        if self.closed {
            return Err(ChefError::InvalidState);
        }

        Ok(RatePlan {
            settlement: self.plan_settlement(current_block)?,
            previous_rate: self.reward_per_block,
            new_rate,
        })
    }

    pub fn commit_rate_update(&mut self, plan: &RatePlan) {
        self.commit_settlement(&plan.settlement);
        self.reward_per_block = plan.new_rate;
    }

    /// Settle at the old rate, then switch to `new_rate`.
    ///
    /// Returns the amount realized at the old rate.
    pub fn update_rate(
        &mut self,
        new_rate: Amount,
        current_block: BlockNumber,
    ) -> ChefResult<Amount> {
        let plan = self.plan_rate_update(new_rate, current_block)?;
        self.commit_rate_update(&plan);
        Ok(plan.settlement.amount)
    }

    /// Move the end of the reward period.
    ///
    /// Only while the period is running and open. The new end must lie after
    /// `start_block` and not before `current_block` or `last_settled_block`.
    pub fn update_end_block(
        &mut self,
        new_end_block: BlockNumber,
        current_block: BlockNumber,
    ) -> ChefResult<()> {
        if self.closed || current_block >= self.end_block {
            return Err(ChefError::RewardPeriodOver);
        }
        if new_end_block <= self.start_block
            || new_end_block < current_block
            || new_end_block < self.last_settled_block
        {
            return Err(ChefError::InvalidEndBlock {
                requested: new_end_block,
                current: current_block,
            });
        }

        self.end_block = new_end_block;
        Ok(())
    }
}
