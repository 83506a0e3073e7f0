//! Chef deployment
//!
//! One reward schedule, its settlement history and its operator. Reads the
//! current block from the environment's [`BlockClock`] and forwards every
//! call to the controllers with that block as an explicit argument.

use crate::account::Address;
use crate::admin::{AdminController, OwnerOnly, SweepReceipt};
use crate::chain::{BlockClock, PayoutRouter, RewardToken};
use crate::schedule::{ChefResult, RewardSchedule, SchedulePhase};
use crate::settlement::{verify_receipt_chain, ClaimReceipt, SettlementController};
use crate::{Amount, BlockNumber};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chef {
    /// Account holding the reward balance
    address: Address,
    schedule: RewardSchedule,
    settlement: SettlementController,
    admin: AdminController<OwnerOnly>,
}

impl Chef {
    /// Deploy a new instance at `address`, operated by `owner`
    pub fn deploy(
        address: Address,
        owner: Address,
        start_block: BlockNumber,
        end_block: BlockNumber,
        reward_per_block: Amount,
    ) -> ChefResult<Self> {
        let schedule = RewardSchedule::new(start_block, end_block, reward_per_block)?;
        info!(
            %address,
            %owner,
            start_block,
            end_block,
            reward_per_block = %reward_per_block,
            "chef deployed"
        );

        Ok(Self {
            address,
            schedule,
            settlement: SettlementController::new(),
            admin: AdminController::new(OwnerOnly { owner }),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        &self.admin.authorizer().owner
    }

    pub fn schedule(&self) -> &RewardSchedule {
        &self.schedule
    }

    pub fn start_block(&self) -> BlockNumber {
        self.schedule.start_block()
    }

    pub fn end_block(&self) -> BlockNumber {
        self.schedule.end_block()
    }

    pub fn reward_per_block(&self) -> Amount {
        self.schedule.reward_per_block()
    }

    pub fn last_settled_block(&self) -> BlockNumber {
        self.schedule.last_settled_block()
    }

    pub fn receipts(&self) -> &[ClaimReceipt] {
        self.settlement.receipts()
    }

    pub fn total_settled(&self) -> Amount {
        self.settlement.total_settled()
    }

    /// Whether the recorded settlement history is an intact hash chain
    pub fn verify_history(&self) -> bool {
        verify_receipt_chain(self.settlement.receipts())
    }

    pub fn phase<C: BlockClock + ?Sized>(&self, clock: &C) -> SchedulePhase {
        self.schedule.phase(clock.current_block())
    }

    pub fn pending_rewards<C: BlockClock + ?Sized>(&self, clock: &C) -> ChefResult<Amount> {
        self.schedule.pending_rewards(clock.current_block())
    }

    pub fn claim_for_all<E: BlockClock + PayoutRouter + ?Sized>(
        &mut self,
        caller: &Address,
        env: &mut E,
    ) -> ChefResult<ClaimReceipt> {
        self.admin.authorize(caller, "claim_for_all")?;
        let block = env.current_block();
        self.settlement
            .claim_for_all(&mut self.schedule, block, &self.address, env)
    }

    pub fn update_reward_rate<E: BlockClock + PayoutRouter + ?Sized>(
        &mut self,
        caller: &Address,
        new_rate: Amount,
        env: &mut E,
    ) -> ChefResult<ClaimReceipt> {
        let block = env.current_block();
        self.admin.update_reward_rate(
            caller,
            &mut self.schedule,
            &mut self.settlement,
            new_rate,
            block,
            &self.address,
            env,
        )
    }

    pub fn update_end_block<C: BlockClock + ?Sized>(
        &mut self,
        caller: &Address,
        new_end_block: BlockNumber,
        clock: &C,
    ) -> ChefResult<()> {
        self.admin.update_end_block(
            caller,
            &mut self.schedule,
            new_end_block,
            clock.current_block(),
        )
    }

    pub fn sweep<T: RewardToken + ?Sized>(
        &mut self,
        caller: &Address,
        recipient: &Address,
        token: &mut T,
    ) -> ChefResult<SweepReceipt> {
        self.admin.sweep(caller, &self.address, recipient, token)
    }
}
