//! Exactly-once settlement
//!
//! A claim plans the settlement, routes the payout, and commits the plan
//! only once the payout succeeded. A failed payout leaves the schedule and
//! the history untouched.

use super::{ClaimReceipt, SettlementKind};
use crate::account::Address;
use crate::chain::PayoutRouter;
use crate::crypto::Hash;
use crate::schedule::{ChefError, ChefResult, RewardSchedule, Settlement};
use crate::{Amount, BlockNumber};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Settlement history of one deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementController {
    receipts: Vec<ClaimReceipt>,
}

impl SettlementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receipts(&self) -> &[ClaimReceipt] {
        &self.receipts
    }

    pub fn last_id(&self) -> Hash {
        self.receipts.last().map(|r| r.id).unwrap_or_default()
    }

    /// Sum of every amount settled so far
    pub fn total_settled(&self) -> Amount {
        self.receipts.iter().map(|r| r.amount).sum()
    }

    /// Settle everything pending at `current_block` and pay it out.
    ///
    /// Zero-amount claims are valid no-ops and produce no receipt and no
    /// payout; the returned receipt then carries sequence 0. Once a claim
    /// reaches `end_block` the period is closed and every further claim
    /// fails with `AlreadyClaimed`.
    pub fn claim_for_all<R: PayoutRouter + ?Sized>(
        &mut self,
        schedule: &mut RewardSchedule,
        current_block: BlockNumber,
        holder: &Address,
        router: &mut R,
    ) -> ChefResult<ClaimReceipt> {
        if schedule.is_closed() {
            warn!(
                block = current_block,
                "claim rejected: period already closed"
            );
            return Err(ChefError::AlreadyClaimed);
        }

        let plan = schedule.plan_settlement(current_block)?;
        let consumed = Self::route(&plan, holder, router)?;

        schedule.commit_settlement(&plan);
        if plan.reaches_end {
            schedule.close();
            info!(
                block = current_block,
                end_block = schedule.end_block(),
                "reward period closed"
            );
        }

        Ok(self.record(
            SettlementKind::Claim,
            current_block,
            &plan,
            consumed,
            plan.reaches_end,
        ))
    }

    /// Realize accrual at the old rate and switch to `new_rate`.
    ///
    /// Same plan, route, commit protocol as a claim. Does not close the
    /// period even when the settlement reaches `end_block`.
    pub fn settle_rate_change<R: PayoutRouter + ?Sized>(
        &mut self,
        schedule: &mut RewardSchedule,
        new_rate: Amount,
        current_block: BlockNumber,
        holder: &Address,
        router: &mut R,
    ) -> ChefResult<ClaimReceipt> {
        let plan = schedule.plan_rate_update(new_rate, current_block)?;
        let consumed = Self::route(&plan.settlement, holder, router)?;

        schedule.commit_rate_update(&plan);
        info!(
            block = current_block,
            previous_rate = %plan.previous_rate,
            new_rate = %plan.new_rate,
            realized = %plan.settlement.amount,
            "reward rate updated"
        );

        Ok(self.record(
            SettlementKind::RateChange,
            current_block,
            &plan.settlement,
            consumed,
            false,
        ))
    }

    fn route<R: PayoutRouter + ?Sized>(
        plan: &Settlement,
        holder: &Address,
        router: &mut R,
    ) -> ChefResult<Amount> {
        if plan.amount == 0 {
            return Ok(0);
        }

        router.route(holder, plan.amount).map_err(|e| {
            warn!(amount = %plan.amount, error = %e, "payout failed, settlement not committed");
            ChefError::from(e)
        })
    }

    /// Append a receipt for a non-empty settlement.
    ///
    /// Empty settlements are reported to the caller but not recorded,
    /// except when they close the period.
    fn record(
        &mut self,
        kind: SettlementKind,
        block: BlockNumber,
        plan: &Settlement,
        consumed: Amount,
        closed: bool,
    ) -> ClaimReceipt {
        let recorded = plan.amount > 0 || closed;
        let sequence = if recorded { self.receipts.len() as u64 + 1 } else { 0 };
        let receipt = ClaimReceipt::new(
            sequence,
            kind,
            block,
            plan.from,
            plan.to,
            plan.amount,
            consumed,
            closed,
            self.last_id(),
        );

        if recorded {
            info!(
                sequence,
                kind = ?kind,
                block,
                from = plan.from,
                to = plan.to,
                amount = %plan.amount,
                consumed = %consumed,
                id = %receipt.id,
                "settlement recorded"
            );
            self.receipts.push(receipt.clone());
        } else {
            debug!(block, kind = ?kind, "nothing to settle");
        }

        receipt
    }
}
