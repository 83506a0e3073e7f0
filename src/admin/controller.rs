//! Gated mutation surface
//!
//! Authorization is delegated to an [`Authorizer`]; the controller only
//! decides whether a mutation is allowed in the schedule's current phase and
//! forwards it to the schedule or the settlement controller.

use crate::account::Address;
use crate::chain::{PayoutRouter, RewardToken};
use crate::schedule::{ChefError, ChefResult, RewardSchedule};
use crate::settlement::{ClaimReceipt, SettlementController};
use crate::{Amount, BlockNumber};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Access-control collaborator
pub trait Authorizer {
    fn is_authorized(&self, caller: &Address) -> bool;
}

/// Single owner allowed to operate the deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerOnly {
    pub owner: Address,
}

impl Authorizer for OwnerOnly {
    fn is_authorized(&self, caller: &Address) -> bool {
        *caller == self.owner
    }
}

/// Outcome of a sweep, measured from balances re-queried after the transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReceipt {
    pub recipient: Address,
    /// Holder balance handed to the token
    pub requested: Amount,
    /// Observed increase of the recipient's balance
    pub received: Amount,
    /// Holder balance left after the transfer
    pub remaining: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminController<A> {
    authorizer: A,
}

impl<A: Authorizer> AdminController<A> {
    pub fn new(authorizer: A) -> Self {
        Self { authorizer }
    }

    pub fn authorizer(&self) -> &A {
        &self.authorizer
    }

    pub fn authorize(&self, caller: &Address, action: &str) -> ChefResult<()> {
        if self.authorizer.is_authorized(caller) {
            Ok(())
        } else {
            warn!(%caller, action, "unauthorized call rejected");
            Err(ChefError::Unauthorized)
        }
    }

    /// Switch the reward rate, paying out what accrued at the old rate first
    #[allow(clippy::too_many_arguments)]
    pub fn update_reward_rate<R: PayoutRouter + ?Sized>(
        &self,
        caller: &Address,
        schedule: &mut RewardSchedule,
        settlement: &mut SettlementController,
        new_rate: Amount,
        current_block: BlockNumber,
        holder: &Address,
        router: &mut R,
    ) -> ChefResult<ClaimReceipt> {
        self.authorize(caller, "update_reward_rate")?;
        settlement
            .settle_rate_change(schedule, new_rate, current_block, holder, router)
            .map_err(|e| {
                if e == ChefError::InvalidState {
                    warn!(block = current_block, "rate update rejected: period closed");
                }
                e
            })
    }

    pub fn update_end_block(
        &self,
        caller: &Address,
        schedule: &mut RewardSchedule,
        new_end_block: BlockNumber,
        current_block: BlockNumber,
    ) -> ChefResult<()> {
        self.authorize(caller, "update_end_block")?;

        let previous = schedule.end_block();
        match schedule.update_end_block(new_end_block, current_block) {
            Ok(()) => {
                info!(
                    block = current_block,
                    previous,
                    new_end_block,
                    "end block updated"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    block = current_block,
                    new_end_block,
                    error = %e,
                    "end block update rejected"
                );
                Err(e)
            }
        }
    }

    /// Move the holder's entire reward-token balance to `recipient`.
    ///
    /// Independent of the schedule phase.
    pub fn sweep<T: RewardToken + ?Sized>(
        &self,
        caller: &Address,
        holder: &Address,
        recipient: &Address,
        token: &mut T,
    ) -> ChefResult<SweepReceipt> {
        self.authorize(caller, "sweep")?;

        let requested = token.balance_of(holder);
        let recipient_before = token.balance_of(recipient);
        if requested > 0 {
            token.transfer(holder, recipient, requested)?;
        }

        let receipt = SweepReceipt {
            recipient: *recipient,
            requested,
            received: token
                .balance_of(recipient)
                .saturating_sub(recipient_before),
            remaining: token.balance_of(holder),
        };
        info!(
            %recipient,
            requested = %receipt.requested,
            received = %receipt.received,
            remaining = %receipt.remaining,
            "balance swept"
        );
        Ok(receipt)
    }
}
