//! Settlement receipts
//!
//! Receipts form a hash chain: each id commits to the previous id and to
//! the receipt's own fields.

use crate::crypto::{chain_hash, Hash};
use crate::{Amount, BlockNumber};
use serde::{Deserialize, Serialize};

/// What triggered a payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementKind {
    /// Operator "claim for all"
    Claim,
    /// Accrual at the old rate realized by a rate update
    RateChange,
}

impl SettlementKind {
    fn tag(self) -> u8 {
        match self {
            SettlementKind::Claim => 0,
            SettlementKind::RateChange => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    /// 1-based position in the settlement history
    pub sequence: u64,
    pub kind: SettlementKind,
    /// Block the settlement was executed at
    pub block: BlockNumber,
    pub settled_from: BlockNumber,
    pub settled_to: BlockNumber,
    /// Reward computed as pending
    pub amount: Amount,
    /// Balance the payout collaborator reported consuming
    pub consumed: Amount,
    /// Whether this settlement closed the reward period
    pub closed: bool,
    pub parent: Hash,
    pub id: Hash,
}

impl ClaimReceipt {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        sequence: u64,
        kind: SettlementKind,
        block: BlockNumber,
        settled_from: BlockNumber,
        settled_to: BlockNumber,
        amount: Amount,
        consumed: Amount,
        closed: bool,
        parent: Hash,
    ) -> Self {
        let mut receipt = Self {
            sequence,
            kind,
            block,
            settled_from,
            settled_to,
            amount,
            consumed,
            closed,
            parent,
            id: Hash::zero(),
        };
        receipt.id = receipt.compute_id();
        receipt
    }

    /// Fixed-width little-endian encoding of every field except `id`
    fn payload(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(8 + 1 + 8 * 3 + 16 * 2 + 1);
        data.extend_from_slice(&self.sequence.to_le_bytes());
        data.push(self.kind.tag());
        data.extend_from_slice(&self.block.to_le_bytes());
        data.extend_from_slice(&self.settled_from.to_le_bytes());
        data.extend_from_slice(&self.settled_to.to_le_bytes());
        data.extend_from_slice(&self.amount.to_le_bytes());
        data.extend_from_slice(&self.consumed.to_le_bytes());
        data.push(self.closed as u8);
        data
    }

    pub fn compute_id(&self) -> Hash {
        chain_hash(&self.parent, &self.payload())
    }

    /// Whether the stored id matches the fields
    pub fn is_intact(&self) -> bool {
        self.id == self.compute_id()
    }
}

/// Check that `receipts` is a well-formed chain starting from the zero hash
pub fn verify_receipt_chain(receipts: &[ClaimReceipt]) -> bool {
    let mut parent = Hash::zero();
    for (index, receipt) in receipts.iter().enumerate() {
        if receipt.sequence != index as u64 + 1
            || receipt.parent != parent
            || !receipt.is_intact()
        {
            return false;
        }
        parent = receipt.id;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(sequence: u64, parent: Hash) -> ClaimReceipt {
        ClaimReceipt::new(
            sequence,
            SettlementKind::Claim,
            10,
            5,
            10,
            25,
            25,
            false,
            parent,
        )
    }

    #[test]
    fn test_chain_verification() {
        let first = receipt(1, Hash::zero());
        let second = receipt(2, first.id);
        assert_ne!(first.id, second.id);
        assert!(verify_receipt_chain(&[first.clone(), second.clone()]));
        assert!(verify_receipt_chain(&[]));

        // Out of order
        assert!(!verify_receipt_chain(&[second, first]));
    }

    #[test]
    fn test_tampering_is_detected() {
        let first = receipt(1, Hash::zero());
        let mut second = receipt(2, first.id);
        second.amount += 1;
        assert!(!second.is_intact());
        assert!(!verify_receipt_chain(&[first, second]));
    }
}
