//! Property-based and adversarial tests for the reward engine
//!
//! These tests verify accrual and settlement invariants hold under random
//! schedules, block sequences and rate changes.

use chef_core::account::Address;
use chef_core::chain::{PayoutError, PayoutRouter};
use chef_core::schedule::{ChefError, RewardSchedule};
use chef_core::settlement::{verify_receipt_chain, SettlementController};
use chef_core::{Amount, BlockNumber};
use proptest::prelude::*;

/// Router that accepts every payout and remembers the total
#[derive(Default)]
struct Sink {
    total: Amount,
}

impl PayoutRouter for Sink {
    fn route(&mut self, _from: &Address, amount: Amount) -> Result<Amount, PayoutError> {
        self.total += amount;
        Ok(amount)
    }
}

fn schedule_params() -> impl Strategy<Value = (BlockNumber, u64, Amount)> {
    (0u64..1_000_000, 1u64..10_000, 1u128..1_000_000_000_000_000_000_000_000)
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

proptest! {
    /// Nothing accrues at or before the start block
    #[test]
    fn prop_no_rewards_before_start(
        (start, length, rate) in schedule_params(),
        offset in 0u64..1_000_000,
    ) {
        let schedule = RewardSchedule::new(start, start + length, rate).unwrap();
        let block = start.saturating_sub(offset);
        prop_assert_eq!(schedule.pending_rewards(block).unwrap(), 0);
    }

    /// Accrual is linear inside the period
    #[test]
    fn prop_linear_accrual(
        (start, length, rate) in schedule_params(),
        elapsed in 1u64..10_000,
    ) {
        prop_assume!(elapsed <= length);
        let schedule = RewardSchedule::new(start, start + length, rate).unwrap();
        let pending = schedule.pending_rewards(start + elapsed).unwrap();
        prop_assert_eq!(pending, elapsed as Amount * rate);
    }

    /// Pending rewards never decrease as blocks advance
    #[test]
    fn prop_pending_monotonic(
        (start, length, rate) in schedule_params(),
        a in 0u64..1_020_000,
        b in 0u64..1_020_000,
    ) {
        let schedule = RewardSchedule::new(start, start + length, rate).unwrap();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(schedule.pending_rewards(low).unwrap() <= schedule.pending_rewards(high).unwrap());
    }

    /// Settling twice at the same block pays nothing the second time
    #[test]
    fn prop_settle_idempotent(
        (start, length, rate) in schedule_params(),
        block in 0u64..1_020_000,
    ) {
        let mut schedule = RewardSchedule::new(start, start + length, rate).unwrap();
        let expected = schedule.pending_rewards(block).unwrap();
        let first = schedule.settle_up_to(block).unwrap();
        prop_assert_eq!(first, expected);
        prop_assert_eq!(schedule.pending_rewards(block).unwrap(), 0);
        prop_assert_eq!(schedule.settle_up_to(block).unwrap(), 0);
    }

    /// The settled block never passes the current block or the end block
    #[test]
    fn prop_last_settled_bounded(
        (start, length, rate) in schedule_params(),
        steps in prop::collection::vec(0u64..500, 1..20),
    ) {
        let end = start + length;
        let mut schedule = RewardSchedule::new(start, end, rate).unwrap();
        let mut block = start.saturating_sub(100);
        for step in steps {
            block += step;
            schedule.settle_up_to(block).unwrap();
            prop_assert!(schedule.last_settled_block() <= block.max(start).min(end));
            prop_assert!(schedule.last_settled_block() >= start);
        }
    }

    /// However claims are spaced, the total paid equals the whole period's
    /// reward: nothing is paid twice and nothing is lost
    #[test]
    fn prop_claims_pay_exactly_once(
        (start, length, rate) in schedule_params(),
        steps in prop::collection::vec(0u64..2_000, 1..30),
    ) {
        let end = start + length;
        let mut schedule = RewardSchedule::new(start, end, rate).unwrap();
        let mut settlement = SettlementController::new();
        let mut sink = Sink::default();
        let chef = Address::from_label("chef");

        let mut block = start.saturating_sub(10);
        for step in steps {
            block += step;
            match settlement.claim_for_all(&mut schedule, block, &chef, &mut sink) {
                Ok(_) => {}
                Err(ChefError::AlreadyClaimed) => prop_assert!(schedule.is_closed()),
                Err(e) => return Err(TestCaseError::fail(e.to_string())),
            }
        }
        if !schedule.is_closed() {
            settlement.claim_for_all(&mut schedule, end, &chef, &mut sink).unwrap();
        }

        prop_assert_eq!(sink.total, length as Amount * rate);
        prop_assert_eq!(settlement.total_settled(), sink.total);
        prop_assert!(verify_receipt_chain(settlement.receipts()));
    }

    /// Right after a rate change nothing is pending; one block later exactly
    /// the new rate is
    #[test]
    fn prop_rate_change_applies_forward(
        (start, length, rate) in schedule_params(),
        new_rate in 0u128..1_000_000_000_000_000_000_000,
        elapsed in 0u64..10_000,
    ) {
        prop_assume!(elapsed < length);
        let mut schedule = RewardSchedule::new(start, start + length, rate).unwrap();
        let block = start + elapsed;

        let realized = schedule.update_rate(new_rate, block).unwrap();
        prop_assert_eq!(realized, elapsed as Amount * rate);
        prop_assert_eq!(schedule.pending_rewards(block).unwrap(), 0);
        prop_assert_eq!(schedule.pending_rewards(block + 1).unwrap(), new_rate);
    }

    /// End block updates succeed while the period runs and are reflected exactly
    #[test]
    fn prop_end_block_extension(
        (start, length, rate) in schedule_params(),
        elapsed in 0u64..10_000,
        extension in 0u64..10_000,
    ) {
        prop_assume!(elapsed < length);
        let mut schedule = RewardSchedule::new(start, start + length, rate).unwrap();
        let new_end = start + length + extension;

        schedule.update_end_block(new_end, start + elapsed).unwrap();
        prop_assert_eq!(schedule.end_block(), new_end);
    }
}

// ============================================================================
// ADVERSARIAL TESTS
// ============================================================================

/// Test: Double claim in one block
///
/// Operator fires the claim twice before the block advances.
#[test]
fn test_double_claim_same_block() {
    let mut schedule = RewardSchedule::new(100, 200, 5).unwrap();
    let mut settlement = SettlementController::new();
    let mut sink = Sink::default();
    let chef = Address::from_label("chef");

    let first = settlement
        .claim_for_all(&mut schedule, 150, &chef, &mut sink)
        .unwrap();
    let second = settlement
        .claim_for_all(&mut schedule, 150, &chef, &mut sink)
        .unwrap();

    assert_eq!(first.amount, 250);
    assert_eq!(second.amount, 0);
    assert_eq!(sink.total, 250);
}

/// Test: Claims after the closing claim
///
/// Once settled past the end, every later claim and end block update is
/// rejected, at any later block.
#[test]
fn test_terminal_state() {
    let mut schedule = RewardSchedule::new(100, 200, 5).unwrap();
    let mut settlement = SettlementController::new();
    let mut sink = Sink::default();
    let chef = Address::from_label("chef");

    settlement
        .claim_for_all(&mut schedule, 200, &chef, &mut sink)
        .unwrap();
    assert!(schedule.is_closed());

    for block in [200, 201, 1_000, u64::MAX] {
        assert_eq!(
            settlement.claim_for_all(&mut schedule, block, &chef, &mut sink),
            Err(ChefError::AlreadyClaimed)
        );
        assert_eq!(
            schedule.update_end_block(block, block),
            Err(ChefError::RewardPeriodOver)
        );
        assert_eq!(schedule.update_rate(1, block), Err(ChefError::InvalidState));
    }
    assert_eq!(sink.total, 500);
}

/// Test: Rewinding the clock
///
/// A block number lower than one already settled must not pay again.
#[test]
fn test_clock_rewind_pays_nothing() {
    let mut schedule = RewardSchedule::new(100, 200, 5).unwrap();
    let mut settlement = SettlementController::new();
    let mut sink = Sink::default();
    let chef = Address::from_label("chef");

    settlement
        .claim_for_all(&mut schedule, 180, &chef, &mut sink)
        .unwrap();
    let rewind = settlement
        .claim_for_all(&mut schedule, 120, &chef, &mut sink)
        .unwrap();

    assert_eq!(rewind.amount, 0);
    assert_eq!(schedule.last_settled_block(), 180);
    assert_eq!(sink.total, 400);
}

/// Test: Overflowing rate
///
/// A rate that cannot be multiplied by the elapsed blocks is reported, and
/// the claim leaves the schedule as it was.
#[test]
fn test_overflow_is_fatal_and_clean() {
    let mut schedule = RewardSchedule::new(0, 1_000, Amount::MAX / 10).unwrap();
    let mut settlement = SettlementController::new();
    let mut sink = Sink::default();
    let chef = Address::from_label("chef");

    let err = settlement
        .claim_for_all(&mut schedule, 500, &chef, &mut sink)
        .unwrap_err();
    assert_eq!(err, ChefError::ArithmeticOverflow);
    assert_eq!(schedule.last_settled_block(), 0);
    assert_eq!(sink.total, 0);
}

/// Test: End block moved into the past
///
/// Shortening the period below blocks already settled is rejected.
#[test]
fn test_end_block_cannot_precede_settlement() {
    let mut schedule = RewardSchedule::new(100, 200, 5).unwrap();
    schedule.settle_up_to(150).unwrap();

    assert_eq!(
        schedule.update_end_block(140, 150),
        Err(ChefError::InvalidEndBlock {
            requested: 140,
            current: 150
        })
    );
    assert_eq!(schedule.end_block(), 200);
}

/// Test: End block update with a rewound clock
///
/// A stale block number cannot pull the end below blocks already settled.
#[test]
fn test_end_block_update_with_rewound_clock() {
    let mut schedule = RewardSchedule::new(100, 200, 5).unwrap();
    schedule.settle_up_to(180).unwrap();

    assert_eq!(
        schedule.update_end_block(150, 120),
        Err(ChefError::InvalidEndBlock {
            requested: 150,
            current: 120
        })
    );
    assert_eq!(schedule.end_block(), 200);
}
