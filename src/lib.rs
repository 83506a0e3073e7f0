//! Chef Core Library
//!
//! A block-height driven reward distribution engine. Rewards accrue at a
//! per-block rate over a bounded block range and are paid out by a single
//! operator-triggered "claim for all" settlement, exactly once per window.
//!
//! The block number, the reward token and the liquidity pool are external
//! collaborators; see [`chain`] for their interfaces and the in-memory
//! simulation the node runs against.

pub mod account;
pub mod admin;
pub mod chain;
pub mod crypto;
pub mod node;
pub mod rpc;
pub mod schedule;
pub mod settlement;
pub mod storage;

/// Token amount in base units
pub type Amount = u128;

/// Block height as reported by the external clock
pub type BlockNumber = u64;

/// Protocol constants
pub mod constants {
    use crate::Amount;

    /// One whole reward token in base units
    pub const ONE_TOKEN: Amount = 1_000_000_000_000_000_000;

    /// Basis-point denominator for fees
    pub const BPS_DENOMINATOR: u32 = 10_000;

    /// Transfer fee charged by the simulated reward token (2%)
    pub const DEFAULT_TRANSFER_FEE_BPS: u32 = 200;

    /// Default JSON-RPC port of the development node
    pub const DEFAULT_RPC_PORT: u16 = 8545;

    /// Default block interval of the simulated block producer
    pub const DEFAULT_BLOCK_INTERVAL_MS: u64 = 1_000;
}
