//! Engine errors
//!
//! Every error is raised before any state is written.

use crate::chain::{PayoutError, TokenError};
use crate::BlockNumber;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChefError {
    #[error("already claimed: the reward period is closed")]
    AlreadyClaimed,
    #[error("reward period over")]
    RewardPeriodOver,
    #[error("unauthorized caller")]
    Unauthorized,
    #[error("invalid state: the reward period is closed")]
    InvalidState,
    #[error("arithmetic overflow in reward computation")]
    ArithmeticOverflow,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid end block {requested} at block {current}")]
    InvalidEndBlock {
        requested: BlockNumber,
        current: BlockNumber,
    },
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Payout(#[from] PayoutError),
}

pub type ChefResult<T> = Result<T, ChefError>;
