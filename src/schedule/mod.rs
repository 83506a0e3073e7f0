//! Schedule module - Reward accrual accounting and engine errors

mod error;
mod reward_schedule;

pub use error::*;
pub use reward_schedule::*;
