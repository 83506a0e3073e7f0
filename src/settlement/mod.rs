//! Settlement module - Claim protocol and receipt history

mod controller;
mod receipt;

pub use controller::*;
pub use receipt::*;
