//! Account module - Address encoding

mod address;

pub use address::*;
