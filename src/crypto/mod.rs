//! Cryptography module - BLAKE3 hashing

mod hash;

pub use hash::*;
