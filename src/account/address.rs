//! Account addresses
//!
//! Address format: "CH" + Base58(bytes[0:20] + checksum[0:4]), where the
//! checksum is the first four bytes of BLAKE3(BLAKE3(bytes)).

use crate::crypto::{double_hash, hash_bytes};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Human-readable address prefix
pub const ADDRESS_PREFIX: &str = "CH";

/// Address decoding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address prefix")]
    InvalidPrefix,
    #[error("Invalid base58 encoding")]
    InvalidEncoding,
    #[error("Invalid address length: {0}")]
    InvalidLength(usize),
    #[error("Invalid checksum")]
    InvalidChecksum,
}

/// A 20-byte account identifier (owner, chef holder, pair, recipients)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Deterministic address derived from a label.
    ///
    /// The node and tests use this for well-known accounts ("owner",
    /// "chef", "pair") instead of key material.
    pub fn from_label(label: &str) -> Self {
        let digest = hash_bytes(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.0[0..20]);
        Address(bytes)
    }

    fn checksum(bytes: &[u8]) -> [u8; 4] {
        let digest = double_hash(bytes);
        let mut checksum = [0u8; 4];
        checksum.copy_from_slice(&digest.0[0..4]);
        checksum
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = Vec::with_capacity(24);
        payload.extend_from_slice(&self.0);
        payload.extend_from_slice(&Self::checksum(&self.0));
        write!(
            f,
            "{}{}",
            ADDRESS_PREFIX,
            bs58::encode(payload).into_string()
        )
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s
            .strip_prefix(ADDRESS_PREFIX)
            .ok_or(AddressError::InvalidPrefix)?;
        let decoded = bs58::decode(encoded)
            .into_vec()
            .map_err(|_| AddressError::InvalidEncoding)?;

        if decoded.len() != 24 {
            return Err(AddressError::InvalidLength(decoded.len()));
        }

        let (body, checksum) = decoded.split_at(20);
        if checksum != Self::checksum(body).as_slice() {
            return Err(AddressError::InvalidChecksum);
        }

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(body);
        Ok(Address(bytes))
    }
}
