//! BLAKE3 hashing
//!
//! Used for settlement receipt ids and address checksums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte hash output
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash; parent id of the first receipt in a chain
    pub const fn zero() -> Self {
        Hash([0u8; 32])
    }

    /// Parse a 64-character hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(hex)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Hash(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

/// Hash arbitrary bytes using BLAKE3
pub fn hash_bytes(data: &[u8]) -> Hash {
    Hash(*blake3::hash(data).as_bytes())
}

/// Hash of hash, used for address checksums
pub fn double_hash(data: &[u8]) -> Hash {
    let first = hash_bytes(data);
    hash_bytes(&first.0)
}

/// Link a payload to its parent hash: `BLAKE3(parent || payload)`.
///
/// Each settlement receipt id is chained this way to the id before it, so
/// rewriting any earlier receipt changes every id after it.
pub fn chain_hash(parent: &Hash, payload: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&parent.0);
    hasher.update(payload);
    Hash(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash_bytes(b"pasta"), hash_bytes(b"pasta"));
        assert_ne!(hash_bytes(b"pasta"), hash_bytes(b"chef"));
    }

    #[test]
    fn test_hex_parse() {
        let hash = hash_bytes(b"receipt");
        assert_eq!(Hash::from_hex(&hash.to_hex()).unwrap(), hash);
        assert!(Hash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_chain_hash_depends_on_parent() {
        let a = chain_hash(&Hash::zero(), b"payload");
        let b = chain_hash(&hash_bytes(b"other"), b"payload");
        assert_ne!(a, b);

        // Same as hashing the concatenation
        let mut joined = Vec::new();
        joined.extend_from_slice(&[0u8; 32]);
        joined.extend_from_slice(b"payload");
        assert_eq!(a, hash_bytes(&joined));
    }
}
