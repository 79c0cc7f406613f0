//! Hashing utilities for Synergy
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use synergy_common::{Error, Result};

/// Size in bytes of a [`Hash`]
pub const HASH_SIZE: usize = 32;

/// A SHA-256 digest used to address actions, proposals and objects
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash(pub [u8; HASH_SIZE]);

impl Hash {
    /// The all-zero hash, used as "no reference"
    pub const ZERO: Hash = Hash([0u8; HASH_SIZE]);

    /// Create a hash from raw bytes
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Hash arbitrary data with SHA-256
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha256Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Get the bytes of the hash
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether this is the zero hash
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }

    /// Convert hash to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create a hash from a hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        decode_fixed(hex_str).map(Self)
    }
}

pub(crate) fn decode_fixed(hex_str: &str) -> Result<[u8; HASH_SIZE]> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| Error::validation(format!("Invalid hex: {}", e)))?;
    if bytes.len() != HASH_SIZE {
        return Err(Error::validation(format!(
            "Invalid length: expected {} bytes, got {}",
            HASH_SIZE,
            bytes.len()
        )));
    }
    let mut fixed = [0u8; HASH_SIZE];
    fixed.copy_from_slice(&bytes);
    Ok(fixed)
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

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Hash::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Hasher trait for incrementally building a [`Hash`]
pub trait Hasher {
    /// Update the hash state with additional data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash computation and return the hash value
    fn finalize(self) -> Hash;
}

/// SHA-256 hasher implementation
pub struct Sha256Hasher {
    hasher: Sha256,
}

impl Sha256Hasher {
    /// Create a new SHA-256 hasher
    pub fn new() -> Self {
        Self { hasher: Sha256::new() }
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
    }

    fn finalize(self) -> Hash {
        let digest = self.hasher.finalize();
        let mut bytes = [0u8; HASH_SIZE];
        bytes.copy_from_slice(&digest);
        Hash(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let hash = Hash::of(b"abc");
        assert_eq!(
            hash.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"collective");
        hasher.update(b"-name");
        assert_eq!(hasher.finalize(), Hash::of(b"collective-name"));
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(Hash::from_hex("abcd").is_err());
        assert!(Hash::from_hex("zz").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let hash = Hash::of(b"draft");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_zero() {
        assert!(Hash::ZERO.is_zero());
        assert!(!Hash::of(b"").is_zero());
    }
}
