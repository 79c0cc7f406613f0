//! Author tokens
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use synergy_common::Result;

use crate::hash::{decode_fixed, Hash};

/// Size in bytes of a [`Token`]
pub const TOKEN_SIZE: usize = 32;

/// The public identity of an author.
///
/// Tokens arrive already authenticated by the transport layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Token(pub [u8; TOKEN_SIZE]);

impl Token {
    /// Create a token from raw bytes
    pub fn new(bytes: [u8; TOKEN_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the bytes of the token
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hash of the token, the key under which a signed-in member is indexed
    pub fn hashed(&self) -> Hash {
        Hash::of(&self.0)
    }

    /// Convert token to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create a token from a hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        decode_fixed(hex_str).map(Self)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.to_hex())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; TOKEN_SIZE]> for Token {
    fn from(bytes: [u8; TOKEN_SIZE]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Token::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_display() {
        let token = Token::new([0xab; TOKEN_SIZE]);
        assert_eq!(token.to_string(), "ab".repeat(TOKEN_SIZE));
        assert_eq!(Token::from_hex(&token.to_hex()).unwrap(), token);
    }

    #[test]
    fn test_hashed_differs_per_token() {
        assert_ne!(Token::new([1; 32]).hashed(), Token::new([2; 32]).hashed());
    }
}
