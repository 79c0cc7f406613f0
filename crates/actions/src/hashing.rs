//! Canonical field encoding used to derive resolution hashes
//!
//! This is not a wire format. It only has to be deterministic: the same
//! logical action must always produce the same bytes.

use chrono::{DateTime, Utc};
use synergy_crypto::{Hash, Hasher, Sha256Hasher, Token};

/// Incrementally feeds action fields into a SHA-256 hasher
pub struct HashBuilder {
    hasher: Sha256Hasher,
}

impl HashBuilder {
    /// Start a hash for an action, committing to its kind tag first
    pub fn new(kind: &str) -> Self {
        Self::untagged().put_str(kind)
    }

    /// Start a hash with no kind tag
    pub fn untagged() -> Self {
        Self { hasher: Sha256Hasher::new() }
    }

    pub fn put_u8(mut self, value: u8) -> Self {
        self.hasher.update(&[value]);
        self
    }

    pub fn put_u64(mut self, value: u64) -> Self {
        self.hasher.update(&value.to_be_bytes());
        self
    }

    pub fn put_bool(self, value: bool) -> Self {
        self.put_u8(u8::from(value))
    }

    pub fn put_token(mut self, token: &Token) -> Self {
        self.hasher.update(token.as_bytes());
        self
    }

    pub fn put_hash(mut self, hash: &Hash) -> Self {
        self.hasher.update(hash.as_bytes());
        self
    }

    /// Length-prefixed byte string
    pub fn put_bytes(mut self, bytes: &[u8]) -> Self {
        self.hasher.update(&(bytes.len() as u64).to_be_bytes());
        self.hasher.update(bytes);
        self
    }

    pub fn put_str(self, value: &str) -> Self {
        self.put_bytes(value.as_bytes())
    }

    pub fn put_time(self, time: &DateTime<Utc>) -> Self {
        self.put_u64(time.timestamp() as u64)
            .put_u64(u64::from(time.timestamp_subsec_nanos()))
    }

    pub fn put_strs(self, values: &[String]) -> Self {
        values
            .iter()
            .fold(self.put_u64(values.len() as u64), |builder, value| builder.put_str(value))
    }

    pub fn put_tokens(self, tokens: &[Token]) -> Self {
        tokens
            .iter()
            .fold(self.put_u64(tokens.len() as u64), |builder, token| builder.put_token(token))
    }

    pub fn put_hashes(self, hashes: &[Hash]) -> Self {
        hashes
            .iter()
            .fold(self.put_u64(hashes.len() as u64), |builder, hash| builder.put_hash(hash))
    }

    /// Optional value, prefixed by a presence byte
    pub fn put_option<T>(self, value: Option<T>, put: impl FnOnce(Self, T) -> Self) -> Self {
        match value {
            Some(value) => put(self.put_u8(1), value),
            None => self.put_u8(0),
        }
    }

    pub fn finish(self) -> Hash {
        self.hasher.finalize()
    }
}
