//! Cryptographic primitives for Synergy
//!
//! Signatures are verified upstream of the governance engine, so this crate
//! only carries the value types the engine routes on: SHA-256 [`Hash`]es and
//! author [`Token`]s.

pub mod hash;
pub mod token;

pub use hash::{Hash, Hasher, Sha256Hasher, HASH_SIZE};
pub use token::{Token, TOKEN_SIZE};
