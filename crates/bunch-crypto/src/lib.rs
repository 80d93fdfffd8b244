// crates/bunch-crypto/src/lib.rs

//! Node hashers for bunch-root Merkle commitments.
//!
//! A bunch root is built by hashing the raw concatenation of two 32-byte child
//! digests, with no length prefix and no domain tag. The hash function itself
//! is pluggable through [`NodeHasher`]:
//!
//! - [`Keccak256Hasher`] is the production choice; its roots are the ones a
//!   side-chain publishes and an EVM contract re-derives with `keccak256`.
//! - [`Blake3Hasher`] is offered for off-chain experiments where EVM
//!   compatibility does not matter.
//!
//! Hashers are zero-sized and used as type parameters, e.g.
//! `compute_root::<Keccak256Hasher>(..)`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use sha3::{Digest as _, Keccak256};

/// Size in bytes of every digest produced by a [`NodeHasher`].
pub const HASH_LEN: usize = 32;

/// Raw 32-byte hash output.
pub type Hash32 = [u8; HASH_LEN];

/// Hash function used for interior Merkle nodes.
///
/// Implementations must be deterministic and must hash exactly
/// `left || right` (64 bytes) so that proofs produced under one
/// implementation verify under any other implementation of the same function.
pub trait NodeHasher {
    /// Stable name used in configuration files and diagnostics.
    const NAME: &'static str;

    /// Hash an arbitrary byte string.
    #[must_use]
    fn hash_bytes(data: &[u8]) -> Hash32;

    /// Hash the concatenation `left || right`.
    #[must_use]
    fn hash_pair(left: &Hash32, right: &Hash32) -> Hash32;
}

/// Keccak-256 (the pre-standard SHA-3 padding used by Ethereum).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keccak256Hasher;

impl NodeHasher for Keccak256Hasher {
    const NAME: &'static str = "keccak256";

    fn hash_bytes(data: &[u8]) -> Hash32 {
        let mut h = Keccak256::new();
        h.update(data);
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&h.finalize());
        out
    }

    fn hash_pair(left: &Hash32, right: &Hash32) -> Hash32 {
        let mut h = Keccak256::new();
        h.update(left);
        h.update(right);
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&h.finalize());
        out
    }
}

/// BLAKE3 in its default 32-byte output mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl NodeHasher for Blake3Hasher {
    const NAME: &'static str = "blake3";

    fn hash_bytes(data: &[u8]) -> Hash32 {
        *blake3::hash(data).as_bytes()
    }

    fn hash_pair(left: &Hash32, right: &Hash32) -> Hash32 {
        let mut h = blake3::Hasher::new();
        h.update(left);
        h.update(right);
        *h.finalize().as_bytes()
    }
}

/// Convenience: Keccak-256 of `data`.
#[inline]
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash32 {
    Keccak256Hasher::hash_bytes(data)
}

/// Runtime selector for the node hash, for places (CLI, config files) that
/// cannot name a type parameter.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum HashKind {
    /// [`Keccak256Hasher`].
    #[default]
    Keccak256,
    /// [`Blake3Hasher`].
    Blake3,
}

impl HashKind {
    /// Borrow the canonical string.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keccak256 => Keccak256Hasher::NAME,
            Self::Blake3 => Blake3Hasher::NAME,
        }
    }

    /// Parse a canonical name (case-insensitive, `-`/`_` ignored).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let norm: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match norm.as_str() {
            "keccak256" | "keccak" => Some(Self::Keccak256),
            "blake3" => Some(Self::Blake3),
            _ => None,
        }
    }

    /// Dynamic dispatch to [`NodeHasher::hash_pair`].
    #[must_use]
    pub fn hash_pair(self, left: &Hash32, right: &Hash32) -> Hash32 {
        match self {
            Self::Keccak256 => Keccak256Hasher::hash_pair(left, right),
            Self::Blake3 => Blake3Hasher::hash_pair(left, right),
        }
    }
}

impl std::fmt::Display for HashKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
