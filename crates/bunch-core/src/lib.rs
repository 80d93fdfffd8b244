//! bunch-core — data types, error taxonomy, and file I/O for bunch-root
//! commitments.
//!
//! A *bunch* is a contiguous, power-of-two-sized run of blocks whose
//! per-block transaction roots (and receipt roots) are committed into one
//! Merkle "mega root". This crate is the stable boundary the other crates
//! share:
//! - canonical data types ([`Digest`], [`BlockHeader`], [`BunchRecord`],
//!   [`LeafSequence`], [`InclusionProof`], [`InclusionClaim`]),
//! - the [`BunchError`] taxonomy raised by every core operation,
//! - JSON/CBOR I/O with `.jsonl/.ndjson` streaming for header dumps.
//!
//! ```
//! use bunch_core::{Digest, InclusionProof};
//!
//! let proof = InclusionProof::new(vec![Digest::ZERO]);
//! let wire = proof.to_hex();
//! assert_eq!(InclusionProof::from_hex(&wire)?, proof);
//! # Ok::<(), bunch_core::BunchError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Error taxonomy (`InvalidLeafCount`, `IndexOutOfRange`, `MalformedProof`, …).
pub mod error;
/// JSON/CBOR helpers and auto-detecting read/write APIs.
pub mod io;
/// Streaming JSONL/NDJSON helpers for large header dumps.
pub mod io_jsonl;
/// Power-of-two leaf sequences.
pub mod leaves;
/// Inclusion proofs and their fixed-stride wire format.
pub mod proof;
/// Canonical data types shared across the workspace.
pub mod types;

pub use error::*;
pub use leaves::*;
pub use proof::*;
pub use types::*;

/// Re-exported so downstream crates need only one import for hashing.
pub use bunch_crypto::{Blake3Hasher, HashKind, Keccak256Hasher, NodeHasher, HASH_LEN};

/// Commonly-used items for quick imports.
///
/// ```rust
/// use bunch_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BlockHeader, BunchError, BunchHeader, BunchRecord, Digest, InclusionClaim,
        InclusionProof, LeafSequence, RangeBoundary,
    };
    pub use bunch_crypto::{Keccak256Hasher, NodeHasher};
}
