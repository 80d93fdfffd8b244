//! Error taxonomy shared by every bunch-root operation.
//!
//! All variants are raised synchronously at the call that detects them and
//! none are retried internally. A proof that simply does not match its root is
//! **not** an error: verification reports that as `false`.

use thiserror::Error;

/// Errors raised by the commitment engine, locator and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BunchError {
    /// Leaf sequence length is zero or not a power of two.
    #[error("invalid leaf count {count}: expected a non-zero power of two")]
    InvalidLeafCount {
        /// Offending length.
        count: usize,
    },

    /// Leaf index or block number outside the half-open range `[start, end)`.
    #[error("index {index} out of range [{start}, {end})")]
    IndexOutOfRange {
        /// Offending index or block number.
        index: u64,
        /// Inclusive lower bound.
        start: u64,
        /// Exclusive upper bound.
        end: u64,
    },

    /// Wire-encoded proof whose length is not a multiple of the digest size.
    #[error("malformed proof: {len} bytes is not a multiple of 32")]
    MalformedProof {
        /// Total encoded length in bytes.
        len: usize,
    },

    /// Proof whose length differs from the depth of the bunch it targets.
    #[error("proof has {found} levels but the bunch has depth {expected}")]
    ProofDepthMismatch {
        /// Depth of the bunch record.
        expected: u32,
        /// Number of siblings supplied.
        found: usize,
    },

    /// An external header source or ledger could not serve a read.
    #[error("{what} unavailable: {reason}")]
    SourceUnavailable {
        /// What was being fetched (e.g. `block 42`, `bunch record 3`).
        what: String,
        /// Collaborator-supplied reason.
        reason: String,
    },

    /// Hex text that does not decode, or decodes to the wrong length.
    #[error("invalid hex: {reason}")]
    InvalidHex {
        /// Decoder message.
        reason: String,
    },

    /// Bunch depth too large for `2^depth` to fit in a `u64`.
    #[error("bunch depth {depth} exceeds maximum 63")]
    DepthOverflow {
        /// Offending depth.
        depth: u32,
    },

    /// Bunch whose last block, `start + 2^depth - 1`, is past `u64::MAX`.
    #[error("bunch starting at block {start} with depth {depth} runs past the last block number")]
    RangeOverflow {
        /// First block of the bunch.
        start: u64,
        /// Depth of the bunch.
        depth: u32,
    },

    /// Appending a record whose range does not start where the previous ended.
    #[error("non-contiguous bunch: expected start block {expected}, found {found}")]
    NonContiguous {
        /// Start block the ledger expected next.
        expected: u64,
        /// Start block carried by the rejected record.
        found: u64,
    },
}

impl BunchError {
    /// Shorthand for [`BunchError::SourceUnavailable`].
    #[must_use]
    pub fn unavailable(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::SourceUnavailable {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias for fallible core operations.
pub type BunchResult<T> = std::result::Result<T, BunchError>;
