//! Canonical data types shared across the workspace.
//!
//! These are re-exported at the crate root so other crates can import via
//! `bunch_core::Digest`, `bunch_core::BunchRecord`, etc.
//!
//! Serialized forms stay conservative and portable (serde); digests travel as
//! `0x`-prefixed lowercase hex so JSON files line up with what a node's RPC
//! returns for `transactionsRoot` / `receiptsRoot`.

use crate::error::{BunchError, BunchResult};
use bunch_crypto::{Hash32, HASH_LEN};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest supported bunch depth (`2^63` blocks).
pub const MAX_DEPTH: u32 = 63;

/// Block number on the committed chain.
pub type BlockNumber = u64;

/// Position of a leaf inside its bunch, `blockNumber - startBlockNumber`.
pub type LeafIndex = u64;

/// Position of a record in the append-only ledger.
pub type BunchIndex = u64;

/// Fixed-size 32-byte digest.
///
/// Opaque and comparable; only ever interpreted as bytes or hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(pub Hash32);

impl Digest {
    /// The all-zero digest (`HashZero` in EVM tooling).
    pub const ZERO: Self = Self([0u8; HASH_LEN]);

    /// Wrap raw bytes.
    #[inline]
    #[must_use]
    pub const fn new(bytes: Hash32) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &Hash32 {
        &self.0
    }

    /// Copy out of a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> BunchResult<Self> {
        let arr: Hash32 = bytes.try_into().map_err(|_| BunchError::InvalidHex {
            reason: format!("expected {HASH_LEN} bytes, got {}", bytes.len()),
        })?;
        Ok(Self(arr))
    }

    /// `0x`-prefixed lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse hex with an optional `0x` prefix.
    pub fn from_hex(s: &str) -> BunchResult<Self> {
        let raw = decode_hex(s)?;
        Self::from_slice(&raw)
    }
}

impl From<Hash32> for Digest {
    #[inline]
    fn from(bytes: Hash32) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for Hash32 {
    #[inline]
    fn from(d: Digest) -> Self {
        d.0
    }
}

impl AsRef<[u8]> for Digest {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = BunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Decode hex text, tolerating a leading `0x`/`0X`.
pub(crate) fn decode_hex(s: &str) -> BunchResult<Vec<u8>> {
    let body = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(body).map_err(|e| BunchError::InvalidHex {
        reason: e.to_string(),
    })
}

/// The part of a block header the commitment scheme reads.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Block number.
    pub number: BlockNumber,
    /// Root of the block's transaction trie.
    pub transactions_root: Digest,
    /// Root of the block's receipt trie.
    pub receipts_root: Digest,
}

/// Which end of a bunch range counts as a member.
///
/// A bunch of depth `d` starting at `s` covers blocks `s ..= s + 2^d - 1`.
/// `Inclusive` additionally admits `s + 2^d` (the first block of the next
/// bunch), matching locators that test `n <= start + 2^depth`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RangeBoundary {
    /// `start <= n < start + 2^depth`.
    #[default]
    HalfOpen,
    /// `start <= n <= start + 2^depth`.
    Inclusive,
}

impl RangeBoundary {
    /// Borrow the canonical string.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HalfOpen => "half-open",
            Self::Inclusive => "inclusive",
        }
    }
}

/// Where a block number lies relative to a bunch range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangePosition {
    /// Before `start`.
    Below,
    /// Inside the range.
    Within,
    /// After the end.
    Above,
}

/// `2^depth` as a block count.
pub fn span_for_depth(depth: u32) -> BunchResult<u64> {
    if depth > MAX_DEPTH {
        return Err(BunchError::DepthOverflow { depth });
    }
    Ok(1u64 << depth)
}

/// A bunch built from headers but not yet assigned a ledger index.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BunchHeader {
    /// First block in the bunch.
    pub start_block_number: BlockNumber,
    /// `log2` of the block count.
    pub depth: u32,
    /// Merkle root over per-block transaction roots.
    pub transactions_mega_root: Digest,
    /// Merkle root over per-block receipt roots.
    pub receipts_mega_root: Digest,
}

impl BunchHeader {
    /// Last block of the bunch, `start + 2^depth - 1`.
    ///
    /// Fails with `RangeOverflow` when that block is not a `u64`.
    pub fn last_block(&self) -> BunchResult<BlockNumber> {
        let span = span_for_depth(self.depth)?;
        self.start_block_number
            .checked_add(span - 1)
            .ok_or(BunchError::RangeOverflow {
                start: self.start_block_number,
                depth: self.depth,
            })
    }

    /// Attach the ledger-assigned index.
    #[inline]
    #[must_use]
    pub const fn with_index(self, index: BunchIndex) -> BunchRecord {
        BunchRecord {
            index,
            start_block_number: self.start_block_number,
            depth: self.depth,
            transactions_mega_root: self.transactions_mega_root,
            receipts_mega_root: self.receipts_mega_root,
        }
    }
}

/// A committed bunch. Immutable once appended to a ledger.
///
/// **Invariant (collection-wide):** record `i+1` starts exactly where record
/// `i` ends, so ranges are contiguous and never overlap.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BunchRecord {
    /// Position in the append-only ledger.
    pub index: BunchIndex,
    /// First block in the bunch.
    pub start_block_number: BlockNumber,
    /// `log2` of the block count.
    pub depth: u32,
    /// Merkle root over per-block transaction roots.
    pub transactions_mega_root: Digest,
    /// Merkle root over per-block receipt roots.
    pub receipts_mega_root: Digest,
}

impl BunchRecord {
    /// Number of blocks covered, `2^depth`.
    pub fn span(&self) -> BunchResult<u64> {
        span_for_depth(self.depth)
    }

    /// First block after this bunch, `start + 2^depth`.
    ///
    /// Computed in `u128` so it cannot overflow for any valid depth.
    pub fn end_block(&self) -> BunchResult<u128> {
        Ok(u128::from(self.start_block_number) + u128::from(self.span()?))
    }

    /// Classify `block` against this bunch's range under `boundary`.
    pub fn position(&self, block: BlockNumber, boundary: RangeBoundary) -> BunchResult<RangePosition> {
        let end = self.end_block()?;
        let n = u128::from(block);
        if block < self.start_block_number {
            return Ok(RangePosition::Below);
        }
        let inside = match boundary {
            RangeBoundary::HalfOpen => n < end,
            RangeBoundary::Inclusive => n <= end,
        };
        Ok(if inside {
            RangePosition::Within
        } else {
            RangePosition::Above
        })
    }

    /// Leaf index of `block`, or `IndexOutOfRange` when the block is not in
    /// the half-open range `[start, start + 2^depth)`.
    pub fn leaf_index(&self, block: BlockNumber) -> BunchResult<LeafIndex> {
        let span = self.span()?;
        let rel = block.wrapping_sub(self.start_block_number);
        if block < self.start_block_number || rel >= span {
            return Err(BunchError::IndexOutOfRange {
                index: block,
                start: self.start_block_number,
                end: self.start_block_number.saturating_add(span),
            });
        }
        Ok(rel)
    }

    /// Drop the index, e.g. to compare against a freshly rebuilt bunch.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> BunchHeader {
        BunchHeader {
            start_block_number: self.start_block_number,
            depth: self.depth,
            transactions_mega_root: self.transactions_mega_root,
            receipts_mega_root: self.receipts_mega_root,
        }
    }
}

/// Self-contained inclusion claim for one block, as written by `prove`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InclusionClaim {
    /// Block whose transaction root is claimed.
    pub block_number: BlockNumber,
    /// First block of the owning bunch.
    pub start_block_number: BlockNumber,
    /// Depth of the owning bunch.
    pub depth: u32,
    /// The claimed leaf (the block's transaction root).
    pub leaf: Digest,
    /// Sibling path from leaf to root.
    pub proof: crate::InclusionProof,
}

impl InclusionClaim {
    /// `block_number - start_block_number`, checked against the bunch span.
    pub fn leaf_index(&self) -> BunchResult<LeafIndex> {
        let span = span_for_depth(self.depth)?;
        let rel = self.block_number.wrapping_sub(self.start_block_number);
        if self.block_number < self.start_block_number || rel >= span {
            return Err(BunchError::IndexOutOfRange {
                index: self.block_number,
                start: self.start_block_number,
                end: self.start_block_number.saturating_add(span),
            });
        }
        Ok(rel)
    }
}
