// crates/bunch-merkle/src/lib.rs

//! Merkle commitment engine for bunches of blocks.
//!
//! - **Reduction**: a power-of-two list of leaf digests is folded level by
//!   level, `parent[i] = H(level[2i] || level[2i+1])`, until one digest (the
//!   bunch root) remains. No padding, no sibling sorting: a single leaf is its
//!   own root.
//! - **Proofs**: the sibling met at every level on the way up, leaf level
//!   first. An odd index is a right child (sibling on the left), an even index
//!   a left child (sibling on the right).
//! - **Verification**: replays the same concatenation order from the leaf and
//!   compares with the trusted root. A mismatch is `Ok(false)`; only a
//!   malformed shape is an `Err`.
//!
//! Every function is generic over the node hash; the [`keccak`] module fixes
//! it to Keccak-256, which is what published bunch roots use.

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
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use bunch_core::{
    depth_for_count, BunchError, BunchRecord, BunchResult, Digest, InclusionClaim,
    InclusionProof, LeafIndex,
};
use bunch_crypto::NodeHasher;

/// Bunch commitments over block headers, and header-file audits.
pub mod commit;
/// Fully materialized tree for repeated openings.
pub mod tree;

pub use commit::*;
pub use tree::BunchTree;

/// `H(left || right)` as a [`Digest`].
#[inline]
#[must_use]
pub fn hash_pair<H: NodeHasher>(left: &Digest, right: &Digest) -> Digest {
    Digest(H::hash_pair(left.as_bytes(), right.as_bytes()))
}

/// One reduction step: pair adjacent digests left to right.
///
/// Callers guarantee an even, non-zero length.
pub(crate) fn reduce_level<H: NodeHasher>(level: &[Digest]) -> Vec<Digest> {
    level
        .chunks_exact(2)
        .map(|pair| hash_pair::<H>(&pair[0], &pair[1]))
        .collect()
}

/// Bunch root of `leaves`.
///
/// Fails with `InvalidLeafCount` unless `leaves.len()` is a non-zero power of
/// two.
pub fn compute_root<H: NodeHasher>(leaves: &[Digest]) -> BunchResult<Digest> {
    depth_for_count(leaves.len())?;
    let mut level = match leaves {
        [only] => return Ok(*only),
        _ => reduce_level::<H>(leaves),
    };
    while level.len() > 1 {
        level = reduce_level::<H>(&level);
    }
    level
        .first()
        .copied()
        .ok_or(BunchError::InvalidLeafCount { count: 0 })
}

/// Sibling path proving `leaves[index]` under [`compute_root`]`(leaves)`.
///
/// The returned proof has exactly `log2(leaves.len())` elements.
pub fn generate_proof<H: NodeHasher>(
    leaves: &[Digest],
    index: LeafIndex,
) -> BunchResult<InclusionProof> {
    let depth = depth_for_count(leaves.len())?;
    let out_of_range = || BunchError::IndexOutOfRange {
        index,
        start: 0,
        end: leaves.len() as u64,
    };
    let mut idx = usize::try_from(index).map_err(|_| out_of_range())?;
    if idx >= leaves.len() {
        return Err(out_of_range());
    }

    let mut siblings = Vec::with_capacity(depth as usize);
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        let sib = if idx % 2 == 1 { idx - 1 } else { idx + 1 };
        siblings.push(level[sib]);
        level = reduce_level::<H>(&level);
        idx /= 2;
    }
    Ok(InclusionProof::new(siblings))
}

/// Fails with `IndexOutOfRange` if `index` cannot address a leaf of a tree
/// with `levels` levels.
pub(crate) fn check_index_fits(index: LeafIndex, levels: usize) -> BunchResult<()> {
    if levels >= 64 {
        return Ok(());
    }
    let end = 1u64 << levels;
    if index >= end {
        return Err(BunchError::IndexOutOfRange {
            index,
            start: 0,
            end,
        });
    }
    Ok(())
}

/// Recompute the root from `leaf` at `index` through `proof` and compare it
/// with `root`.
///
/// Returns `Err(IndexOutOfRange)` when `index > 2^proof.len() - 1`;
/// otherwise `Ok(true)` iff the recomputed root equals `root` byte for byte.
pub fn verify<H: NodeHasher>(
    root: &Digest,
    leaf: &Digest,
    index: LeafIndex,
    proof: &InclusionProof,
) -> BunchResult<bool> {
    check_index_fits(index, proof.len())?;
    let mut cur = *leaf;
    let mut idx = index;
    for sib in proof {
        cur = if idx % 2 == 1 {
            hash_pair::<H>(sib, &cur)
        } else {
            hash_pair::<H>(&cur, sib)
        };
        idx /= 2;
    }
    Ok(cur == *root)
}

/// Verify that `leaf` is the transaction root of `block` inside a committed
/// bunch.
///
/// The record is trusted: the leaf index is derived from its start block and
/// the proof must have exactly `record.depth` levels, otherwise an interior
/// node could pose as a leaf.
pub fn verify_in_bunch<H: NodeHasher>(
    record: &BunchRecord,
    block: u64,
    leaf: &Digest,
    proof: &InclusionProof,
) -> BunchResult<bool> {
    let index = record.leaf_index(block)?;
    if proof.len() != record.depth as usize {
        return Err(BunchError::ProofDepthMismatch {
            expected: record.depth,
            found: proof.len(),
        });
    }
    let ok = verify::<H>(&record.transactions_mega_root, leaf, index, proof)?;
    tracing::debug!(bunch = record.index, block, ok, "verified block against bunch");
    Ok(ok)
}

/// Verify a self-contained claim against the ledger record it names.
///
/// A claim that declares a different start block or depth than the record is
/// not a proof about this bunch and yields `Ok(false)`.
pub fn verify_claim<H: NodeHasher>(
    record: &BunchRecord,
    claim: &InclusionClaim,
) -> BunchResult<bool> {
    if claim.start_block_number != record.start_block_number || claim.depth != record.depth {
        tracing::debug!(
            bunch = record.index,
            claim_start = claim.start_block_number,
            claim_depth = claim.depth,
            "claim names a different bunch"
        );
        return Ok(false);
    }
    verify_in_bunch::<H>(record, claim.block_number, &claim.leaf, &claim.proof)
}

/// Verify a claim against a bare root (no ledger record at hand).
pub fn verify_claim_against_root<H: NodeHasher>(
    root: &Digest,
    claim: &InclusionClaim,
) -> BunchResult<bool> {
    let index = claim.leaf_index()?;
    if claim.proof.len() != claim.depth as usize {
        return Err(BunchError::ProofDepthMismatch {
            expected: claim.depth,
            found: claim.proof.len(),
        });
    }
    verify::<H>(root, &claim.leaf, index, &claim.proof)
}

/// The engine with the node hash fixed to Keccak-256.
pub mod keccak {
    use super::{BunchRecord, BunchResult, Digest, InclusionProof, LeafIndex};
    use bunch_crypto::Keccak256Hasher;

    /// [`super::compute_root`] with Keccak-256.
    pub fn compute_root(leaves: &[Digest]) -> BunchResult<Digest> {
        super::compute_root::<Keccak256Hasher>(leaves)
    }

    /// [`super::generate_proof`] with Keccak-256.
    pub fn generate_proof(leaves: &[Digest], index: LeafIndex) -> BunchResult<InclusionProof> {
        super::generate_proof::<Keccak256Hasher>(leaves, index)
    }

    /// [`super::verify`] with Keccak-256.
    pub fn verify(
        root: &Digest,
        leaf: &Digest,
        index: LeafIndex,
        proof: &InclusionProof,
    ) -> BunchResult<bool> {
        super::verify::<Keccak256Hasher>(root, leaf, index, proof)
    }

    /// [`super::verify_in_bunch`] with Keccak-256.
    pub fn verify_in_bunch(
        record: &BunchRecord,
        block: u64,
        leaf: &Digest,
        proof: &InclusionProof,
    ) -> BunchResult<bool> {
        super::verify_in_bunch::<Keccak256Hasher>(record, block, leaf, proof)
    }
}
