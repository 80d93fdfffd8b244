//! Merkle tree that keeps every level for repeated openings.

use std::marker::PhantomData;

use bunch_core::{depth_for_count, BunchError, BunchResult, Digest, InclusionProof, LeafIndex};
use bunch_crypto::{Keccak256Hasher, NodeHasher};

use crate::reduce_level;

/// Bunch tree with every level kept in memory.
///
/// `levels[0]` are the leaves and `levels[depth]` is `[root]`. Building costs
/// the same hashing as [`crate::compute_root`]; each [`BunchTree::open`] after
/// that is a pure lookup, which pays off when proofs for many blocks of the
/// same bunch are served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BunchTree<H = Keccak256Hasher> {
    levels: Vec<Vec<Digest>>,
    root: Digest,
    _hasher: PhantomData<fn() -> H>,
}

impl<H: NodeHasher> BunchTree<H> {
    /// Build from a power-of-two list of leaves.
    pub fn build(leaves: &[Digest]) -> BunchResult<Self> {
        let depth = depth_for_count(leaves.len())?;
        let mut levels = Vec::with_capacity(depth as usize + 1);
        levels.push(leaves.to_vec());
        let mut cur = leaves.to_vec();
        while cur.len() > 1 {
            cur = reduce_level::<H>(&cur);
            levels.push(cur.clone());
        }
        let root = cur
            .first()
            .copied()
            .ok_or(BunchError::InvalidLeafCount { count: 0 })?;
        Ok(Self {
            levels,
            root,
            _hasher: PhantomData,
        })
    }

    /// The bunch root.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> Digest {
        self.root
    }

    /// `log2` of the leaf count.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> u32 {
        // levels = depth + 1, and depth <= usize::BITS.
        (self.levels.len() - 1) as u32
    }

    /// The leaves the tree was built from.
    #[inline]
    #[must_use]
    pub fn leaves(&self) -> &[Digest] {
        &self.levels[0]
    }

    /// Proof for leaf `index`; identical to [`crate::generate_proof`].
    pub fn open(&self, index: LeafIndex) -> BunchResult<InclusionProof> {
        let n = self.leaves().len();
        let mut idx = usize::try_from(index)
            .ok()
            .filter(|&i| i < n)
            .ok_or(BunchError::IndexOutOfRange {
                index,
                start: 0,
                end: n as u64,
            })?;
        let mut sibs = Vec::with_capacity(self.levels.len() - 1);
        for lvl in &self.levels[..self.levels.len() - 1] {
            sibs.push(lvl[idx ^ 1]);
            idx >>= 1;
        }
        Ok(InclusionProof::new(sibs))
    }
}
