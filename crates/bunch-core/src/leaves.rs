//! Power-of-two leaf sequences.

use crate::error::{BunchError, BunchResult};
use crate::types::{BlockHeader, Digest};
use std::ops::Deref;

/// Depth of a tree with `count` leaves, or `InvalidLeafCount` when `count`
/// is zero or not a power of two.
pub fn depth_for_count(count: usize) -> BunchResult<u32> {
    if count.is_power_of_two() {
        Ok(count.trailing_zeros())
    } else {
        Err(BunchError::InvalidLeafCount { count })
    }
}

/// Ordered leaves whose length is exactly `2^depth`.
///
/// Order is significant: leaf `i` belongs to block `start + i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafSequence {
    leaves: Vec<Digest>,
    depth: u32,
}

impl LeafSequence {
    /// Validate and wrap.
    pub fn new(leaves: Vec<Digest>) -> BunchResult<Self> {
        let depth = depth_for_count(leaves.len())?;
        Ok(Self { leaves, depth })
    }

    /// Transaction roots of `headers`, in the given order.
    pub fn transaction_roots(headers: &[BlockHeader]) -> BunchResult<Self> {
        Self::new(headers.iter().map(|h| h.transactions_root).collect())
    }

    /// Receipt roots of `headers`, in the given order.
    pub fn receipt_roots(headers: &[BlockHeader]) -> BunchResult<Self> {
        Self::new(headers.iter().map(|h| h.receipts_root).collect())
    }

    /// `log2(len)`.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Borrow as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Digest] {
        &self.leaves
    }

    /// Unwrap.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<Digest> {
        self.leaves
    }
}

impl Deref for LeafSequence {
    type Target = [Digest];

    fn deref(&self) -> &Self::Target {
        &self.leaves
    }
}

impl TryFrom<Vec<Digest>> for LeafSequence {
    type Error = BunchError;

    fn try_from(v: Vec<Digest>) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}
