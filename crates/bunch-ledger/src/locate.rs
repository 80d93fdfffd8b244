//! Finding the bunch that commits a given block.

use bunch_core::{
    BlockNumber, BunchError, BunchIndex, BunchRecord, BunchResult, LeafIndex, RangeBoundary,
    RangePosition,
};

use crate::BunchLedger;

/// Index of the record whose range contains `block`, or `None`.
///
/// Binary search over `[0, len - 1]`; one ledger read per probe, issued in
/// sequence. Relies on records being sorted and contiguous.
///
/// Under [`RangeBoundary::Inclusive`] the first block of a bunch also matches
/// the bunch before it, so which of the two is returned depends on which is
/// probed first.
pub fn locate<L: BunchLedger + ?Sized>(
    ledger: &L,
    block: BlockNumber,
    boundary: RangeBoundary,
) -> BunchResult<Option<BunchIndex>> {
    let Some(mut hi) = ledger.last_index()? else {
        return Ok(None);
    };
    let mut lo: BunchIndex = 0;
    loop {
        let mid = lo + (hi - lo) / 2;
        let rec = ledger.get(mid)?;
        let pos = rec.position(block, boundary)?;
        tracing::debug!(block, lo, hi, mid, ?pos, "locate probe");
        match pos {
            RangePosition::Within => return Ok(Some(mid)),
            RangePosition::Below => {
                if mid == lo {
                    return Ok(None);
                }
                hi = mid - 1;
            }
            RangePosition::Above => {
                if mid == hi {
                    return Ok(None);
                }
                lo = mid + 1;
            }
        }
    }
}

/// The record holding `block` as a leaf, together with the leaf index.
///
/// An inclusive match on the boundary block of the lower bunch is moved to
/// the next bunch, which is the one that actually commits it.
pub fn locate_leaf<L: BunchLedger + ?Sized>(
    ledger: &L,
    block: BlockNumber,
    boundary: RangeBoundary,
) -> BunchResult<Option<(BunchRecord, LeafIndex)>> {
    let Some(index) = locate(ledger, block, boundary)? else {
        return Ok(None);
    };
    let rec = ledger.get(index)?;
    match rec.leaf_index(block) {
        Ok(leaf) => Ok(Some((rec, leaf))),
        Err(BunchError::IndexOutOfRange { .. }) => {
            let next = index + 1;
            if next >= ledger.len()? {
                return Ok(None);
            }
            let rec = ledger.get(next)?;
            let leaf = rec.leaf_index(block)?;
            Ok(Some((rec, leaf)))
        }
        Err(e) => Err(e),
    }
}
