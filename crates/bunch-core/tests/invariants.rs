//! Range invariants for bunch records.
//!
//! A record of depth `d` starting at `s` owns exactly the blocks
//! `s ..= s + 2^d - 1` under the half-open boundary; the inclusive boundary
//! admits one extra block, `s + 2^d`.

use bunch_core::{
    BunchError, BunchRecord, Digest, InclusionProof, RangeBoundary, RangePosition,
};
use proptest::prelude::*;

fn rec(start: u64, depth: u32) -> BunchRecord {
    BunchRecord {
        index: 0,
        start_block_number: start,
        depth,
        transactions_mega_root: Digest::ZERO,
        receipts_mega_root: Digest::ZERO,
    }
}

proptest! {
    #[test]
    fn edges_classify_consistently(start in 1u64..1_000_000, depth in 0u32..20) {
        let r = rec(start, depth);
        let span = 1u64 << depth;
        let last = start + span - 1;

        prop_assert_eq!(r.position(start - 1, RangeBoundary::HalfOpen).unwrap(), RangePosition::Below);
        prop_assert_eq!(r.position(start, RangeBoundary::HalfOpen).unwrap(), RangePosition::Within);
        prop_assert_eq!(r.position(last, RangeBoundary::HalfOpen).unwrap(), RangePosition::Within);
        prop_assert_eq!(r.position(last + 1, RangeBoundary::HalfOpen).unwrap(), RangePosition::Above);
        prop_assert_eq!(r.position(last + 1, RangeBoundary::Inclusive).unwrap(), RangePosition::Within);
        prop_assert_eq!(r.position(last + 2, RangeBoundary::Inclusive).unwrap(), RangePosition::Above);
    }

    #[test]
    fn leaf_index_matches_half_open_membership(start in 0u64..1_000_000, depth in 0u32..16, off in 0u64..70_000) {
        let r = rec(start, depth);
        let block = start + off;
        let within = r.position(block, RangeBoundary::HalfOpen).unwrap() == RangePosition::Within;
        match r.leaf_index(block) {
            Ok(i) => {
                prop_assert!(within);
                prop_assert_eq!(i, off);
            }
            Err(BunchError::IndexOutOfRange { index, .. }) => {
                prop_assert!(!within);
                prop_assert_eq!(index, block);
            }
            Err(e) => prop_assert!(false, "unexpected error {e}"),
        }
    }

    #[test]
    fn proof_wire_length_must_be_stride_multiple(len in 0usize..200) {
        let bytes = vec![0u8; len];
        let res = InclusionProof::from_bytes(&bytes);
        if len % 32 == 0 {
            prop_assert_eq!(res.unwrap().len(), len / 32);
        } else {
            prop_assert_eq!(res, Err(BunchError::MalformedProof { len }));
        }
    }
}

#[test]
fn adjacent_records_share_boundary_only_inclusively() {
    // [0,4) and [4,12): block 4 belongs to the second record, and only the
    // inclusive boundary also claims it for the first.
    let a = rec(0, 2);
    let b = rec(4, 3);
    assert_eq!(a.position(4, RangeBoundary::HalfOpen).unwrap(), RangePosition::Above);
    assert_eq!(b.position(4, RangeBoundary::HalfOpen).unwrap(), RangePosition::Within);
    assert_eq!(a.position(4, RangeBoundary::Inclusive).unwrap(), RangePosition::Within);
}
