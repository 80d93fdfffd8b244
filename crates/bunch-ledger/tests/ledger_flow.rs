//! Commit bunches into a ledger, then find and verify blocks through it.

use bunch_core::{BlockHeader, BunchError, Digest, RangeBoundary};
use bunch_crypto::Keccak256Hasher as K;
use bunch_ledger::{
    build_bunch, locate, locate_leaf, prove_block, BunchLedger, MemoryHeaderSource, MemoryLedger,
};
use bunch_merkle::{verify_claim, verify_in_bunch};
use proptest::prelude::*;

fn header(n: u64) -> BlockHeader {
    BlockHeader {
        number: n,
        transactions_root: Digest(bunch_crypto::keccak256(format!("tx{n}").as_bytes())),
        receipts_root: Digest(bunch_crypto::keccak256(format!("rc{n}").as_bytes())),
    }
}

/// Commit consecutive bunches of the given depths starting at `start`.
fn committed(start: u64, depths: &[u32]) -> (MemoryHeaderSource, MemoryLedger) {
    let total: u64 = depths.iter().map(|d| 1u64 << d).sum();
    let src = MemoryHeaderSource::from_headers((start..start + total).map(header));
    let mut ledger = MemoryLedger::new();
    let mut at = start;
    for &d in depths {
        let bunch = build_bunch::<K, _>(&src, at, d).unwrap();
        ledger.append(bunch).unwrap();
        at += 1 << d;
    }
    (src, ledger)
}

#[test]
fn every_committed_block_is_found_and_verifies() {
    let (src, ledger) = committed(1_000, &[2, 3, 0, 4, 1]);
    for block in 1_000..1_000 + 4 + 8 + 1 + 16 + 2 {
        let (rec, leaf) = locate_leaf(&ledger, block, RangeBoundary::HalfOpen)
            .unwrap()
            .unwrap();
        assert_eq!(rec.start_block_number + leaf, block);

        let claim = prove_block::<K, _>(&src, rec.start_block_number, rec.depth, block).unwrap();
        assert!(verify_claim::<K>(&rec, &claim).unwrap(), "block {block}");
        assert!(verify_in_bunch::<K>(&rec, block, &claim.leaf, &claim.proof).unwrap());

        // The receipts root of the same block is not a transaction leaf.
        let other = header(block).receipts_root;
        assert!(!verify_in_bunch::<K>(&rec, block, &other, &claim.proof).unwrap());
    }
    assert_eq!(locate(&ledger, 999, RangeBoundary::HalfOpen).unwrap(), None);
    assert_eq!(locate(&ledger, 1_031, RangeBoundary::HalfOpen).unwrap(), None);
}

#[test]
fn proof_from_one_bunch_fails_in_the_next() {
    let (src, ledger) = committed(0, &[2, 2]);
    let claim = prove_block::<K, _>(&src, 0, 2, 1).unwrap();
    let next = ledger.get(1).unwrap();
    assert!(!verify_claim::<K>(&next, &claim).unwrap());
    assert!(matches!(
        verify_in_bunch::<K>(&next, 1, &claim.leaf, &claim.proof),
        Err(BunchError::IndexOutOfRange { .. })
    ));
}

#[test]
fn ledger_snapshot_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let (_, ledger) = committed(0, &[1, 1, 3]);
    ledger.save(&path).unwrap();

    let mut reloaded = MemoryLedger::load(&path).unwrap();
    assert_eq!(reloaded, ledger);
    assert_eq!(locate(&reloaded, 9, RangeBoundary::HalfOpen).unwrap(), Some(2));
    assert!(matches!(
        reloaded.append(ledger.get(0).unwrap().header()),
        Err(BunchError::NonContiguous { expected: 12, found: 0 })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Binary search agrees with a linear scan under the half-open boundary.
    #[test]
    fn locate_matches_linear_scan(
        start in 0u64..1_000,
        depths in prop::collection::vec(0u32..5, 0..12),
        probe in 0u64..1_400,
    ) {
        let mut ledger = MemoryLedger::new();
        let mut at = start;
        for &d in &depths {
            ledger
                .append(bunch_core::BunchHeader {
                    start_block_number: at,
                    depth: d,
                    transactions_mega_root: Digest::ZERO,
                    receipts_mega_root: Digest::ZERO,
                })
                .unwrap();
            at += 1 << d;
        }
        let expected = ledger
            .records()
            .iter()
            .find(|r| probe >= r.start_block_number && probe < r.start_block_number + (1 << r.depth))
            .map(|r| r.index);
        prop_assert_eq!(locate(&ledger, probe, RangeBoundary::HalfOpen).unwrap(), expected);

        // Inclusive never loses a half-open hit; it may only pick the lower
        // neighbour on a boundary.
        let inc = locate(&ledger, probe, RangeBoundary::Inclusive).unwrap();
        if let Some(i) = expected {
            prop_assert!(inc == Some(i) || inc == i.checked_sub(1));
        }
    }
}
