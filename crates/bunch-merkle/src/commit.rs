//! Bunch commitments over block headers.
//!
//! - A bunch header carries two mega roots: one over per-block transaction
//!   roots and one over per-block receipt roots, both reduced with the same
//!   node hash.
//! - Headers must be consecutive block numbers; their count fixes the depth.
//! - A whole header dump (JSON/CBOR/JSONL) can be committed in one pass;
//!   `.jsonl` inputs are streamed.

use anyhow::{anyhow, Context, Result};
use bunch_core::{
    io as core_io, BlockHeader, BunchError, BunchHeader, BunchRecord, BunchResult, Digest,
    LeafSequence,
};
use bunch_crypto::NodeHasher;
use std::path::Path;

use crate::compute_root;

/// Per-block roots split into the two leaf lists, checked for consecutive
/// numbering.
struct RootColumns {
    start: u64,
    tx: Vec<Digest>,
    rc: Vec<Digest>,
}

impl RootColumns {
    fn new() -> Self {
        Self {
            start: 0,
            tx: Vec::new(),
            rc: Vec::new(),
        }
    }

    fn push(&mut self, h: &BlockHeader) -> BunchResult<()> {
        if self.tx.is_empty() {
            self.start = h.number;
        } else {
            let expected = self.start.saturating_add(self.tx.len() as u64);
            if h.number != expected {
                return Err(BunchError::NonContiguous {
                    expected,
                    found: h.number,
                });
            }
        }
        self.tx.push(h.transactions_root);
        self.rc.push(h.receipts_root);
        Ok(())
    }

    fn commit<H: NodeHasher>(self) -> BunchResult<BunchHeader> {
        let tx = LeafSequence::new(self.tx)?;
        let rc = LeafSequence::new(self.rc)?;
        Ok(BunchHeader {
            start_block_number: self.start,
            depth: tx.depth(),
            transactions_mega_root: compute_root::<H>(&tx)?,
            receipts_mega_root: compute_root::<H>(&rc)?,
        })
    }
}

/// Commit consecutive headers into a bunch header.
///
/// Fails with `NonContiguous` on a gap or reordering and with
/// `InvalidLeafCount` unless the count is a power of two.
pub fn commit_headers<H: NodeHasher>(headers: &[BlockHeader]) -> BunchResult<BunchHeader> {
    let mut cols = RootColumns::new();
    for h in headers {
        cols.push(h)?;
    }
    let bunch = cols.commit::<H>()?;
    tracing::debug!(
        start = bunch.start_block_number,
        depth = bunch.depth,
        tx_root = %bunch.transactions_mega_root,
        "committed bunch"
    );
    Ok(bunch)
}

/// In-memory audit: recompute both mega roots and compare with `record`.
pub fn validate_headers_against_record<H: NodeHasher>(
    headers: &[BlockHeader],
    record: &BunchRecord,
) -> Result<()> {
    let recomputed = commit_headers::<H>(headers)?;
    compare(&recomputed, record)
}

fn compare(recomputed: &BunchHeader, record: &BunchRecord) -> Result<()> {
    if recomputed.start_block_number != record.start_block_number
        || recomputed.depth != record.depth
    {
        return Err(anyhow!(
            "range mismatch: record=[{} +2^{}], headers=[{} +2^{}]",
            record.start_block_number,
            record.depth,
            recomputed.start_block_number,
            recomputed.depth
        ));
    }
    if recomputed.transactions_mega_root != record.transactions_mega_root {
        return Err(anyhow!(
            "transactions mega root mismatch: record={}, recomputed={}",
            hex::encode(record.transactions_mega_root),
            hex::encode(recomputed.transactions_mega_root)
        ));
    }
    if recomputed.receipts_mega_root != record.receipts_mega_root {
        return Err(anyhow!(
            "receipts mega root mismatch: record={}, recomputed={}",
            hex::encode(record.receipts_mega_root),
            hex::encode(recomputed.receipts_mega_root)
        ));
    }
    Ok(())
}

/// Read a header dump (JSON/CBOR/JSONL) and commit it.
///
/// `.jsonl` inputs are streamed; only the two root columns are held.
pub fn commit_header_file<H: NodeHasher, P: AsRef<Path>>(headers_path: P) -> Result<BunchHeader> {
    let path = headers_path.as_ref();
    let mut cols = RootColumns::new();
    for item in core_io::stream_headers_auto(path)
        .with_context(|| format!("read headers {}", path.display()))?
    {
        cols.push(&item?)?;
    }
    let bunch = cols
        .commit::<H>()
        .with_context(|| format!("commit headers {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        start = bunch.start_block_number,
        depth = bunch.depth,
        "committed header file"
    );
    Ok(bunch)
}
