//! Building bunches and inclusion claims from a header source.

use bunch_core::{
    span_for_depth, BlockNumber, BunchError, BunchHeader, BunchResult, InclusionClaim,
};
use bunch_crypto::NodeHasher;
use bunch_merkle::{commit_headers, BunchTree};

use crate::HeaderSource;

/// Fetch the `2^depth` headers from `start` and commit them.
///
/// Reduction starts only after every header has arrived; any failed fetch
/// fails the build and no partial root is produced.
pub fn build_bunch<H: NodeHasher, S: HeaderSource + ?Sized>(
    source: &S,
    start: BlockNumber,
    depth: u32,
) -> BunchResult<BunchHeader> {
    let span = span_for_depth(depth)?;
    let headers = source.fetch_range(start, span)?;
    let bunch = commit_headers::<H>(&headers)?;
    tracing::info!(
        start,
        depth,
        tx_root = %bunch.transactions_mega_root,
        rc_root = %bunch.receipts_mega_root,
        "built bunch"
    );
    Ok(bunch)
}

/// Build the bunch `[start, start + 2^depth)` and prove the transaction root
/// of `block` inside it.
pub fn prove_block<H: NodeHasher, S: HeaderSource + ?Sized>(
    source: &S,
    start: BlockNumber,
    depth: u32,
    block: BlockNumber,
) -> BunchResult<InclusionClaim> {
    let span = span_for_depth(depth)?;
    if block < start || block - start >= span {
        return Err(BunchError::IndexOutOfRange {
            index: block,
            start,
            end: start.saturating_add(span),
        });
    }
    let leaves = source.transaction_roots(start, span)?;
    let tree = BunchTree::<H>::build(&leaves)?;
    let index = block - start;
    let proof = tree.open(index)?;
    tracing::debug!(block, start, depth, root = %tree.root(), "proved block");
    Ok(InclusionClaim {
        block_number: block,
        start_block_number: start,
        depth,
        leaf: tree.leaves()[index as usize],
        proof,
    })
}
