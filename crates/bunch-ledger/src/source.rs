//! Header sources and parallel range fetches.

use anyhow::Result;
use bunch_core::{io as core_io, BlockHeader, BlockNumber, BunchError, BunchResult, Digest};
use rayon::prelude::*;
use std::{collections::BTreeMap, path::Path};

/// Where block headers come from (a node, an archive, a file).
///
/// `Sync` because [`HeaderSource::fetch_range`] calls `fetch_header` from
/// several worker threads at once.
pub trait HeaderSource: Sync {
    /// Header of block `number`, or `SourceUnavailable`.
    fn fetch_header(&self, number: BlockNumber) -> BunchResult<BlockHeader>;

    /// Exactly `count` headers ascending from `start`.
    ///
    /// Fetches run concurrently on the rayon pool and each lands in its own
    /// slot; the first failure fails the whole range. A source answering with
    /// the wrong block number is treated as unavailable.
    fn fetch_range(&self, start: BlockNumber, count: u64) -> BunchResult<Vec<BlockHeader>> {
        let n = usize::try_from(count)
            .ok()
            .filter(|_| count == 0 || start.checked_add(count - 1).is_some())
            .ok_or_else(|| {
                BunchError::unavailable(
                    format!("{count} headers from block {start}"),
                    "range not addressable",
                )
            })?;
        tracing::debug!(start, count, "fetching header range");
        (0..n)
            .into_par_iter()
            .map(|i| {
                let number = start + i as u64;
                let header = self.fetch_header(number)?;
                if header.number != number {
                    return Err(BunchError::unavailable(
                        format!("block {number}"),
                        format!("source returned block {}", header.number),
                    ));
                }
                Ok(header)
            })
            .collect()
    }

    /// Transaction roots of `count` blocks from `start`, in order.
    fn transaction_roots(&self, start: BlockNumber, count: u64) -> BunchResult<Vec<Digest>> {
        Ok(self
            .fetch_range(start, count)?
            .iter()
            .map(|h| h.transactions_root)
            .collect())
    }

    /// Receipt roots of `count` blocks from `start`, in order.
    fn receipt_roots(&self, start: BlockNumber, count: u64) -> BunchResult<Vec<Digest>> {
        Ok(self
            .fetch_range(start, count)?
            .iter()
            .map(|h| h.receipts_root)
            .collect())
    }
}

/// Headers held in memory, keyed by block number.
#[derive(Clone, Debug, Default)]
pub struct MemoryHeaderSource {
    headers: BTreeMap<BlockNumber, BlockHeader>,
}

impl MemoryHeaderSource {
    /// Index `headers` by number; later duplicates win.
    pub fn from_headers<I: IntoIterator<Item = BlockHeader>>(headers: I) -> Self {
        Self {
            headers: headers.into_iter().map(|h| (h.number, h)).collect(),
        }
    }

    /// Load a header dump (JSON/CBOR/JSONL by extension).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let src = Self::from_headers(core_io::read_headers_auto(path)?);
        tracing::debug!(path = %path.display(), headers = src.len(), "loaded header source");
        Ok(src)
    }

    /// Number of distinct blocks held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// `true` when no header is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Lowest and highest block number held.
    #[must_use]
    pub fn bounds(&self) -> Option<(BlockNumber, BlockNumber)> {
        let lo = *self.headers.keys().next()?;
        let hi = *self.headers.keys().next_back()?;
        Some((lo, hi))
    }
}

impl HeaderSource for MemoryHeaderSource {
    fn fetch_header(&self, number: BlockNumber) -> BunchResult<BlockHeader> {
        self.headers
            .get(&number)
            .copied()
            .ok_or_else(|| BunchError::unavailable(format!("block {number}"), "not in header source"))
    }
}
