//! Append-only bunch ledgers and their in-memory implementation.

use anyhow::{Context, Result};
use bunch_core::{
    io as core_io, BlockNumber, BunchError, BunchHeader, BunchIndex, BunchRecord,
    BunchResult,
};
use std::path::Path;

/// Append-only collection of bunch records.
///
/// Implementations keep record `i + 1` starting exactly where record `i`
/// ends. Reads may block (a contract call, a database) and are fallible.
pub trait BunchLedger {
    /// Record at `index`.
    fn get(&self, index: BunchIndex) -> BunchResult<BunchRecord>;

    /// Number of records.
    fn len(&self) -> BunchResult<u64>;

    /// Append a bunch and return the index it was assigned.
    ///
    /// Fails with `NonContiguous` if `header` does not start where the last
    /// record ends.
    fn append(&mut self, header: BunchHeader) -> BunchResult<BunchIndex>;

    /// `true` when no bunch has been committed yet.
    fn is_empty(&self) -> BunchResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Index of the newest record, `None` when empty.
    fn last_index(&self) -> BunchResult<Option<BunchIndex>> {
        Ok(self.len()?.checked_sub(1))
    }
}

/// In-memory ledger backed by a `Vec`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    records: Vec<BunchRecord>,
}

impl MemoryLedger {
    /// Empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Rebuild from stored records, re-checking indices and contiguity.
    pub fn from_records(records: Vec<BunchRecord>) -> BunchResult<Self> {
        let mut ledger = Self::new();
        for (i, rec) in records.into_iter().enumerate() {
            let assigned = ledger.append(rec.header())?;
            if assigned != rec.index {
                return Err(BunchError::NonContiguous {
                    expected: i as u64,
                    found: rec.index,
                });
            }
        }
        Ok(ledger)
    }

    /// All records, oldest first.
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[BunchRecord] {
        &self.records
    }

    /// First block the next appended bunch must start at.
    ///
    /// `None` for an empty ledger; `RangeOverflow` once the newest bunch
    /// ends at `u64::MAX` and nothing can follow it.
    pub fn next_start(&self) -> BunchResult<Option<BlockNumber>> {
        let Some(last) = self.records.last() else {
            return Ok(None);
        };
        last.header()
            .last_block()?
            .checked_add(1)
            .map(Some)
            .ok_or(BunchError::RangeOverflow {
                start: last.start_block_number,
                depth: last.depth,
            })
    }

    /// Load a JSON/CBOR snapshot (by extension). A missing file is an empty
    /// ledger.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no ledger snapshot; starting empty");
            return Ok(Self::new());
        }
        let records = core_io::read_records_auto(path)?;
        let n = records.len();
        let ledger = Self::from_records(records)
            .with_context(|| format!("ledger snapshot {} is inconsistent", path.display()))?;
        tracing::debug!(path = %path.display(), records = n, "loaded ledger");
        Ok(ledger)
    }

    /// Write a JSON/CBOR snapshot (by extension).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        core_io::write_records_auto(path, &self.records)
    }
}

impl BunchLedger for MemoryLedger {
    fn get(&self, index: BunchIndex) -> BunchResult<BunchRecord> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.records.get(i))
            .copied()
            .ok_or(BunchError::IndexOutOfRange {
                index,
                start: 0,
                end: self.records.len() as u64,
            })
    }

    fn len(&self) -> BunchResult<u64> {
        Ok(self.records.len() as u64)
    }

    fn append(&mut self, header: BunchHeader) -> BunchResult<BunchIndex> {
        header.last_block()?;
        if let Some(expected) = self.next_start()? {
            if header.start_block_number != expected {
                return Err(BunchError::NonContiguous {
                    expected,
                    found: header.start_block_number,
                });
            }
        }
        let index = self.records.len() as u64;
        self.records.push(header.with_index(index));
        tracing::debug!(
            index,
            start = header.start_block_number,
            depth = header.depth,
            "appended bunch"
        );
        Ok(index)
    }
}
