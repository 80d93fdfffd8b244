//! bunch-ledger — where committed bunches live and how blocks are found in
//! them.
//!
//! - [`BunchLedger`]: append-only store of [`BunchRecord`]s with contiguous,
//!   non-overlapping ranges; [`MemoryLedger`] is the in-process version with
//!   JSON/CBOR snapshots.
//! - [`locate`]: binary search from a block number to the owning record.
//! - [`HeaderSource`]: where per-block headers come from; the provided
//!   [`HeaderSource::fetch_range`] fans out over `rayon`.
//! - [`build_bunch`] / [`prove_block`]: header fan-out followed by the
//!   Merkle engine.

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

/// Header fan-out into bunch headers and inclusion claims.
pub mod build;
/// Ledger trait and the in-memory implementation.
pub mod ledger;
/// Block-number to record lookup.
pub mod locate;
/// Header sources.
pub mod source;

pub use build::{build_bunch, prove_block};
pub use ledger::{BunchLedger, MemoryLedger};
pub use locate::{locate, locate_leaf};
pub use source::{HeaderSource, MemoryHeaderSource};

pub use bunch_core::{BunchHeader, BunchRecord, RangeBoundary};
