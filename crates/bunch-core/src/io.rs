//! Serialization helpers for headers, bunch records, and inclusion claims.
//!
//! JSON and CBOR read/write utilities with extension-based auto-detection.
//! Unknown/missing extensions are rejected for reads and default to JSON for
//! writes. Header files may additionally be `.jsonl`/`.ndjson` (streamed).

use crate::{BlockHeader, BunchRecord, InclusionClaim};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let f = File::open(path).with_context(|| format!("open {}", display(path)))?;
    let rdr = BufReader::new(f);
    serde_json::from_reader(rdr).with_context(|| format!("deserialize JSON {what}"))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, v: &T, what: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", display(path)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| format!("serialize JSON {what}"))?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

fn read_cbor<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let f = File::open(path).with_context(|| format!("open {}", display(path)))?;
    let mut rdr = BufReader::new(f);
    ciborium::de::from_reader(&mut rdr).with_context(|| format!("deserialize CBOR {what}"))
}

fn write_cbor<T: Serialize + ?Sized>(path: &Path, v: &T, what: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", display(path)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| format!("serialize CBOR {what}"))?;
    w.flush().with_context(|| "flush CBOR writer")?;
    Ok(())
}

fn read_auto<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    match ext_lower(path).as_deref() {
        Some("json") => read_json(path, what),
        Some("cbor") => read_cbor(path, what),
        Some(other) => Err(anyhow!(
            "unsupported {what} extension: {other} (supported: .json, .cbor)"
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

fn write_auto<T: Serialize + ?Sized>(path: &Path, v: &T, what: &str) -> Result<()> {
    match ext_lower(path).as_deref() {
        Some("cbor") => write_cbor(path, v, what),
        _ => write_json(path, v, what),
    }
}

/// ------------------------------
/// Block headers
/// ------------------------------

/// Read all headers from `.json`, `.cbor`, `.jsonl` or `.ndjson`.
pub fn read_headers_auto<P: AsRef<Path>>(path: P) -> Result<Vec<BlockHeader>> {
    let path = path.as_ref();
    match ext_lower(path).as_deref() {
        Some("jsonl" | "ndjson") => crate::io_jsonl::stream_headers_jsonl(path)?.collect(),
        _ => read_auto(path, "block headers"),
    }
}

/// Write headers; `.jsonl`/`.ndjson` produce JSON Lines, `.cbor` CBOR,
/// anything else pretty JSON.
pub fn write_headers_auto<P: AsRef<Path>>(path: P, v: &[BlockHeader]) -> Result<()> {
    let path = path.as_ref();
    match ext_lower(path).as_deref() {
        Some("jsonl" | "ndjson") => {
            ensure_parent_dir(path)?;
            crate::io_jsonl::write_headers_jsonl(path, v)
        }
        _ => write_auto(path, v, "block headers"),
    }
}

/// Return a boxed iterator over headers for the given path.
///
/// - **`.jsonl` / `.ndjson`**: true streaming, one line at a time.
/// - **`.json` / `.cbor`**: load the vector, then iterate.
pub fn stream_headers_auto<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn Iterator<Item = Result<BlockHeader>> + Send>> {
    let pb = path.as_ref().to_owned();
    match ext_lower(&pb).as_deref() {
        Some("jsonl" | "ndjson") => Ok(Box::new(crate::io_jsonl::stream_headers_jsonl(pb)?)),
        _ => {
            let v: Vec<BlockHeader> = read_auto(&pb, "block headers")?;
            Ok(Box::new(v.into_iter().map(Ok)))
        }
    }
}

/// ------------------------------
/// Bunch records (ledger snapshots)
/// ------------------------------

/// Read a ledger snapshot (`Vec<BunchRecord>`) from `.json` / `.cbor`.
pub fn read_records_auto<P: AsRef<Path>>(path: P) -> Result<Vec<BunchRecord>> {
    read_auto(path.as_ref(), "bunch records")
}

/// Write a ledger snapshot (defaults to JSON if the extension is unknown).
pub fn write_records_auto<P: AsRef<Path>>(path: P, v: &[BunchRecord]) -> Result<()> {
    write_auto(path.as_ref(), v, "bunch records")
}

/// ------------------------------
/// Inclusion claims
/// ------------------------------

/// Read an [`InclusionClaim`] from `.json` / `.cbor`.
pub fn read_claim_auto<P: AsRef<Path>>(path: P) -> Result<InclusionClaim> {
    read_auto(path.as_ref(), "inclusion claim")
}

/// Write an [`InclusionClaim`] (defaults to JSON if the extension is unknown).
pub fn write_claim_auto<P: AsRef<Path>>(path: P, v: &InclusionClaim) -> Result<()> {
    write_auto(path.as_ref(), v, "inclusion claim")
}

/// Return the lowercase extension (without dot) if present.
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}

/// Human-friendly path display for error messages.
fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Digest, InclusionProof};

    fn record(index: u64, start: u64, depth: u32) -> BunchRecord {
        BunchRecord {
            index,
            start_block_number: start,
            depth,
            transactions_mega_root: Digest([index as u8; 32]),
            receipts_mega_root: Digest::ZERO,
        }
    }

    #[test]
    fn records_json_and_cbor_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let recs = vec![record(0, 0, 2), record(1, 4, 3)];
        for name in ["ledger.json", "ledger.cbor"] {
            let p = dir.path().join(name);
            write_records_auto(&p, &recs).unwrap();
            assert_eq!(read_records_auto(&p).unwrap(), recs, "{name}");
        }
    }

    #[test]
    fn headers_all_formats_agree() {
        let dir = tempfile::tempdir().unwrap();
        let hs: Vec<BlockHeader> = (0..4u8)
            .map(|i| BlockHeader {
                number: u64::from(i),
                transactions_root: Digest([i; 32]),
                receipts_root: Digest([i ^ 0x5a; 32]),
            })
            .collect();
        for name in ["h.json", "h.cbor", "h.jsonl", "nested/h.ndjson"] {
            let p = dir.path().join(name);
            write_headers_auto(&p, &hs).unwrap();
            assert_eq!(read_headers_auto(&p).unwrap(), hs, "{name}");
            let streamed: Vec<_> = stream_headers_auto(&p)
                .unwrap()
                .collect::<Result<_>>()
                .unwrap();
            assert_eq!(streamed, hs, "{name}");
        }
    }

    #[test]
    fn claim_roundtrip_keeps_hex_proof() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("claim.json");
        let claim = InclusionClaim {
            block_number: 6,
            start_block_number: 4,
            depth: 2,
            leaf: Digest([9; 32]),
            proof: InclusionProof::new(vec![Digest([1; 32]), Digest([2; 32])]),
        };
        write_claim_auto(&p, &claim).unwrap();
        let raw = std::fs::read_to_string(&p).unwrap();
        assert!(raw.contains(&claim.proof.to_hex()));
        assert_eq!(read_claim_auto(&p).unwrap(), claim);
    }

    #[test]
    fn unknown_extension_rejected_on_read() {
        let err = read_records_auto("ledger.yaml").unwrap_err();
        assert!(err.to_string().contains("unsupported"));
        assert!(read_records_auto("ledger").is_err());
    }
}
