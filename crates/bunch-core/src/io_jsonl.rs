//! JSON Lines (NDJSON) helpers for streaming header I/O.
//!
//! Header dumps for deep bunches get large (a depth-20 bunch is a million
//! lines), so the reader returns an iterator that *owns* its buffered file and
//! yields one `Result<T>` per line; callers see per-line errors with line
//! numbers instead of one opaque failure.
//!
//! `.jsonl` and `.ndjson` are treated as the same format.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use crate::BlockHeader;

/// Owning JSONL iterator over any deserializable item.
pub struct JsonlIter<T> {
    rdr: BufReader<File>,
    buf: String,
    line_no: usize,
    _item: PhantomData<fn() -> T>,
}

impl<T> JsonlIter<T> {
    fn new(file: File) -> Self {
        Self {
            rdr: BufReader::new(file),
            buf: String::with_capacity(256),
            line_no: 0,
            _item: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Iterator for JsonlIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.rdr.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let line = self.buf.trim_end_matches(['\n', '\r']);
                if line.is_empty() {
                    return Some(Err(anyhow::anyhow!(
                        "parse jsonl line {}: empty line",
                        self.line_no
                    )));
                }
                Some(
                    serde_json::from_str(line)
                        .with_context(|| format!("parse jsonl line {}", self.line_no)),
                )
            }
            Err(e) => Some(Err(e).with_context(|| format!("read line {}", self.line_no + 1))),
        }
    }
}

/// Open a JSONL file of [`BlockHeader`]s for streaming.
///
/// # Errors
/// Opening the file may fail. Individual items are `Err` for malformed lines.
pub fn stream_headers_jsonl<P: AsRef<Path>>(path: P) -> Result<JsonlIter<BlockHeader>> {
    let f = File::open(path.as_ref())
        .with_context(|| format!("open {}", path.as_ref().display()))?;
    Ok(JsonlIter::new(f))
}

/// Write headers as JSON Lines (one object per line).
pub fn write_headers_jsonl<P: AsRef<Path>>(path: P, headers: &[BlockHeader]) -> Result<()> {
    write_jsonl(path, headers)
}

/// Generic JSONL writer.
pub fn write_jsonl<P: AsRef<Path>, T: Serialize>(path: P, items: &[T]) -> Result<()> {
    let f = File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    let mut w = BufWriter::new(f);
    for it in items {
        serde_json::to_writer(&mut w, it).context("serialize jsonl item")?;
        w.write_all(b"\n").context("write newline")?;
    }
    w.flush().context("flush writer")?;
    Ok(())
}
