//! Optional `bunch.toml` defaults, overridden by explicit flags.

use anyhow::{anyhow, Context, Result};
use bunch_core::RangeBoundary;
use bunch_crypto::HashKind;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk config. Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// `keccak256` or `blake3`.
    pub hash: Option<String>,
    /// `half-open` or `inclusive`.
    pub boundary: Option<RangeBoundary>,
    /// Default header dump.
    pub headers: Option<PathBuf>,
    /// Default ledger snapshot.
    pub ledger: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let src = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&src).with_context(|| format!("parse config {}", path.display()))
    }
}

/// Effective settings after merging flags over the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub hash: HashKind,
    pub boundary: RangeBoundary,
    headers: Option<PathBuf>,
    ledger: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        hash: Option<HashKind>,
        boundary: Option<RangeBoundary>,
    ) -> Result<Self> {
        let hash = match (hash, file.hash.as_deref()) {
            (Some(h), _) => h,
            (None, Some(name)) => parse_hash(name).map_err(|e| anyhow!("config: {e}"))?,
            (None, None) => HashKind::default(),
        };
        Ok(Self {
            hash,
            boundary: boundary.or(file.boundary).unwrap_or_default(),
            headers: file.headers,
            ledger: file.ledger,
        })
    }

    /// `flag`, else the configured header dump.
    pub fn headers(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        flag.or_else(|| self.headers.clone())
            .ok_or_else(|| anyhow!("no header file: pass --headers or set `headers` in the config"))
    }

    /// `flag`, else the configured ledger snapshot.
    pub fn ledger(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        flag.or_else(|| self.ledger.clone())
            .ok_or_else(|| anyhow!("no ledger: pass --ledger or set `ledger` in the config"))
    }
}

pub fn parse_hash(s: &str) -> Result<HashKind, String> {
    HashKind::from_name(s).ok_or_else(|| format!("unknown hash `{s}` (use keccak256|blake3)"))
}

pub fn parse_boundary(s: &str) -> Result<RangeBoundary, String> {
    match s.to_ascii_lowercase().as_str() {
        "half-open" | "halfopen" => Ok(RangeBoundary::HalfOpen),
        "inclusive" => Ok(RangeBoundary::Inclusive),
        _ => Err(format!("unknown boundary `{s}` (use half-open|inclusive)")),
    }
}
