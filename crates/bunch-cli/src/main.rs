// crates/bunch-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

mod config;

use anyhow::{bail, Context, Result};
use bunch_core::{
    io::{read_claim_auto, write_claim_auto},
    span_for_depth, Digest, InclusionProof, RangeBoundary,
};
use bunch_crypto::{Blake3Hasher, HashKind, Keccak256Hasher, NodeHasher};
use bunch_ledger::{
    build_bunch, locate_leaf, prove_block, BunchLedger, HeaderSource, MemoryHeaderSource,
    MemoryLedger,
};
use bunch_merkle::commit_header_file;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{parse_boundary, parse_hash, FileConfig, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "bunch-cli",
    about = "Bunch-root commitment CLI",
    long_about = "Bunch-root commitment CLI.\n\nCommit power-of-two runs of block headers into mega roots, keep them in a ledger, and produce/verify per-block inclusion proofs.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// TOML file with defaults for hash, boundary, headers and ledger
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Node hash (keccak256|blake3) [default: keccak256]
    #[arg(long, global = true, value_parser = parse_hash)]
    hash: Option<HashKind>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Build a bunch from a header dump and print its mega roots.
    /// Without --start/--depth the whole dump is committed as one bunch.
    Commit {
        /// Header dump (JSON/CBOR/JSONL)
        #[arg(long)]
        headers: Option<PathBuf>,

        /// First block of the bunch
        #[arg(long, requires = "depth")]
        start: Option<u64>,

        /// log2 of the number of blocks
        #[arg(long, requires = "start")]
        depth: Option<u32>,

        /// Append the bunch to this ledger snapshot (JSON/CBOR)
        #[arg(long)]
        ledger: Option<PathBuf>,
    },

    /// Prove one block's transaction root inside a bunch
    Prove {
        /// Header dump (JSON/CBOR/JSONL)
        #[arg(long)]
        headers: Option<PathBuf>,

        /// First block of the bunch
        #[arg(long)]
        start: u64,

        /// log2 of the number of blocks
        #[arg(long)]
        depth: u32,

        /// Block to prove
        #[arg(long)]
        block: u64,

        /// Write the inclusion claim here (JSON/CBOR)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Verify a proof against a bare root
    Verify {
        /// Trusted bunch root (0x-hex)
        #[arg(long)]
        root: Digest,

        /// Claimed leaf (0x-hex)
        #[arg(long)]
        leaf: Digest,

        /// Leaf index inside the bunch
        #[arg(long)]
        index: u64,

        /// Concatenated sibling digests (0x-hex)
        #[arg(long, value_parser = parse_proof)]
        proof: InclusionProof,
    },

    /// Locate a block's bunch in the ledger and verify its proof there
    VerifyBlock {
        /// Ledger snapshot (JSON/CBOR)
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Inclusion claim written by `prove --out`
        #[arg(long, conflicts_with_all = ["block", "leaf", "proof"])]
        claim: Option<PathBuf>,

        /// Block number
        #[arg(long, required_unless_present = "claim")]
        block: Option<u64>,

        /// Claimed transaction root (0x-hex)
        #[arg(long, required_unless_present = "claim")]
        leaf: Option<Digest>,

        /// Concatenated sibling digests (0x-hex)
        #[arg(long, value_parser = parse_proof, required_unless_present = "claim")]
        proof: Option<InclusionProof>,

        /// Range membership rule (half-open|inclusive)
        #[arg(long, value_parser = parse_boundary)]
        boundary: Option<RangeBoundary>,
    },

    /// Find the bunch and leaf index of a block
    Locate {
        /// Ledger snapshot (JSON/CBOR)
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Block number
        #[arg(long)]
        block: u64,

        /// Range membership rule (half-open|inclusive)
        #[arg(long, value_parser = parse_boundary)]
        boundary: Option<RangeBoundary>,
    },

    /// Rebuild a ledger record from headers and compare both mega roots
    Audit {
        /// Header dump (JSON/CBOR/JSONL)
        #[arg(long)]
        headers: Option<PathBuf>,

        /// Ledger snapshot (JSON/CBOR)
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Record index
        #[arg(long)]
        index: u64,
    },
}

impl Cmd {
    /// Boundary flag, for subcommands that take one.
    fn boundary(&self) -> Option<RangeBoundary> {
        match self {
            Self::VerifyBlock { boundary, .. } | Self::Locate { boundary, .. } => *boundary,
            _ => None,
        }
    }
}

fn parse_proof(s: &str) -> Result<InclusionProof, String> {
    InclusionProof::from_hex(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(p) => FileConfig::load(p)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(file, cli.hash, cli.cmd.boundary())?;
    info!(hash = %settings.hash, boundary = settings.boundary.as_str(), "settings");

    match settings.hash {
        HashKind::Keccak256 => run::<Keccak256Hasher>(cli.cmd, &settings),
        HashKind::Blake3 => run::<Blake3Hasher>(cli.cmd, &settings),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn run<H: NodeHasher>(cmd: Cmd, settings: &Settings) -> Result<()> {
    match cmd {
        Cmd::Commit {
            headers,
            start,
            depth,
            ledger,
        } => {
            let range = start.zip(depth);
            commit::<H>(&settings.headers(headers)?, range, ledger.as_deref())
        }

        Cmd::Prove {
            headers,
            start,
            depth,
            block,
            out,
        } => prove::<H>(&settings.headers(headers)?, start, depth, block, out.as_deref()),

        Cmd::Verify {
            root,
            leaf,
            index,
            proof,
        } => verify::<H>(&root, &leaf, index, &proof),

        Cmd::VerifyBlock {
            ledger,
            claim,
            block,
            leaf,
            proof,
            ..
        } => {
            let ledger = settings.ledger(ledger)?;
            match (claim, block, leaf, proof) {
                (Some(claim), ..) => verify_claim_file::<H>(&ledger, &claim, settings.boundary),
                (None, Some(block), Some(leaf), Some(proof)) => {
                    verify_block::<H>(&ledger, block, &leaf, &proof, settings.boundary)
                }
                _ => bail!("verify-block needs --claim or all of --block, --leaf, --proof"),
            }
        }

        Cmd::Locate { ledger, block, .. } => {
            locate(&settings.ledger(ledger)?, block, settings.boundary)
        }

        Cmd::Audit {
            headers,
            ledger,
            index,
        } => audit::<H>(&settings.headers(headers)?, &settings.ledger(ledger)?, index),
    }
}

fn load_source(headers: &Path) -> Result<MemoryHeaderSource> {
    MemoryHeaderSource::load(headers)
        .with_context(|| format!("loading headers from {}", headers.display()))
}

fn load_ledger(ledger: &Path) -> Result<MemoryLedger> {
    MemoryLedger::load(ledger).with_context(|| format!("loading ledger {}", ledger.display()))
}

fn commit<H: NodeHasher>(
    headers: &Path,
    range: Option<(u64, u32)>,
    ledger: Option<&Path>,
) -> Result<()> {
    info!(headers=%headers.display(), ?range, hash = H::NAME, "committing bunch");
    let bunch = match range {
        Some((start, depth)) => {
            let src = load_source(headers)?;
            build_bunch::<H, _>(&src, start, depth)
                .with_context(|| format!("building bunch [{start} +2^{depth}]"))?
        }
        None => commit_header_file::<H, _>(headers)?,
    };

    println!("start:                  {}", bunch.start_block_number);
    println!("depth:                  {}", bunch.depth);
    println!("transactions mega root: {}", bunch.transactions_mega_root);
    println!("receipts mega root:     {}", bunch.receipts_mega_root);

    if let Some(path) = ledger {
        let mut l = load_ledger(path)?;
        let index = l
            .append(bunch)
            .with_context(|| format!("appending to ledger {}", path.display()))?;
        l.save(path)
            .with_context(|| format!("writing ledger {}", path.display()))?;
        println!("Appended as bunch #{index} → {}", path.display());
    }
    Ok(())
}

fn prove<H: NodeHasher>(
    headers: &Path,
    start: u64,
    depth: u32,
    block: u64,
    out: Option<&Path>,
) -> Result<()> {
    info!(headers=%headers.display(), start, depth, block, "proving block");
    let src = load_source(headers)?;
    let claim = prove_block::<H, _>(&src, start, depth, block)
        .with_context(|| format!("proving block {block} in bunch [{start} +2^{depth}]"))?;

    println!("block: {}", claim.block_number);
    println!("index: {}", claim.leaf_index()?);
    println!("leaf:  {}", claim.leaf);
    println!("proof: {}", claim.proof);

    if let Some(path) = out {
        write_claim_auto(path, &claim)
            .with_context(|| format!("writing claim to {}", path.display()))?;
        println!("Wrote claim → {}", path.display());
    }
    Ok(())
}

fn report(ok: bool) -> Result<()> {
    println!("{ok}");
    if !ok {
        bail!("proof did not verify");
    }
    Ok(())
}

fn verify<H: NodeHasher>(root: &Digest, leaf: &Digest, index: u64, proof: &InclusionProof) -> Result<()> {
    info!(%root, index, levels = proof.len(), "verifying against root");
    let ok = bunch_merkle::verify::<H>(root, leaf, index, proof)?;
    report(ok)
}

fn verify_block<H: NodeHasher>(
    ledger: &Path,
    block: u64,
    leaf: &Digest,
    proof: &InclusionProof,
    boundary: RangeBoundary,
) -> Result<()> {
    let l = load_ledger(ledger)?;
    let Some((rec, _)) = locate_leaf(&l, block, boundary)? else {
        bail!("block {block} is not in any committed bunch");
    };
    info!(block, bunch = rec.index, "verifying against ledger record");
    let ok = bunch_merkle::verify_in_bunch::<H>(&rec, block, leaf, proof)?;
    report(ok)
}

fn verify_claim_file<H: NodeHasher>(
    ledger: &Path,
    claim: &Path,
    boundary: RangeBoundary,
) -> Result<()> {
    let l = load_ledger(ledger)?;
    let claim = read_claim_auto(claim)
        .with_context(|| format!("reading claim {}", claim.display()))?;
    let block = claim.block_number;
    let Some((rec, _)) = locate_leaf(&l, block, boundary)? else {
        bail!("block {block} is not in any committed bunch");
    };
    info!(block, bunch = rec.index, "verifying claim against ledger record");
    let ok = bunch_merkle::verify_claim::<H>(&rec, &claim)?;
    report(ok)
}

fn locate(ledger: &Path, block: u64, boundary: RangeBoundary) -> Result<()> {
    let l = load_ledger(ledger)?;
    match locate_leaf(&l, block, boundary)? {
        Some((rec, leaf)) => {
            println!("bunch: {}", rec.index);
            println!("range: [{}, {})", rec.start_block_number, rec.end_block()?);
            println!("leaf:  {leaf}");
        }
        None => println!("block {block} not committed"),
    }
    Ok(())
}

fn audit<H: NodeHasher>(headers: &Path, ledger: &Path, index: u64) -> Result<()> {
    info!(headers=%headers.display(), ledger=%ledger.display(), index, "auditing record");
    let l = load_ledger(ledger)?;
    let rec = l.get(index)?;
    let src = load_source(headers)?;
    let hs = src
        .fetch_range(rec.start_block_number, span_for_depth(rec.depth)?)
        .with_context(|| format!("headers for bunch #{index}"))?;
    bunch_merkle::validate_headers_against_record::<H>(&hs, &rec)
        .with_context(|| format!("auditing bunch #{index} against {}", headers.display()))?;

    println!("OK: bunch #{index} matches {}", headers.display());
    Ok(())
}
