//! Drive the binary end to end against temp files.

use bunch_core::{io::write_headers_auto, BlockHeader, Digest};
use std::path::Path;
use std::process::{Command, Output};

fn bin(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bunch-cli"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

fn header(n: u64) -> BlockHeader {
    BlockHeader {
        number: n,
        transactions_root: Digest(bunch_crypto::keccak256(&n.to_be_bytes())),
        receipts_root: Digest(bunch_crypto::keccak256(&(n ^ 0xffff).to_be_bytes())),
    }
}

/// Run with `--config bunch.toml` prepended.
fn with_cfg(args: &[&str], cwd: &Path) -> Output {
    let mut all = vec!["--config", "bunch.toml"];
    all.extend_from_slice(args);
    bin(&all, cwd)
}

#[test]
fn commit_locate_prove_verify_audit() {
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path();
    write_headers_auto(cwd.join("headers.jsonl"), &(0..16).map(header).collect::<Vec<_>>())
        .unwrap();
    std::fs::write(
        cwd.join("bunch.toml"),
        "headers = \"headers.jsonl\"\nledger = \"ledger.json\"\n",
    )
    .unwrap();

    for (start, depth) in [("0", "2"), ("4", "3"), ("12", "2")] {
        let o = with_cfg(&["commit", "--start", start, "--depth", depth], cwd);
        assert!(o.status.success(), "{o:?}");
        let o = with_cfg(
            &["commit", "--start", start, "--depth", depth, "--ledger", "ledger.json"],
            cwd,
        );
        assert!(o.status.success(), "{o:?}");
        assert!(stdout(&o).contains("transactions mega root: 0x"));
    }

    // A gap is refused.
    let o = with_cfg(
        &["commit", "--start", "0", "--depth", "0", "--ledger", "ledger.json"],
        cwd,
    );
    assert!(!o.status.success());

    let o = with_cfg(&["locate", "--block", "7"], cwd);
    assert!(stdout(&o).contains("bunch: 1"), "{}", stdout(&o));
    assert!(stdout(&o).contains("leaf:  3"));
    let o = with_cfg(&["locate", "--block", "20"], cwd);
    assert!(stdout(&o).contains("not committed"));

    let o = with_cfg(
        &["prove", "--start", "4", "--depth", "3", "--block", "7", "--out", "claim.json"],
        cwd,
    );
    assert!(o.status.success(), "{o:?}");
    let out = stdout(&o);
    let field = |name: &str| {
        out.lines()
            .find_map(|l| l.strip_prefix(name))
            .map(|v| v.trim().to_owned())
            .unwrap()
    };
    let (leaf, proof) = (field("leaf:"), field("proof:"));

    let o = with_cfg(
        &["verify-block", "--block", "7", "--leaf", &leaf, "--proof", &proof],
        cwd,
    );
    assert!(o.status.success(), "{o:?}");
    assert_eq!(stdout(&o).trim(), "true");

    // Same proof, claimed for a neighbouring block of the same bunch.
    let o = with_cfg(
        &["verify-block", "--block", "6", "--leaf", &leaf, "--proof", &proof],
        cwd,
    );
    assert!(!o.status.success());
    assert_eq!(stdout(&o).trim(), "false");

    let o = with_cfg(&["verify-block", "--claim", "claim.json"], cwd);
    assert!(o.status.success(), "{o:?}");
    assert_eq!(stdout(&o).trim(), "true");

    let o = with_cfg(&["audit", "--index", "2"], cwd);
    assert!(o.status.success(), "{o:?}");

    // Same ledger, other hash: the audit must fail.
    let o = with_cfg(&["--hash", "blake3", "audit", "--index", "2"], cwd);
    assert!(!o.status.success());
}

#[test]
fn verify_known_vector() {
    let dir = tempfile::tempdir().unwrap();
    let root = "0xbeb71f2befb15738bb8afa37321f4edc7ab0632d44cca6d428406326e9350fac";
    let leaf = "0x637d0a967d87afee13c1523c7cab9018d3fe3fad9ee709ab499f104f85f7c7ee";
    let proof = "0xa5b23188a2023f264d28c89a247091fde93ed4cd333148b6d6a6b4a8212b0a2d\
                 64bbca4f5db3b9a11d767673cbb0bb8c0f8524a0f864b918dc5b0a4c367c21ab";

    let args = |index: &'static str| {
        vec!["verify", "--root", root, "--leaf", leaf, "--index", index, "--proof", proof]
    };
    let o = bin(&args("2"), dir.path());
    assert!(o.status.success(), "{o:?}");
    assert_eq!(stdout(&o).trim(), "true");

    let o = bin(&args("1"), dir.path());
    assert!(!o.status.success());
    assert_eq!(stdout(&o).trim(), "false");

    // Out of range is an error, not `false`.
    let o = bin(&args("4"), dir.path());
    assert!(!o.status.success());
    assert!(stdout(&o).is_empty());
}

#[test]
fn commit_whole_dump() {
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path();
    let headers: Vec<_> = (32..48).map(header).collect();
    write_headers_auto(cwd.join("headers.jsonl"), &headers).unwrap();
    write_headers_auto(cwd.join("ragged.json"), &headers[..15]).unwrap();

    let o = bin(&["commit", "--headers", "headers.jsonl", "--ledger", "ledger.json"], cwd);
    assert!(o.status.success(), "{o:?}");
    let out = stdout(&o);
    assert!(out.contains("start:                  32"), "{out}");
    assert!(out.contains("depth:                  4"), "{out}");

    // The ranged commit of the same blocks gives the same roots.
    let o = bin(
        &["commit", "--headers", "headers.jsonl", "--start", "32", "--depth", "4"],
        cwd,
    );
    assert!(o.status.success(), "{o:?}");
    assert_eq!(stdout(&o), out.lines().take(4).map(|l| format!("{l}\n")).collect::<String>());

    let o = bin(&["audit", "--headers", "headers.jsonl", "--ledger", "ledger.json", "--index", "0"], cwd);
    assert!(o.status.success(), "{o:?}");

    let o = bin(&["commit", "--headers", "ragged.json"], cwd);
    assert!(!o.status.success());
    assert!(stdout(&o).is_empty());

    // --start alone is refused by the argument parser.
    let o = bin(&["commit", "--headers", "headers.jsonl", "--start", "32"], cwd);
    assert!(!o.status.success());
}
