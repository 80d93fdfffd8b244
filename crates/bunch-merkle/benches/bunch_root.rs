use bunch_core::Digest;
use bunch_crypto::{Blake3Hasher, Keccak256Hasher};
use bunch_merkle::{compute_root, generate_proof, verify, BunchTree};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

#[inline]
fn det_leaves(n: usize, seed: u64) -> Vec<Digest> {
    let mut a = 1664525u64.wrapping_mul(seed).wrapping_add(1013904223);
    (0..n)
        .map(|i| {
            a = a.wrapping_mul(1664525).wrapping_add(1013904223);
            let mut out = [0u8; 32];
            for (j, chunk) in out.chunks_exact_mut(8).enumerate() {
                let w = a ^ (i as u64 + j as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                chunk.copy_from_slice(&w.to_le_bytes());
            }
            Digest(out)
        })
        .collect()
}

fn bench_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("bunch_root");
    for &k in &[10u32, 14u32] {
        let n = 1usize << k;
        group.throughput(Throughput::Elements(n as u64));
        let leaves = det_leaves(n, 2024);

        group.bench_function(BenchmarkId::new("keccak256", format!("2^{k}")), |b| {
            b.iter(|| black_box(compute_root::<Keccak256Hasher>(black_box(&leaves))))
        });
        group.bench_function(BenchmarkId::new("blake3", format!("2^{k}")), |b| {
            b.iter(|| black_box(compute_root::<Blake3Hasher>(black_box(&leaves))))
        });
    }
    group.finish();
}

fn bench_proofs(c: &mut Criterion) {
    let mut group = c.benchmark_group("bunch_proof");
    let k = 12u32;
    let leaves = det_leaves(1 << k, 7);
    let root = compute_root::<Keccak256Hasher>(&leaves).unwrap_or_default();
    let idx = (leaves.len() / 3) as u64;

    group.bench_function(BenchmarkId::new("generate_proof", format!("2^{k}")), |b| {
        b.iter(|| black_box(generate_proof::<Keccak256Hasher>(black_box(&leaves), idx)))
    });

    // Materialized tree: one build, then lookups only.
    if let Ok(tree) = BunchTree::<Keccak256Hasher>::build(&leaves) {
        group.bench_function(BenchmarkId::new("tree_open", format!("2^{k}")), |b| {
            b.iter(|| black_box(tree.open(black_box(idx))))
        });
    }

    if let Ok(proof) = generate_proof::<Keccak256Hasher>(&leaves, idx) {
        let leaf = leaves[idx as usize];
        group.bench_function(BenchmarkId::new("verify", format!("2^{k}")), |b| {
            b.iter(|| black_box(verify::<Keccak256Hasher>(&root, &leaf, idx, black_box(&proof))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_root, bench_proofs);
criterion_main!(benches);
