// Threshold vault benchmarks.
//
// Covers GF(256) multiplication, key splitting and reconstruction at
// several committee sizes, and full document seal/open at several document
// sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use threshold_vault::crypto::gf256;
use threshold_vault::sharing::{combine, split, VaultParameters};
use threshold_vault::{FileMeta, ThresholdVault};

fn bench_field_mul(c: &mut Criterion) {
    c.bench_function("gf256/mul_all_pairs", |b| {
        b.iter(|| {
            let mut acc = 0u8;
            for x in 0..=255u8 {
                for y in 0..=255u8 {
                    acc ^= gf256::mul(black_box(x), black_box(y));
                }
            }
            acc
        });
    });
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("shamir/split_32b");
    let secret = [0x42u8; 32];

    for (n, t) in [(3u16, 2u16), (5, 3), (20, 10), (255, 128)] {
        let params = VaultParameters::new(n, t).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{t}-of-{n}")), &params, |b, params| {
            b.iter(|| split(&secret, params, &mut rng).unwrap());
        });
    }

    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("shamir/combine_32b");
    let secret = [0x42u8; 32];

    for (n, t) in [(3u16, 2u16), (5, 3), (20, 10), (255, 128)] {
        let params = VaultParameters::new(n, t).unwrap();
        let shares = split(&secret, &params, &mut StdRng::seed_from_u64(2)).unwrap();
        let subset = shares[..t as usize].to_vec();

        group.throughput(Throughput::Elements(t as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{t}-of-{n}")), &subset, |b, subset| {
            b.iter(|| combine(subset, Some(t as u8)).unwrap());
        });
    }

    group.finish();
}

fn bench_seal_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("vault/seal");
    let vault = ThresholdVault::default();
    let params = VaultParameters::new(3, 2).unwrap();

    for size in [1024usize, 24_576, 1 << 20] {
        let doc = vec![0xA5u8; size];
        let mut rng = StdRng::seed_from_u64(3);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| {
                vault
                    .seal_document(doc, FileMeta::new("bench.bin", doc.len() as u64), params, &mut rng)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_open_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("vault/open");
    let vault = ThresholdVault::default();
    let params = VaultParameters::new(3, 2).unwrap();

    for size in [1024usize, 24_576, 1 << 20] {
        let doc = vec![0xA5u8; size];
        let record = vault
            .seal_document(&doc, FileMeta::new("bench.bin", size as u64), params, &mut StdRng::seed_from_u64(4))
            .unwrap();
        let tokens = vec![record.share_tokens[0].clone(), record.share_tokens[2].clone()];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tokens, |b, tokens| {
            b.iter(|| vault.open_record(&record, tokens).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_field_mul,
    bench_split,
    bench_combine,
    bench_seal_document,
    bench_open_document,
);
criterion_main!(benches);
