//! Benchmarks for NeoScrypt and its building blocks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use neoscrypt_core::blake2s::prf;
use neoscrypt_core::fastkdf::prehash;
use neoscrypt_core::{NeoScrypt, Profile};

fn bench_hash(c: &mut Criterion) {
    let hasher = NeoScrypt::new(Profile::DEFAULT).unwrap();
    let header = [0u8; 80];

    c.bench_function("neoscrypt_single", |b| b.iter(|| hasher.hash(black_box(&header))));
}

fn bench_hash_varying_nonce(c: &mut Criterion) {
    let hasher = NeoScrypt::new(Profile::DEFAULT).unwrap();

    c.bench_function("neoscrypt_varying", |b| {
        let mut header = [0u8; 80];
        let mut nonce: u32 = 0;
        b.iter(|| {
            header[76..].copy_from_slice(&nonce.to_le_bytes());
            nonce = nonce.wrapping_add(1);
            hasher.hash(black_box(&header))
        })
    });
}

fn bench_scrypt_mode(c: &mut Criterion) {
    let hasher = NeoScrypt::new(Profile::SCRYPT).unwrap();
    let header = [0u8; 80];

    c.bench_function("neoscrypt_scrypt_mode", |b| {
        b.iter(|| hasher.hash(black_box(&header)))
    });
}

fn bench_primitives(c: &mut Criterion) {
    let header = [0u8; 80];
    let key = [0u8; 32];
    let input = [0u8; 64];

    c.bench_function("fastkdf_prehash", |b| b.iter(|| prehash(black_box(&header))));
    c.bench_function("blake2s_prf", |b| {
        b.iter(|| prf(black_box(&key), black_box(&input)))
    });
}

criterion_group!(
    benches,
    bench_hash,
    bench_hash_varying_nonce,
    bench_scrypt_mode,
    bench_primitives
);
criterion_main!(benches);
