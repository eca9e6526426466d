//! Per-backend BLAKE3 benchmarks.
//!
//! Every supported backend runs through a pinned hasher, next to the
//! selector-dispatched hasher and the official `blake3` crate.

use core::{hint::black_box, time::Duration};

use b3::{Backend, Hasher};
use criterion::{BenchmarkId, Criterion, SamplingMode, Throughput, criterion_group, criterion_main};

/// Deterministic filler so inputs are not all zeros.
#[inline]
fn xorshift64star(state: &mut u64) -> u64 {
  let mut x = *state;
  x ^= x >> 12;
  x ^= x << 25;
  x ^= x >> 27;
  *state = x;
  x.wrapping_mul(0x2545_F491_4F6C_DD1D)
}

fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
  let mut state = seed ^ (len as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
  let mut out = vec![0u8; len];
  for b in &mut out {
    *b = (xorshift64star(&mut state) >> 56) as u8;
  }
  black_box(&out);
  out
}

const SIZES: [usize; 9] = [64, 1024, 1025, 4 * 1024, 16 * 1024, 64 * 1024, 256 * 1024, 1024 * 1024, 4 << 20];

fn backends() -> Vec<&'static Backend> {
  b3::supported_backends().map(|(_, backend)| backend).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot per backend
// ─────────────────────────────────────────────────────────────────────────────

fn oneshot(c: &mut Criterion) {
  let mut group = c.benchmark_group("b3/oneshot");
  group.sample_size(30);
  group.warm_up_time(Duration::from_secs(1));
  group.measurement_time(Duration::from_secs(3));
  group.sampling_mode(SamplingMode::Flat);

  for len in SIZES {
    let data = pseudo_random_bytes(len, 0xB3B3_0001);
    group.throughput(Throughput::Bytes(len as u64));

    for backend in backends() {
      group.bench_with_input(BenchmarkId::new(backend.name(), len), &data, |b, d| {
        b.iter(|| {
          let mut hasher = Hasher::new().with_backend(backend);
          hasher.update(black_box(d));
          black_box(hasher.finalize())
        })
      });
    }

    group.bench_with_input(BenchmarkId::new("selected", len), &data, |b, d| {
      b.iter(|| black_box(b3::hash(black_box(d))))
    });

    group.bench_with_input(BenchmarkId::new("official", len), &data, |b, d| {
      b.iter(|| black_box(*blake3::hash(black_box(d)).as_bytes()))
    });
  }

  group.finish();
}

// ─────────────────────────────────────────────────────────────────────────────
// Streaming overhead
// ─────────────────────────────────────────────────────────────────────────────

fn streaming(c: &mut Criterion) {
  let data = pseudo_random_bytes(1024 * 1024, 0xB3B3_0002);
  let mut group = c.benchmark_group("b3/streaming");
  group.sample_size(20);
  group.throughput(Throughput::Bytes(data.len() as u64));

  for piece in [64, 1024, 16 * 1024, 64 * 1024] {
    group.bench_function(format!("selected/{piece}B-updates"), |b| {
      b.iter(|| {
        let mut hasher = Hasher::new();
        for chunk in data.chunks(piece) {
          hasher.update(chunk);
        }
        black_box(hasher.finalize())
      })
    });
  }

  group.finish();
}

// ─────────────────────────────────────────────────────────────────────────────
// Extended output
// ─────────────────────────────────────────────────────────────────────────────

fn xof(c: &mut Criterion) {
  let mut group = c.benchmark_group("b3/xof");
  let hasher = Hasher::new().update(b"extended output benchmark").clone();

  for len in [64usize, 1024, 16 * 1024] {
    group.throughput(Throughput::Bytes(len as u64));
    let mut out = vec![0u8; len];
    group.bench_function(BenchmarkId::new("finalize_seek", len), |b| {
      b.iter(|| {
        hasher.finalize_seek_into(black_box(0), &mut out);
        black_box(&out);
      })
    });
  }

  group.finish();
}

criterion_group!(benches, oneshot, streaming, xof);
criterion_main!(benches);
