//! Lane-parallel `hash_many`.
//!
//! `N` inputs are hashed side by side: word `i` of the state for every input
//! sits in `v[i]`, one input per lane, so each G step is an `N`-wide vector
//! operation. The loops are written over plain arrays and compiled once per
//! instruction set through `#[target_feature]`, which lets the compiler pick
//! the register width (4 lanes for SSE, 8 for AVX2, 16 for AVX-512).
//!
//! Inputs left over after the last full group go through
//! [`hash_many_serial`] with the backend's own single-block compression.

#![allow(clippy::indexing_slicing)] // Lengths are checked by Backend::hash_many
#![allow(clippy::too_many_arguments)]

use super::{compress_in_place_avx512, compress_in_place_sse2, compress_in_place_sse41};
use crate::backends::{CompressInPlaceFn, IncrementCounter};
use crate::portable::hash_many_serial;
use crate::{BLOCK_LEN, IV, MSG_SCHEDULE, OUT_LEN};

type Lanes<const N: usize> = [u32; N];

#[inline(always)]
fn g<const N: usize>(v: &mut [Lanes<N>; 16], a: usize, b: usize, c: usize, d: usize, mx: &Lanes<N>, my: &Lanes<N>) {
  for l in 0..N {
    v[a][l] = v[a][l].wrapping_add(v[b][l]).wrapping_add(mx[l]);
    v[d][l] = (v[d][l] ^ v[a][l]).rotate_right(16);
    v[c][l] = v[c][l].wrapping_add(v[d][l]);
    v[b][l] = (v[b][l] ^ v[c][l]).rotate_right(12);
    v[a][l] = v[a][l].wrapping_add(v[b][l]).wrapping_add(my[l]);
    v[d][l] = (v[d][l] ^ v[a][l]).rotate_right(8);
    v[c][l] = v[c][l].wrapping_add(v[d][l]);
    v[b][l] = (v[b][l] ^ v[c][l]).rotate_right(7);
  }
}

#[inline(always)]
fn round<const N: usize>(v: &mut [Lanes<N>; 16], m: &[Lanes<N>; 16], s: &[usize; 16]) {
  g(v, 0, 4, 8, 12, &m[s[0]], &m[s[1]]);
  g(v, 1, 5, 9, 13, &m[s[2]], &m[s[3]]);
  g(v, 2, 6, 10, 14, &m[s[4]], &m[s[5]]);
  g(v, 3, 7, 11, 15, &m[s[6]], &m[s[7]]);

  g(v, 0, 5, 10, 15, &m[s[8]], &m[s[9]]);
  g(v, 1, 6, 11, 12, &m[s[10]], &m[s[11]]);
  g(v, 2, 7, 8, 13, &m[s[12]], &m[s[13]]);
  g(v, 3, 4, 9, 14, &m[s[14]], &m[s[15]]);
}

/// Hash exactly `N` inputs.
#[inline(always)]
fn hash_group<const N: usize>(
  inputs: &[&[u8]],
  blocks: usize,
  key: &[u32; 8],
  counter: u64,
  increment: IncrementCounter,
  flags: u8,
  flags_start: u8,
  flags_end: u8,
  out: &mut [u8],
) {
  let counters: [u64; N] = core::array::from_fn(|l| counter.wrapping_add(l as u64 * increment.step()));
  let counter_lo: Lanes<N> = counters.map(|c| c as u32);
  let counter_hi: Lanes<N> = counters.map(|c| (c >> 32) as u32);

  let mut h: [Lanes<N>; 8] = core::array::from_fn(|i| [key[i]; N]);
  let mut block_flags = flags | flags_start;

  for block in 0..blocks {
    if block + 1 == blocks {
      block_flags |= flags_end;
    }

    let offset = block * BLOCK_LEN;
    let mut m = [[0u32; N]; 16];
    for (l, input) in inputs.iter().enumerate() {
      let (words, _) = input[offset..offset + BLOCK_LEN].as_chunks::<4>();
      for (w, bytes) in words.iter().enumerate() {
        m[w][l] = u32::from_le_bytes(*bytes);
      }
    }

    let mut v = [
      h[0],
      h[1],
      h[2],
      h[3],
      h[4],
      h[5],
      h[6],
      h[7],
      [IV[0]; N],
      [IV[1]; N],
      [IV[2]; N],
      [IV[3]; N],
      counter_lo,
      counter_hi,
      [BLOCK_LEN as u32; N],
      [u32::from(block_flags); N],
    ];
    for s in &MSG_SCHEDULE {
      round(&mut v, &m, s);
    }
    for i in 0..8 {
      for l in 0..N {
        h[i][l] = v[i][l] ^ v[i + 8][l];
      }
    }

    block_flags = flags;
  }

  for (l, cv_out) in out.chunks_exact_mut(OUT_LEN).take(N).enumerate() {
    for (i, dst) in cv_out.as_chunks_mut::<4>().0.iter_mut().enumerate() {
      *dst = h[i][l].to_le_bytes();
    }
  }
}

#[inline(always)]
fn hash_many_lanes<const N: usize>(
  compress: CompressInPlaceFn,
  inputs: &[&[u8]],
  blocks: usize,
  key: &[u32; 8],
  mut counter: u64,
  increment: IncrementCounter,
  flags: u8,
  flags_start: u8,
  flags_end: u8,
  out: &mut [u8],
) {
  let full = inputs.len() / N * N;
  let (grouped, rest) = inputs.split_at(full);
  let (grouped_out, rest_out) = out.split_at_mut(full * OUT_LEN);

  for (group, group_out) in grouped.chunks_exact(N).zip(grouped_out.chunks_exact_mut(N * OUT_LEN)) {
    hash_group::<N>(group, blocks, key, counter, increment, flags, flags_start, flags_end, group_out);
    counter = counter.wrapping_add(N as u64 * increment.step());
  }

  hash_many_serial(compress, rest, blocks, key, counter, increment, flags, flags_start, flags_end, rest_out);
}

macro_rules! lane_backend {
  ($name:ident, $lanes:literal, $compress:path, $features:literal) => {
    pub(crate) fn $name(
      inputs: &[&[u8]],
      blocks: usize,
      key: &[u32; 8],
      counter: u64,
      increment: IncrementCounter,
      flags: u8,
      flags_start: u8,
      flags_end: u8,
      out: &mut [u8],
    ) {
      #[target_feature(enable = $features)]
      unsafe fn imp(
        inputs: &[&[u8]],
        blocks: usize,
        key: &[u32; 8],
        counter: u64,
        increment: IncrementCounter,
        flags: u8,
        flags_start: u8,
        flags_end: u8,
        out: &mut [u8],
      ) {
        hash_many_lanes::<$lanes>($compress, inputs, blocks, key, counter, increment, flags, flags_start, flags_end, out);
      }
      // SAFETY: reachable only through a registry-approved descriptor.
      unsafe { imp(inputs, blocks, key, counter, increment, flags, flags_start, flags_end, out) }
    }
  };
}

lane_backend!(hash_many_sse2, 4, compress_in_place_sse2, "sse2");
lane_backend!(hash_many_sse41, 4, compress_in_place_sse41, "sse2,ssse3,sse4.1");
lane_backend!(hash_many_avx2, 8, compress_in_place_sse41, "sse2,ssse3,sse4.1,avx,avx2");
lane_backend!(hash_many_avx512, 16, compress_in_place_avx512, "sse2,ssse3,sse4.1,avx,avx2,avx512f,avx512vl");
