//! Portable scalar backend.
//!
//! Also hosts [`hash_many_serial`], the one-input-at-a-time loop every SIMD
//! backend falls back to for inputs that do not fill a full lane group.

#![allow(clippy::indexing_slicing)] // Fixed-size arrays + internal block parsing

use crate::backends::{CompressInPlaceFn, IncrementCounter};
use crate::util::{first_8_words, le_bytes_from_words8, le_bytes_from_words16, words16_from_le_bytes};
use crate::{BLOCK_LEN, IV, OUT_LEN};

#[inline]
pub(crate) fn compress(cv: &[u32; 8], block_words: &[u32; 16], counter: u64, block_len: u32, flags: u32) -> [u32; 16] {
  let [m0, m1, m2, m3, m4, m5, m6, m7, m8, m9, m10, m11, m12, m13, m14, m15] = *block_words;

  let mut v0 = cv[0];
  let mut v1 = cv[1];
  let mut v2 = cv[2];
  let mut v3 = cv[3];
  let mut v4 = cv[4];
  let mut v5 = cv[5];
  let mut v6 = cv[6];
  let mut v7 = cv[7];
  let mut v8 = IV[0];
  let mut v9 = IV[1];
  let mut v10 = IV[2];
  let mut v11 = IV[3];
  let mut v12 = counter as u32;
  let mut v13 = (counter >> 32) as u32;
  let mut v14 = block_len;
  let mut v15 = flags;

  macro_rules! g {
    ($a:ident, $b:ident, $c:ident, $d:ident, $mx:expr, $my:expr) => {{
      $a = $a.wrapping_add($b).wrapping_add($mx);
      $d = ($d ^ $a).rotate_right(16);
      $c = $c.wrapping_add($d);
      $b = ($b ^ $c).rotate_right(12);
      $a = $a.wrapping_add($b).wrapping_add($my);
      $d = ($d ^ $a).rotate_right(8);
      $c = $c.wrapping_add($d);
      $b = ($b ^ $c).rotate_right(7);
    }};
  }

  // Schedule spelled out per round so the state stays in registers.
  macro_rules! round {
    (
      $m0:expr, $m1:expr, $m2:expr, $m3:expr, $m4:expr, $m5:expr, $m6:expr, $m7:expr,
      $m8:expr, $m9:expr, $m10:expr, $m11:expr, $m12:expr, $m13:expr, $m14:expr, $m15:expr
    ) => {{
      g!(v0, v4, v8, v12, $m0, $m1);
      g!(v1, v5, v9, v13, $m2, $m3);
      g!(v2, v6, v10, v14, $m4, $m5);
      g!(v3, v7, v11, v15, $m6, $m7);

      g!(v0, v5, v10, v15, $m8, $m9);
      g!(v1, v6, v11, v12, $m10, $m11);
      g!(v2, v7, v8, v13, $m12, $m13);
      g!(v3, v4, v9, v14, $m14, $m15);
    }};
  }

  round!(m0, m1, m2, m3, m4, m5, m6, m7, m8, m9, m10, m11, m12, m13, m14, m15);
  round!(m2, m6, m3, m10, m7, m0, m4, m13, m1, m11, m12, m5, m9, m14, m15, m8);
  round!(m3, m4, m10, m12, m13, m2, m7, m14, m6, m5, m9, m0, m11, m15, m8, m1);
  round!(m10, m7, m12, m9, m14, m3, m13, m15, m4, m0, m11, m2, m5, m8, m1, m6);
  round!(m12, m13, m9, m11, m15, m10, m14, m8, m7, m2, m5, m3, m0, m1, m6, m4);
  round!(m9, m14, m11, m5, m8, m12, m15, m1, m13, m3, m0, m10, m2, m6, m4, m7);
  round!(m11, m15, m5, m0, m1, m9, m8, m6, m14, m10, m2, m12, m3, m4, m7, m13);

  [
    v0 ^ v8,
    v1 ^ v9,
    v2 ^ v10,
    v3 ^ v11,
    v4 ^ v12,
    v5 ^ v13,
    v6 ^ v14,
    v7 ^ v15,
    v8 ^ cv[0],
    v9 ^ cv[1],
    v10 ^ cv[2],
    v11 ^ cv[3],
    v12 ^ cv[4],
    v13 ^ cv[5],
    v14 ^ cv[6],
    v15 ^ cv[7],
  ]
}

pub(crate) fn compress_in_place(cv: &mut [u32; 8], block: &[u8; BLOCK_LEN], block_len: u8, counter: u64, flags: u8) {
  let state = compress(cv, &words16_from_le_bytes(block), counter, u32::from(block_len), u32::from(flags));
  *cv = first_8_words(state);
}

pub(crate) fn compress_xof(
  cv: &[u32; 8],
  block: &[u8; BLOCK_LEN],
  block_len: u8,
  counter: u64,
  flags: u8,
) -> [u8; 2 * OUT_LEN] {
  le_bytes_from_words16(&compress(cv, &words16_from_le_bytes(block), counter, u32::from(block_len), u32::from(flags)))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn hash_many(
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
  hash_many_serial(compress_in_place, inputs, blocks, key, counter, increment, flags, flags_start, flags_end, out);
}

/// `hash_many` as a plain loop over `compress`.
#[allow(clippy::too_many_arguments)]
#[inline(always)]
pub(crate) fn hash_many_serial(
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
  for (input, cv_out) in inputs.iter().zip(out.chunks_exact_mut(OUT_LEN)) {
    let mut cv = *key;
    let mut block_flags = flags | flags_start;
    let (block_list, _) = input.as_chunks::<BLOCK_LEN>();
    for (index, block) in block_list.iter().take(blocks).enumerate() {
      if index + 1 == blocks {
        block_flags |= flags_end;
      }
      compress(&mut cv, block, BLOCK_LEN as u8, counter, block_flags);
      block_flags = flags;
    }
    cv_out.copy_from_slice(&le_bytes_from_words8(&cv));
    counter = counter.wrapping_add(increment.step());
  }
}
