//! x86_64 SIMD backends.
//!
//! Single-block compression keeps the 4x4 state in four XMM rows and turns
//! the diagonal step into a column step by rotating rows 1-3. The variants
//! differ only in how they rotate 32-bit lanes:
//!
//! | backend | rotate by 16 / 8 | rotate by 12 / 7 |
//! |---------|------------------|------------------|
//! | sse2    | shift + or       | shift + or       |
//! | sse41   | `pshufb`         | shift + or       |
//! | avx512  | `vprord`         | `vprord`         |
//!
//! Multi-input hashing lives in [`lanes`].
//!
//! # Safety
//!
//! Every `#[target_feature]` function here is wrapped in a safe function that
//! is stored in a [`Backend`](crate::Backend). Descriptors are handed out only
//! by the registry, after the backend's required features were detected.

#![allow(unsafe_code)]
#![allow(clippy::indexing_slicing)] // Fixed-size message and schedule arrays
#![allow(clippy::many_single_char_names)]

use core::arch::x86_64::*;

mod lanes;

pub(crate) use lanes::{hash_many_avx2, hash_many_avx512, hash_many_sse2, hash_many_sse41};

use crate::util::words16_from_le_bytes;
use crate::{BLOCK_LEN, IV, MSG_SCHEDULE, OUT_LEN};

const ROT_SHIFT: u8 = 0;
const ROT_PSHUFB: u8 = 1;
const ROT_VPROR: u8 = 2;

#[inline(always)]
unsafe fn rot16<const R: u8>(x: __m128i) -> __m128i {
  match R {
    ROT_PSHUFB => _mm_shuffle_epi8(x, _mm_setr_epi8(2, 3, 0, 1, 6, 7, 4, 5, 10, 11, 8, 9, 14, 15, 12, 13)),
    ROT_VPROR => _mm_ror_epi32(x, 16),
    _ => _mm_or_si128(_mm_srli_epi32(x, 16), _mm_slli_epi32(x, 16)),
  }
}

#[inline(always)]
unsafe fn rot12<const R: u8>(x: __m128i) -> __m128i {
  match R {
    ROT_VPROR => _mm_ror_epi32(x, 12),
    _ => _mm_or_si128(_mm_srli_epi32(x, 12), _mm_slli_epi32(x, 20)),
  }
}

#[inline(always)]
unsafe fn rot8<const R: u8>(x: __m128i) -> __m128i {
  match R {
    ROT_PSHUFB => _mm_shuffle_epi8(x, _mm_setr_epi8(1, 2, 3, 0, 5, 6, 7, 4, 9, 10, 11, 8, 13, 14, 15, 12)),
    ROT_VPROR => _mm_ror_epi32(x, 8),
    _ => _mm_or_si128(_mm_srli_epi32(x, 8), _mm_slli_epi32(x, 24)),
  }
}

#[inline(always)]
unsafe fn rot7<const R: u8>(x: __m128i) -> __m128i {
  match R {
    ROT_VPROR => _mm_ror_epi32(x, 7),
    _ => _mm_or_si128(_mm_srli_epi32(x, 7), _mm_slli_epi32(x, 25)),
  }
}

/// G on all four columns at once.
#[inline(always)]
unsafe fn g<const R: u8>(rows: &mut [__m128i; 4], mx: __m128i, my: __m128i) {
  let [mut a, mut b, mut c, mut d] = *rows;
  a = _mm_add_epi32(_mm_add_epi32(a, b), mx);
  d = rot16::<R>(_mm_xor_si128(d, a));
  c = _mm_add_epi32(c, d);
  b = rot12::<R>(_mm_xor_si128(b, c));
  a = _mm_add_epi32(_mm_add_epi32(a, b), my);
  d = rot8::<R>(_mm_xor_si128(d, a));
  c = _mm_add_epi32(c, d);
  b = rot7::<R>(_mm_xor_si128(b, c));
  *rows = [a, b, c, d];
}

#[inline(always)]
unsafe fn gather(m: &[u32; 16], i0: usize, i1: usize, i2: usize, i3: usize) -> __m128i {
  _mm_setr_epi32(m[i0] as i32, m[i1] as i32, m[i2] as i32, m[i3] as i32)
}

/// The seven rounds, returning the un-finalized rows.
#[inline(always)]
unsafe fn compress_rows<const R: u8>(
  cv: &[u32; 8],
  block: &[u8; BLOCK_LEN],
  block_len: u8,
  counter: u64,
  flags: u8,
) -> [__m128i; 4] {
  let m = words16_from_le_bytes(block);
  let mut rows = [
    _mm_loadu_si128(cv.as_ptr().cast()),
    _mm_loadu_si128(cv.as_ptr().add(4).cast()),
    _mm_loadu_si128(IV.as_ptr().cast()),
    _mm_setr_epi32(counter as i32, (counter >> 32) as i32, i32::from(block_len), i32::from(flags)),
  ];

  for s in &MSG_SCHEDULE {
    g::<R>(&mut rows, gather(&m, s[0], s[2], s[4], s[6]), gather(&m, s[1], s[3], s[5], s[7]));

    // Diagonalize: lane i of each row now holds the i-th diagonal.
    rows[1] = _mm_shuffle_epi32(rows[1], 0b00_11_10_01);
    rows[2] = _mm_shuffle_epi32(rows[2], 0b01_00_11_10);
    rows[3] = _mm_shuffle_epi32(rows[3], 0b10_01_00_11);

    g::<R>(&mut rows, gather(&m, s[8], s[10], s[12], s[14]), gather(&m, s[9], s[11], s[13], s[15]));

    rows[1] = _mm_shuffle_epi32(rows[1], 0b10_01_00_11);
    rows[2] = _mm_shuffle_epi32(rows[2], 0b01_00_11_10);
    rows[3] = _mm_shuffle_epi32(rows[3], 0b00_11_10_01);
  }

  rows
}

#[inline(always)]
unsafe fn compress_in_place_rows<const R: u8>(
  cv: &mut [u32; 8],
  block: &[u8; BLOCK_LEN],
  block_len: u8,
  counter: u64,
  flags: u8,
) {
  let [row0, row1, row2, row3] = compress_rows::<R>(cv, block, block_len, counter, flags);
  _mm_storeu_si128(cv.as_mut_ptr().cast(), _mm_xor_si128(row0, row2));
  _mm_storeu_si128(cv.as_mut_ptr().add(4).cast(), _mm_xor_si128(row1, row3));
}

#[inline(always)]
unsafe fn compress_xof_rows<const R: u8>(
  cv: &[u32; 8],
  block: &[u8; BLOCK_LEN],
  block_len: u8,
  counter: u64,
  flags: u8,
) -> [u8; 2 * OUT_LEN] {
  let [row0, row1, row2, row3] = compress_rows::<R>(cv, block, block_len, counter, flags);
  let cv_lo = _mm_loadu_si128(cv.as_ptr().cast());
  let cv_hi = _mm_loadu_si128(cv.as_ptr().add(4).cast());
  let mut out = [0u8; 2 * OUT_LEN];
  _mm_storeu_si128(out.as_mut_ptr().cast(), _mm_xor_si128(row0, row2));
  _mm_storeu_si128(out.as_mut_ptr().add(16).cast(), _mm_xor_si128(row1, row3));
  _mm_storeu_si128(out.as_mut_ptr().add(32).cast(), _mm_xor_si128(row2, cv_lo));
  _mm_storeu_si128(out.as_mut_ptr().add(48).cast(), _mm_xor_si128(row3, cv_hi));
  out
}

macro_rules! row_backend {
  ($in_place:ident, $xof:ident, $rot:expr, $features:literal) => {
    pub(crate) fn $in_place(cv: &mut [u32; 8], block: &[u8; BLOCK_LEN], block_len: u8, counter: u64, flags: u8) {
      #[target_feature(enable = $features)]
      unsafe fn imp(cv: &mut [u32; 8], block: &[u8; BLOCK_LEN], block_len: u8, counter: u64, flags: u8) {
        compress_in_place_rows::<{ $rot }>(cv, block, block_len, counter, flags)
      }
      // SAFETY: reachable only through a registry-approved descriptor.
      unsafe { imp(cv, block, block_len, counter, flags) }
    }

    pub(crate) fn $xof(
      cv: &[u32; 8],
      block: &[u8; BLOCK_LEN],
      block_len: u8,
      counter: u64,
      flags: u8,
    ) -> [u8; 2 * OUT_LEN] {
      #[target_feature(enable = $features)]
      unsafe fn imp(cv: &[u32; 8], block: &[u8; BLOCK_LEN], block_len: u8, counter: u64, flags: u8) -> [u8; 2 * OUT_LEN] {
        compress_xof_rows::<{ $rot }>(cv, block, block_len, counter, flags)
      }
      // SAFETY: reachable only through a registry-approved descriptor.
      unsafe { imp(cv, block, block_len, counter, flags) }
    }
  };
}

row_backend!(compress_in_place_sse2, compress_xof_sse2, ROT_SHIFT, "sse2");
row_backend!(compress_in_place_sse41, compress_xof_sse41, ROT_PSHUFB, "sse2,ssse3,sse4.1");
row_backend!(compress_in_place_avx512, compress_xof_avx512, ROT_VPROR, "sse2,ssse3,sse4.1,avx2,avx512f,avx512vl");
