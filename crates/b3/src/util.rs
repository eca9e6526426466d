//! Little-endian word conversions.

#![allow(clippy::indexing_slicing)] // Fixed-size arrays only

#[inline(always)]
pub(crate) fn words8_from_le_bytes(bytes: &[u8; 32]) -> [u32; 8] {
  let mut out = [0u32; 8];
  for (word, src) in out.iter_mut().zip(bytes.as_chunks::<4>().0) {
    *word = u32::from_le_bytes(*src);
  }
  out
}

#[inline(always)]
pub(crate) fn words16_from_le_bytes(bytes: &[u8; 64]) -> [u32; 16] {
  let mut out = [0u32; 16];
  for (word, src) in out.iter_mut().zip(bytes.as_chunks::<4>().0) {
    *word = u32::from_le_bytes(*src);
  }
  out
}

#[inline(always)]
pub(crate) fn le_bytes_from_words8(words: &[u32; 8]) -> [u8; 32] {
  let mut out = [0u8; 32];
  for (dst, word) in out.as_chunks_mut::<4>().0.iter_mut().zip(words) {
    *dst = word.to_le_bytes();
  }
  out
}

#[inline(always)]
pub(crate) fn le_bytes_from_words16(words: &[u32; 16]) -> [u8; 64] {
  let mut out = [0u8; 64];
  for (dst, word) in out.as_chunks_mut::<4>().0.iter_mut().zip(words) {
    *dst = word.to_le_bytes();
  }
  out
}

#[inline(always)]
pub(crate) fn first_8_words(words: [u32; 16]) -> [u32; 8] {
  [words[0], words[1], words[2], words[3], words[4], words[5], words[6], words[7]]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn words_are_little_endian() {
    let mut bytes = [0u8; 32];
    bytes[0] = 0x01;
    bytes[4..8].copy_from_slice(&[0x78, 0x56, 0x34, 0x12]);
    let words = words8_from_le_bytes(&bytes);
    assert_eq!(words[0], 1);
    assert_eq!(words[1], 0x1234_5678);
    assert_eq!(le_bytes_from_words8(&words), bytes);
  }

  #[test]
  fn block_words_round_trip() {
    let bytes: [u8; 64] = core::array::from_fn(|i| i as u8);
    assert_eq!(le_bytes_from_words16(&words16_from_le_bytes(&bytes)), bytes);
    assert_eq!(first_8_words(words16_from_le_bytes(&bytes))[7], u32::from_le_bytes([28, 29, 30, 31]));
  }
}
