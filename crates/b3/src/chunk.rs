//! Single-chunk accumulator.

use crate::backends::Backend;
use crate::output::Output;
use crate::{BLOCK_LEN, CHUNK_END, CHUNK_LEN, CHUNK_START};

/// State of the chunk currently being filled.
///
/// A full block is compressed only once more input arrives, so the final
/// block of a chunk is always still buffered when [`output`](Self::output)
/// runs and can carry `CHUNK_END`.
#[derive(Clone)]
pub(crate) struct ChunkState {
  chaining_value: [u32; 8],
  chunk_counter: u64,
  block: [u8; BLOCK_LEN],
  block_len: u8,
  blocks_compressed: u8,
  flags: u8,
}

impl ChunkState {
  #[inline]
  pub(crate) fn new(key: &[u32; 8], chunk_counter: u64, flags: u8) -> Self {
    Self {
      chaining_value: *key,
      chunk_counter,
      block: [0; BLOCK_LEN],
      block_len: 0,
      blocks_compressed: 0,
      flags,
    }
  }

  /// Start chunk `chunk_counter` from `key`, keeping the flags.
  #[inline]
  pub(crate) fn reset(&mut self, key: &[u32; 8], chunk_counter: u64) {
    *self = Self::new(key, chunk_counter, self.flags);
  }

  /// Bytes absorbed into this chunk.
  #[inline]
  pub(crate) fn len(&self) -> usize {
    BLOCK_LEN * usize::from(self.blocks_compressed) + usize::from(self.block_len)
  }

  #[inline]
  pub(crate) fn counter(&self) -> u64 {
    self.chunk_counter
  }

  #[inline]
  fn start_flag(&self) -> u8 {
    if self.blocks_compressed == 0 { CHUNK_START } else { 0 }
  }

  /// Copy as much of `input` as fits into the block buffer.
  #[inline]
  fn fill_block<'a>(&mut self, input: &'a [u8]) -> &'a [u8] {
    let start = usize::from(self.block_len);
    let take = (BLOCK_LEN - start).min(input.len());
    let (head, rest) = input.split_at(take);
    if let Some(dst) = self.block.get_mut(start..start + take) {
      dst.copy_from_slice(head);
    }
    self.block_len += take as u8;
    rest
  }

  #[inline]
  fn compress_block(&mut self, backend: &Backend, block: &[u8; BLOCK_LEN]) {
    let flags = self.flags | self.start_flag();
    backend.compress_in_place(&mut self.chaining_value, block, BLOCK_LEN as u8, self.chunk_counter, flags);
    self.blocks_compressed += 1;
  }

  /// Absorb `input`. The caller never passes more than the chunk has room
  /// for.
  pub(crate) fn update(&mut self, backend: &Backend, mut input: &[u8]) {
    debug_assert!(self.len() + input.len() <= CHUNK_LEN, "chunk overflow");

    if self.block_len > 0 {
      input = self.fill_block(input);
      if input.is_empty() {
        return;
      }
      let block = self.block;
      self.compress_block(backend, &block);
      self.block_len = 0;
    }

    // Whole blocks straight from the caller, keeping the last one buffered.
    while input.len() > BLOCK_LEN {
      let Some((block, rest)) = input.split_first_chunk::<BLOCK_LEN>() else { break };
      self.compress_block(backend, block);
      input = rest;
    }

    self.block = [0; BLOCK_LEN];
    input = self.fill_block(input);
    debug_assert!(input.is_empty());
  }

  /// The chunk's final compression, not yet performed.
  #[inline]
  pub(crate) fn output(&self) -> Output {
    Output {
      input_cv: self.chaining_value,
      block: self.block,
      block_len: self.block_len,
      counter: self.chunk_counter,
      flags: self.flags | self.start_flag() | CHUNK_END,
    }
  }
}

impl core::fmt::Debug for ChunkState {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ChunkState")
      .field("chunk_counter", &self.chunk_counter)
      .field("len", &self.len())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{BackendId, IV, ROOT};

  fn generic() -> &'static Backend {
    BackendId::Generic.backend().unwrap()
  }

  #[test]
  fn empty_chunk_is_the_empty_hash() {
    let chunk = ChunkState::new(&IV, 0, 0);
    assert_eq!(chunk.len(), 0);
    let output = chunk.output();
    assert_eq!(output.flags, CHUNK_START | CHUNK_END);
    assert_eq!(output.root_hash(generic())[..4], [0xaf, 0x13, 0x49, 0xb9]);
  }

  #[test]
  fn split_points_do_not_matter() {
    let input: [u8; CHUNK_LEN] = core::array::from_fn(|i| (i % 251) as u8);
    let mut whole = ChunkState::new(&IV, 3, 0);
    whole.update(generic(), &input);
    assert_eq!(whole.len(), CHUNK_LEN);

    for split in [1, 63, 64, 65, 128, 500, 1023] {
      let mut pieces = ChunkState::new(&IV, 3, 0);
      let (a, b) = input.split_at(split);
      pieces.update(generic(), a);
      pieces.update(generic(), b);
      assert_eq!(pieces.output().chaining_value(generic()), whole.output().chaining_value(generic()), "{split}");
    }
  }

  #[test]
  fn block_boundary_keeps_last_block_buffered() {
    let mut chunk = ChunkState::new(&IV, 0, 0);
    chunk.update(generic(), &[7u8; BLOCK_LEN]);
    let output = chunk.output();
    assert_eq!(output.block_len as usize, BLOCK_LEN);
    assert_eq!(output.flags & CHUNK_START, CHUNK_START);
    assert_eq!(output.flags & ROOT, 0);
  }

  #[test]
  fn reset_keeps_flags() {
    let mut chunk = ChunkState::new(&IV, 0, crate::KEYED_HASH);
    chunk.update(generic(), b"abc");
    chunk.reset(&IV, 9);
    assert_eq!(chunk.len(), 0);
    assert_eq!(chunk.counter(), 9);
    assert_eq!(chunk.output().flags, crate::KEYED_HASH | CHUNK_START | CHUNK_END);
  }
}
