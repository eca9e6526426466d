//! Incremental tree hasher.
//!
//! Input is split into 1 KiB chunks, the leaves of a binary tree. Finished
//! chunk chaining values go onto a stack of subtree roots that is merged
//! lazily: after `n` chunks the stack holds one entry per set bit of `n`, so
//! a parent node is compressed only once it is certain not to be the root.

use alloc::vec;
use alloc::vec::Vec;

use crate::backends::{Backend, IncrementCounter};
use crate::chunk::ChunkState;
use crate::error::Error;
use crate::output::{Output, OutputReader, parent_output};
use crate::select::BackendSelector;
use crate::util::words8_from_le_bytes;
use crate::{
  BLOCK_LEN, CHUNK_END, CHUNK_LEN, CHUNK_START, DERIVE_KEY_CONTEXT, DERIVE_KEY_MATERIAL, IV, KEY_LEN, KEYED_HASH,
  MAX_DEPTH, MAX_SIMD_DEGREE, OUT_LEN,
};

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Where a [`Hasher`] gets its backend from.
#[derive(Clone, Copy, Debug)]
pub enum Dispatch {
  /// Ask the selector on every `update` and `finalize`.
  Selector(&'static BackendSelector),
  /// Always use this backend.
  Pinned(&'static Backend),
}

impl Dispatch {
  /// The backend for one operation.
  #[inline]
  #[must_use]
  pub fn ops(&self) -> &'static Backend {
    match self {
      Self::Selector(selector) => selector.dispatch_ops(),
      Self::Pinned(backend) => backend,
    }
  }
}

impl Default for Dispatch {
  /// The process-wide selector.
  #[inline]
  fn default() -> Self {
    Self::Selector(crate::selector())
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subtree stack
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct CvStack {
  entries: [[u32; 8]; MAX_DEPTH + 1],
  len: u8,
}

impl CvStack {
  const fn new() -> Self {
    Self { entries: [[0; 8]; MAX_DEPTH + 1], len: 0 }
  }

  #[inline]
  fn len(&self) -> usize {
    usize::from(self.len)
  }

  #[inline]
  fn push(&mut self, cv: [u32; 8]) {
    // A 64-bit byte count never needs more than MAX_DEPTH + 1 entries.
    let len = self.len();
    if let Some(slot) = self.entries.get_mut(len) {
      *slot = cv;
      self.len += 1;
    }
  }

  #[inline]
  fn pop(&mut self) -> Option<[u32; 8]> {
    let top = self.len().checked_sub(1)?;
    self.len -= 1;
    self.entries.get(top).copied()
  }

  /// Entries from the top of the stack down.
  #[inline]
  fn iter_rev(&self) -> impl Iterator<Item = &[u32; 8]> {
    self.entries.get(..self.len()).unwrap_or(&[]).iter().rev()
  }

  #[inline]
  fn clear(&mut self) {
    self.len = 0;
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hasher
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming BLAKE3 hasher.
///
/// Finalizing never consumes or changes the hasher: more input can follow
/// and later finalizations cover all of it.
///
/// ```
/// let mut hasher = b3::Hasher::new();
/// hasher.update(b"foo").update(b"bar");
/// assert_eq!(hasher.finalize(), b3::hash(b"foobar"));
/// assert_eq!(hasher.count(), 6);
/// ```
#[derive(Clone)]
pub struct Hasher {
  key: [u32; 8],
  chunk: ChunkState,
  stack: CvStack,
  flags: u8,
  dispatch: Dispatch,
}

impl Hasher {
  fn new_internal(key: [u32; 8], flags: u8) -> Self {
    Self { key, chunk: ChunkState::new(&key, 0, flags), stack: CvStack::new(), flags, dispatch: Dispatch::default() }
  }

  /// Plain hashing.
  #[must_use]
  pub fn new() -> Self {
    Self::new_internal(IV, 0)
  }

  /// Keyed hashing (MAC mode).
  #[must_use]
  pub fn new_keyed(key: &[u8; KEY_LEN]) -> Self {
    Self::new_internal(words8_from_le_bytes(key), KEYED_HASH)
  }

  /// Keyed hashing with a key of unchecked length.
  ///
  /// # Errors
  ///
  /// [`Error::InvalidKeyLength`] unless `key` is exactly
  /// [`KEY_LEN`] bytes.
  pub fn init_keyed(key: &[u8]) -> Result<Self, Error> {
    let key: &[u8; KEY_LEN] = key.try_into().map_err(|_| Error::InvalidKeyLength(key.len()))?;
    Ok(Self::new_keyed(key))
  }

  /// Key derivation: hash `context` into a key, then hash key material
  /// under it.
  ///
  /// `context` should be hardcoded and globally unique.
  #[must_use]
  pub fn new_derive_key(context: &str) -> Self {
    let mut context_hasher = Self::new_internal(IV, DERIVE_KEY_CONTEXT);
    context_hasher.update(context.as_bytes());
    let context_key = context_hasher.finalize();
    Self::new_internal(words8_from_le_bytes(&context_key), DERIVE_KEY_MATERIAL)
  }

  /// Use `dispatch` for all further operations.
  #[must_use]
  pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
    self.dispatch = dispatch;
    self
  }

  /// Pin this hasher to one backend, bypassing the selector.
  #[must_use]
  pub fn with_backend(self, backend: &'static Backend) -> Self {
    self.with_dispatch(Dispatch::Pinned(backend))
  }

  #[inline]
  #[must_use]
  pub fn dispatch(&self) -> Dispatch {
    self.dispatch
  }

  /// Total bytes absorbed so far.
  #[inline]
  #[must_use]
  pub fn count(&self) -> u64 {
    self.chunk.counter() * CHUNK_LEN as u64 + self.chunk.len() as u64
  }

  /// Forget all input, keeping the key, mode and dispatch.
  pub fn reset(&mut self) -> &mut Self {
    self.chunk = ChunkState::new(&self.key, 0, self.flags);
    self.stack.clear();
    self
  }

  /// Merge subtrees until one entry per set bit of `total_chunks` is left.
  fn merge_stack(&mut self, backend: &Backend, total_chunks: u64) {
    let post_merge = total_chunks.count_ones() as usize;
    while self.stack.len() > post_merge {
      let (Some(right), Some(left)) = (self.stack.pop(), self.stack.pop()) else { break };
      let parent = parent_output(&left, &right, &self.key, self.flags);
      self.stack.push(parent.chaining_value(backend));
    }
  }

  /// Push the chaining value of chunk number `chunk_counter`.
  #[inline]
  fn push_cv(&mut self, backend: &Backend, cv: [u32; 8], chunk_counter: u64) {
    self.merge_stack(backend, chunk_counter);
    self.stack.push(cv);
  }

  /// Absorb more input.
  pub fn update(&mut self, input: &[u8]) -> &mut Self {
    let backend = self.dispatch.ops();
    self.update_with(backend, input);
    self
  }

  fn update_with(&mut self, backend: &Backend, mut input: &[u8]) {
    // Finish a partial chunk first; retire it only if more input follows.
    if self.chunk.len() > 0 {
      let take = (CHUNK_LEN - self.chunk.len()).min(input.len());
      let (head, rest) = input.split_at(take);
      self.chunk.update(backend, head);
      input = rest;
      if input.is_empty() {
        return;
      }
      let cv = self.chunk.output().chaining_value(backend);
      let counter = self.chunk.counter();
      self.push_cv(backend, cv, counter);
      self.chunk.reset(&self.key, counter + 1);
    }

    // Whole chunks that are not the last one go through hash_many in
    // batches of the backend's degree.
    let degree = backend.degree().clamp(1, MAX_SIMD_DEGREE);
    while input.len() > CHUNK_LEN {
      let base = self.chunk.counter();
      let batch = ((input.len() - 1) / CHUNK_LEN).min(degree);

      let mut chunks: [&[u8]; MAX_SIMD_DEGREE] = [&[]; MAX_SIMD_DEGREE];
      for (slot, chunk) in chunks.iter_mut().zip(input.chunks_exact(CHUNK_LEN)).take(batch) {
        *slot = chunk;
      }
      let mut cvs = [0u8; MAX_SIMD_DEGREE * OUT_LEN];
      backend.hash_many(
        chunks.get(..batch).unwrap_or(&[]),
        CHUNK_LEN / BLOCK_LEN,
        &self.key,
        base,
        IncrementCounter::Yes,
        self.flags,
        CHUNK_START,
        CHUNK_END,
        &mut cvs,
      );

      for (offset, cv) in (0u64..).zip(cvs.as_chunks::<OUT_LEN>().0.iter().take(batch)) {
        self.push_cv(backend, words8_from_le_bytes(cv), base + offset);
      }
      self.chunk.reset(&self.key, base + batch as u64);
      input = input.split_at(batch * CHUNK_LEN).1;
    }

    // 1..=CHUNK_LEN bytes left, or nothing at all.
    self.chunk.update(backend, input);
    self.merge_stack(backend, self.chunk.counter());
  }

  /// The root node, not yet compressed.
  fn root_output(&self, backend: &Backend) -> Output {
    let mut parents = self.stack.iter_rev();
    let mut output = if self.chunk.len() > 0 || self.stack.len() < 2 {
      self.chunk.output()
    } else {
      // The chunk holds nothing; the top two subtrees form the last parent.
      match (parents.next(), parents.next()) {
        (Some(right), Some(left)) => parent_output(left, right, &self.key, self.flags),
        _ => self.chunk.output(),
      }
    };
    for left in parents {
      output = parent_output(left, &output.chaining_value(backend), &self.key, self.flags);
    }
    output
  }

  /// The 32-byte hash of everything absorbed so far.
  #[must_use]
  pub fn finalize(&self) -> [u8; OUT_LEN] {
    let backend = self.dispatch.ops();
    self.root_output(backend).root_hash(backend)
  }

  /// `out_len` bytes of extended output, starting at 64-byte output block
  /// `seek_block`.
  #[must_use]
  pub fn finalize_seek(&self, seek_block: u64, out_len: usize) -> Vec<u8> {
    let mut out = vec![0u8; out_len];
    self.finalize_seek_into(seek_block, &mut out);
    out
  }

  /// Fill `out` with extended output starting at output block `seek_block`.
  pub fn finalize_seek_into(&self, seek_block: u64, out: &mut [u8]) {
    let backend = self.dispatch.ops();
    self.root_output(backend).fill_root(backend, seek_block, 0, out);
  }

  /// An [`OutputReader`] over the unbounded output stream.
  #[must_use]
  pub fn finalize_xof(&self) -> OutputReader {
    OutputReader::new(self.root_output(self.dispatch.ops()), self.dispatch)
  }
}

impl Default for Hasher {
  fn default() -> Self {
    Self::new()
  }
}

impl traits::Digest for Hasher {
  const OUTPUT_SIZE: usize = OUT_LEN;
  type Output = [u8; OUT_LEN];

  #[inline]
  fn new() -> Self {
    Hasher::new()
  }

  #[inline]
  fn update(&mut self, data: &[u8]) {
    Hasher::update(self, data);
  }

  #[inline]
  fn finalize(&self) -> Self::Output {
    Hasher::finalize(self)
  }

  #[inline]
  fn reset(&mut self) {
    Hasher::reset(self);
  }
}

impl core::fmt::Debug for Hasher {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Hasher")
      .field("flags", &self.flags)
      .field("count", &self.count())
      .field("stack_depth", &self.stack.len())
      .field("dispatch", &self.dispatch)
      .finish_non_exhaustive()
  }
}
