//! Deferred final compression and the extendable-output reader.

use traits::{SeekableXof, Xof};

use crate::backends::Backend;
use crate::hasher::Dispatch;
use crate::util::le_bytes_from_words8;
use crate::{BLOCK_LEN, OUT_LEN, PARENT, ROOT};

/// Inputs of a compression that has not run yet.
///
/// Whether it becomes a chaining value or root output is decided by the
/// caller: only the last compression of a message carries `ROOT`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Output {
  pub(crate) input_cv: [u32; 8],
  pub(crate) block: [u8; BLOCK_LEN],
  pub(crate) block_len: u8,
  pub(crate) counter: u64,
  pub(crate) flags: u8,
}

impl Output {
  #[inline]
  pub(crate) fn chaining_value(&self, backend: &Backend) -> [u32; 8] {
    let mut cv = self.input_cv;
    backend.compress_in_place(&mut cv, &self.block, self.block_len, self.counter, self.flags);
    cv
  }

  #[inline]
  pub(crate) fn root_hash(&self, backend: &Backend) -> [u8; OUT_LEN] {
    let mut cv = self.input_cv;
    backend.compress_in_place(&mut cv, &self.block, self.block_len, 0, self.flags | ROOT);
    le_bytes_from_words8(&cv)
  }

  /// Write root output bytes, starting `skip` bytes into output block
  /// `block_counter`.
  ///
  /// Output block `n` covers bytes `64 * n .. 64 * (n + 1)` and is the
  /// compression with counter `n`.
  pub(crate) fn fill_root(&self, backend: &Backend, mut block_counter: u64, mut skip: usize, out: &mut [u8]) {
    let flags = self.flags | ROOT;

    let mut out = out;
    while !out.is_empty() {
      let block = backend.compress_xof(&self.input_cv, &self.block, self.block_len, block_counter, flags);
      let available = block.get(skip..).unwrap_or(&[]);
      let take = available.len().min(out.len());
      let (dst, rest) = out.split_at_mut(take);
      dst.copy_from_slice(available.get(..take).unwrap_or(&[]));
      out = rest;
      block_counter = block_counter.wrapping_add(1);
      skip = 0;
    }
  }
}

/// The output of a parent node with children `left` and `right`.
#[inline]
pub(crate) fn parent_output(left: &[u32; 8], right: &[u32; 8], key: &[u32; 8], flags: u8) -> Output {
  let mut block = [0u8; BLOCK_LEN];
  let (lo, hi) = block.split_at_mut(OUT_LEN);
  lo.copy_from_slice(&le_bytes_from_words8(left));
  hi.copy_from_slice(&le_bytes_from_words8(right));
  Output { input_cv: *key, block, block_len: BLOCK_LEN as u8, counter: 0, flags: PARENT | flags }
}

/// An unbounded stream of root output bytes.
///
/// Returned by [`Hasher::finalize_xof`](crate::Hasher::finalize_xof). Reading
/// continues where the last read stopped; [`set_position`](SeekableXof::set_position)
/// jumps to any byte offset.
///
/// ```
/// use b3::{SeekableXof, Xof};
///
/// let mut reader = b3::Hasher::new().update(b"abc").finalize_xof();
/// let mut first = [0u8; 100];
/// reader.squeeze(&mut first);
/// assert_eq!(first[..32], b3::hash(b"abc"));
///
/// reader.set_position(40);
/// let mut again = [0u8; 10];
/// reader.squeeze(&mut again);
/// assert_eq!(again, first[40..50]);
/// ```
#[derive(Clone)]
pub struct OutputReader {
  output: Output,
  dispatch: Dispatch,
  position: u64,
}

impl OutputReader {
  pub(crate) fn new(output: Output, dispatch: Dispatch) -> Self {
    Self { output, dispatch, position: 0 }
  }

  /// Fill `out` and advance.
  #[inline]
  pub fn fill(&mut self, out: &mut [u8]) {
    let block_counter = self.position / BLOCK_LEN as u64;
    let skip = (self.position % BLOCK_LEN as u64) as usize;
    self.output.fill_root(self.dispatch.ops(), block_counter, skip, out);
    self.position = self.position.wrapping_add(out.len() as u64);
  }
}

impl Xof for OutputReader {
  #[inline]
  fn squeeze(&mut self, out: &mut [u8]) {
    self.fill(out);
  }
}

impl SeekableXof for OutputReader {
  #[inline]
  fn position(&self) -> u64 {
    self.position
  }

  #[inline]
  fn set_position(&mut self, position: u64) {
    self.position = position;
  }
}

impl core::fmt::Debug for OutputReader {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("OutputReader").field("position", &self.position).finish_non_exhaustive()
  }
}

#[cfg(feature = "std")]
impl std::io::Read for OutputReader {
  #[inline]
  fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
    self.fill(buf);
    Ok(buf.len())
  }
}

#[cfg(feature = "std")]
impl std::io::Seek for OutputReader {
  fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
    use std::io::{Error, ErrorKind, SeekFrom};

    let target = match pos {
      SeekFrom::Start(offset) => Some(offset),
      SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
      SeekFrom::End(_) => return Err(Error::new(ErrorKind::Unsupported, "BLAKE3 output has no end")),
    };
    let target = target.ok_or_else(|| Error::new(ErrorKind::InvalidInput, "seek before start of output"))?;
    self.position = target;
    Ok(target)
  }
}
