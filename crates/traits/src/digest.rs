//! Cryptographic digest trait.

use core::fmt::Debug;

/// Streaming hash with a fixed-size output.
///
/// `finalize` takes `&self`: it can be called repeatedly, and further
/// `update`s continue from the same state.
pub trait Digest: Clone + Default {
  /// Output size in bytes.
  const OUTPUT_SIZE: usize;

  type Output: Copy + Eq + Debug;

  #[must_use]
  fn new() -> Self;

  fn update(&mut self, data: &[u8]);

  #[inline]
  fn update_vectored(&mut self, bufs: &[&[u8]]) {
    for buf in bufs {
      self.update(buf);
    }
  }

  #[must_use]
  fn finalize(&self) -> Self::Output;

  fn reset(&mut self);

  #[inline]
  #[must_use]
  fn digest(data: &[u8]) -> Self::Output {
    let mut h = Self::new();
    h.update(data);
    h.finalize()
  }

  #[cfg(feature = "std")]
  #[inline]
  #[must_use]
  fn reader<R>(inner: R) -> crate::io::DigestReader<R, Self>
  where
    Self: Sized,
  {
    crate::io::DigestReader::new(inner)
  }

  #[cfg(feature = "std")]
  #[inline]
  #[must_use]
  fn writer<W>(inner: W) -> crate::io::DigestWriter<W, Self>
  where
    Self: Sized,
  {
    crate::io::DigestWriter::new(inner)
  }
}
