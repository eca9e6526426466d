//! `std::io` adapters that hash everything passing through them.
//!
//! ```
//! # use traits::Digest;
//! # #[derive(Clone, Default)]
//! # struct Sum(u32);
//! # impl Digest for Sum {
//! #   const OUTPUT_SIZE: usize = 4;
//! #   type Output = u32;
//! #   fn new() -> Self { Self(0) }
//! #   fn update(&mut self, data: &[u8]) {
//! #     self.0 = data.iter().fold(self.0, |acc, &b| acc.wrapping_add(u32::from(b)));
//! #   }
//! #   fn finalize(&self) -> Self::Output { self.0 }
//! #   fn reset(&mut self) { self.0 = 0; }
//! # }
//! use std::io::Cursor;
//!
//! let mut reader = Sum::reader(Cursor::new(b"abc".to_vec()));
//! std::io::copy(&mut reader, &mut std::io::sink())?;
//! assert_eq!(reader.digest(), u32::from(b'a') + u32::from(b'b') + u32::from(b'c'));
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, IoSlice, IoSliceMut, Read, Write};

use crate::Digest;

/// Hashes bytes as they are read from `inner`.
#[derive(Clone, Debug)]
pub struct DigestReader<R, D> {
  inner: R,
  hasher: D,
}

impl<R, D: Digest> DigestReader<R, D> {
  #[inline]
  #[must_use]
  pub fn new(inner: R) -> Self {
    Self::with_hasher(inner, D::new())
  }

  /// Start from an already-configured hasher (e.g. a keyed one).
  #[inline]
  #[must_use]
  pub fn with_hasher(inner: R, hasher: D) -> Self {
    Self { inner, hasher }
  }

  #[inline]
  #[must_use]
  pub fn digest(&self) -> D::Output {
    self.hasher.finalize()
  }

  #[inline]
  pub fn hasher(&self) -> &D {
    &self.hasher
  }

  #[inline]
  pub fn into_parts(self) -> (R, D) {
    (self.inner, self.hasher)
  }

  #[inline]
  pub fn inner_mut(&mut self) -> &mut R {
    &mut self.inner
  }
}

impl<R: Read, D: Digest> Read for DigestReader<R, D> {
  #[inline]
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let n = self.inner.read(buf)?;
    if let Some(data) = buf.get(..n) {
      self.hasher.update(data);
    }
    Ok(n)
  }

  fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
    let n = self.inner.read_vectored(bufs)?;
    let mut remaining = n;
    for buf in bufs.iter() {
      let take = remaining.min(buf.len());
      if take == 0 {
        break;
      }
      if let Some(data) = buf.get(..take) {
        self.hasher.update(data);
      }
      remaining -= take;
    }
    Ok(n)
  }
}

/// Hashes bytes as they are written to `inner`.
#[derive(Clone, Debug)]
pub struct DigestWriter<W, D> {
  inner: W,
  hasher: D,
}

impl<W, D: Digest> DigestWriter<W, D> {
  #[inline]
  #[must_use]
  pub fn new(inner: W) -> Self {
    Self::with_hasher(inner, D::new())
  }

  #[inline]
  #[must_use]
  pub fn with_hasher(inner: W, hasher: D) -> Self {
    Self { inner, hasher }
  }

  #[inline]
  #[must_use]
  pub fn digest(&self) -> D::Output {
    self.hasher.finalize()
  }

  #[inline]
  pub fn hasher(&self) -> &D {
    &self.hasher
  }

  #[inline]
  pub fn into_parts(self) -> (W, D) {
    (self.inner, self.hasher)
  }
}

impl<W: Write, D: Digest> Write for DigestWriter<W, D> {
  /// Only the bytes `inner` accepted are hashed.
  #[inline]
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let n = self.inner.write(buf)?;
    if let Some(data) = buf.get(..n) {
      self.hasher.update(data);
    }
    Ok(n)
  }

  fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
    let n = self.inner.write_vectored(bufs)?;
    let mut remaining = n;
    for buf in bufs {
      let take = remaining.min(buf.len());
      if take == 0 {
        break;
      }
      if let Some(data) = buf.get(..take) {
        self.hasher.update(data);
      }
      remaining -= take;
    }
    Ok(n)
  }

  #[inline]
  fn flush(&mut self) -> io::Result<()> {
    self.inner.flush()
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;
  use std::vec::Vec;

  use super::*;

  /// Order-sensitive toy digest: h = h * 31 + b.
  #[derive(Clone, Default, Debug)]
  struct Poly(u64);

  impl Digest for Poly {
    const OUTPUT_SIZE: usize = 8;
    type Output = u64;

    fn new() -> Self {
      Self(0)
    }

    fn update(&mut self, data: &[u8]) {
      for &b in data {
        self.0 = self.0.wrapping_mul(31).wrapping_add(u64::from(b));
      }
    }

    fn finalize(&self) -> u64 {
      self.0
    }

    fn reset(&mut self) {
      self.0 = 0;
    }
  }

  #[test]
  fn reader_hashes_exactly_what_was_read() {
    let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    let mut reader = Poly::reader(Cursor::new(data.clone()));
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
    assert_eq!(reader.digest(), Poly::digest(&data));
  }

  #[test]
  fn vectored_read_hashes_in_order() {
    let data = b"hello vectored world".to_vec();
    let mut reader = Poly::reader(Cursor::new(data.clone()));
    let (mut a, mut b) = ([0u8; 5], [0u8; 64]);
    let n = reader.read_vectored(&mut [IoSliceMut::new(&mut a), IoSliceMut::new(&mut b)]).unwrap();
    assert_eq!(n, data.len());
    assert_eq!(reader.digest(), Poly::digest(&data));
  }

  #[test]
  fn writer_hashes_accepted_bytes() {
    let mut writer = DigestWriter::with_hasher(Vec::new(), Poly::new());
    writer.write_all(b"abc").unwrap();
    writer.write_vectored(&[IoSlice::new(b"de"), IoSlice::new(b"f")]).unwrap();
    writer.flush().unwrap();
    let (inner, hasher) = writer.into_parts();
    assert_eq!(inner, b"abcdef");
    assert_eq!(hasher.finalize(), Poly::digest(b"abcdef"));
  }
}
