//! Extendable-output function (XOF) traits.

/// Extendable-output function producing an arbitrary number of bytes.
///
/// This trait intentionally has no `std::io::Read` dependency; it is usable in
/// `no_std` environments.
pub trait Xof: Clone {
  /// Squeeze output bytes into `out`.
  fn squeeze(&mut self, out: &mut [u8]);
}

/// An [`Xof`] whose output stream can be addressed by byte offset.
pub trait SeekableXof: Xof {
  /// Offset of the next byte [`squeeze`](Xof::squeeze) will produce.
  fn position(&self) -> u64;

  /// Move the read position to `position`.
  fn set_position(&mut self, position: u64);
}
