//! CPU capability bitset.
//!
//! `Caps` answers one question: which instruction-set extensions may the
//! current process execute? Backends declare the bits they need and
//! the registry compares those against [`crate::caps()`].

/// Capability set (256 bits, grouped by architecture).
///
/// `Caps` is `Copy`, `Send`, and `Sync`. It can be freely shared across threads.
///
/// # Example
///
/// ```
/// use platform::caps::{Caps, x86};
///
/// let need = x86::SSE41 | x86::AVX2;
/// assert!(need.has(x86::AVX2));
/// assert!(!Caps::NONE.has(need));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Caps(pub(crate) [u64; 4]);

impl Caps {
  /// Empty capability set (no features).
  pub const NONE: Self = Self([0; 4]);

  /// Check if all features in `required` are present.
  #[inline(always)]
  #[must_use]
  pub const fn has(self, required: Self) -> bool {
    (self.0[0] & required.0[0]) == required.0[0]
      && (self.0[1] & required.0[1]) == required.0[1]
      && (self.0[2] & required.0[2]) == required.0[2]
      && (self.0[3] & required.0[3]) == required.0[3]
  }

  /// Union of two capability sets.
  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self([
      self.0[0] | other.0[0],
      self.0[1] | other.0[1],
      self.0[2] | other.0[2],
      self.0[3] | other.0[3],
    ])
  }

  /// Remove every feature in `other`.
  #[inline]
  #[must_use]
  pub const fn difference(self, other: Self) -> Self {
    Self([
      self.0[0] & !other.0[0],
      self.0[1] & !other.0[1],
      self.0[2] & !other.0[2],
      self.0[3] & !other.0[3],
    ])
  }

  #[inline]
  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.0[0] == 0 && self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0
  }

  /// Create a capability set with a single bit set.
  #[inline]
  #[must_use]
  pub const fn bit(bit: u8) -> Self {
    let word = (bit / 64) as usize;
    let mut bits = [0u64; 4];
    match word {
      0 => bits[0] = 1u64 << (bit % 64),
      1 => bits[1] = 1u64 << (bit % 64),
      2 => bits[2] = 1u64 << (bit % 64),
      _ => bits[3] = 1u64 << (bit % 64),
    }
    Self(bits)
  }

  /// Iterate the names of the known features present in this set.
  pub fn names(self) -> impl Iterator<Item = &'static str> {
    NAMED.iter().filter(move |(_, caps)| self.has(*caps)).map(|(name, _)| *name)
  }
}

impl core::ops::BitOr for Caps {
  type Output = Self;

  #[inline]
  fn bitor(self, rhs: Self) -> Self::Output {
    self.union(rhs)
  }
}

impl core::ops::BitOrAssign for Caps {
  #[inline]
  fn bitor_assign(&mut self, rhs: Self) {
    *self = self.union(rhs);
  }
}

impl core::fmt::Debug for Caps {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_set().entries(self.names()).finish()
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86 / x86_64 features (bits 0-63)
// ─────────────────────────────────────────────────────────────────────────────

/// x86 and x86_64 feature bits.
pub mod x86 {
  use super::Caps;

  // ─── SSE Family ───
  pub const SSE2: Caps = Caps::bit(0);
  pub const SSSE3: Caps = Caps::bit(2);
  pub const SSE41: Caps = Caps::bit(3);

  // ─── AVX Family ───
  pub const AVX: Caps = Caps::bit(6);
  pub const AVX2: Caps = Caps::bit(7);

  // ─── AVX-512 Foundation ───
  pub const AVX512F: Caps = Caps::bit(14);
  pub const AVX512VL: Caps = Caps::bit(15);

  /// Everything the AVX-512 backends need together.
  pub const AVX512_READY: Caps = AVX512F.union(AVX512VL);
}

const NAMED: &[(&str, Caps)] = &[
  ("sse2", x86::SSE2),
  ("ssse3", x86::SSSE3),
  ("sse4.1", x86::SSE41),
  ("avx", x86::AVX),
  ("avx2", x86::AVX2),
  ("avx512f", x86::AVX512F),
  ("avx512vl", x86::AVX512VL),
];
