//! Backend descriptors.
//!
//! A [`Backend`] bundles the three compression entry points one instruction
//! set provides. Descriptors are immutable statics; the registry exposes only
//! the ones the running CPU supports, which is what makes the safe wrappers
//! around `#[target_feature]` code sound.

use backend::{Implementation, Registry};
use platform::Caps;

use crate::{BLOCK_LEN, OUT_LEN, portable};

/// Compress one block into `cv`.
///
/// Arguments: chaining value, block, block length, counter, flags.
pub type CompressInPlaceFn = fn(&mut [u32; 8], &[u8; BLOCK_LEN], u8, u64, u8);

/// Compress one block and return all 64 bytes of extended output.
pub type CompressXofFn = fn(&[u32; 8], &[u8; BLOCK_LEN], u8, u64, u8) -> [u8; 2 * OUT_LEN];

/// Hash `inputs.len()` equal-length inputs of `blocks` blocks each, writing
/// one 32-byte chaining value per input to `out`.
///
/// Arguments: inputs, blocks, key, counter, counter increment, flags,
/// first-block flags, last-block flags, output.
pub type HashManyFn = fn(&[&[u8]], usize, &[u32; 8], u64, IncrementCounter, u8, u8, u8, &mut [u8]);

/// Whether consecutive `hash_many` inputs use consecutive counters.
///
/// Chunks do (their counter is the chunk index); parent nodes do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncrementCounter {
  Yes,
  No,
}

impl IncrementCounter {
  #[inline(always)]
  pub(crate) fn step(self) -> u64 {
    match self {
      Self::Yes => 1,
      Self::No => 0,
    }
  }
}

/// Registered backends, in preference-neutral registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BackendId {
  Generic = 0,
  Sse2 = 1,
  Sse41 = 2,
  Avx2 = 3,
  Avx512 = 4,
}

impl BackendId {
  pub const ALL: &'static [Self] = &[Self::Generic, Self::Sse2, Self::Sse41, Self::Avx2, Self::Avx512];

  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Generic => "generic",
      Self::Sse2 => "sse2",
      Self::Sse41 => "sse41",
      Self::Avx2 => "avx2",
      Self::Avx512 => "avx512",
    }
  }

  #[must_use]
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.iter().copied().find(|id| id.as_str() == name)
  }

  /// CPU features the backend's code paths execute.
  #[inline]
  #[must_use]
  pub const fn required_caps(self) -> Caps {
    use platform::caps::x86;
    match self {
      Self::Generic => Caps::NONE,
      Self::Sse2 => x86::SSE2,
      Self::Sse41 => x86::SSE2.union(x86::SSSE3).union(x86::SSE41),
      Self::Avx2 => x86::SSE2.union(x86::SSSE3).union(x86::SSE41).union(x86::AVX2),
      Self::Avx512 => x86::SSE2
        .union(x86::SSSE3)
        .union(x86::SSE41)
        .union(x86::AVX2)
        .union(x86::AVX512_READY),
    }
  }

  /// The descriptor, if this process supports it.
  #[must_use]
  pub fn backend(self) -> Option<&'static Backend> {
    REGISTRY.iter().map(|(_, backend)| backend).find(|backend| backend.id == self)
  }
}

impl core::fmt::Display for BackendId {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One compression backend.
///
/// Obtained from the registry only, so every reachable descriptor is safe to
/// call on the current CPU.
#[derive(Clone, Copy)]
pub struct Backend {
  id: BackendId,
  degree: usize,
  compress_in_place: CompressInPlaceFn,
  compress_xof: CompressXofFn,
  hash_many: HashManyFn,
}

impl Backend {
  #[inline]
  #[must_use]
  pub fn id(&self) -> BackendId {
    self.id
  }

  #[inline]
  #[must_use]
  pub fn name(&self) -> &'static str {
    self.id.as_str()
  }

  /// Inputs `hash_many` processes in parallel.
  #[inline]
  #[must_use]
  pub fn degree(&self) -> usize {
    self.degree
  }

  #[inline(always)]
  pub fn compress_in_place(&self, cv: &mut [u32; 8], block: &[u8; BLOCK_LEN], block_len: u8, counter: u64, flags: u8) {
    (self.compress_in_place)(cv, block, block_len, counter, flags);
  }

  #[inline(always)]
  #[must_use]
  pub fn compress_xof(
    &self,
    cv: &[u32; 8],
    block: &[u8; BLOCK_LEN],
    block_len: u8,
    counter: u64,
    flags: u8,
  ) -> [u8; 2 * OUT_LEN] {
    (self.compress_xof)(cv, block, block_len, counter, flags)
  }

  /// See [`HashManyFn`].
  ///
  /// # Panics
  ///
  /// Panics if an input is shorter than `blocks * BLOCK_LEN` bytes or `out`
  /// is shorter than `inputs.len() * OUT_LEN` bytes.
  #[allow(clippy::too_many_arguments)]
  #[inline(always)]
  pub fn hash_many(
    &self,
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
    assert!(inputs.iter().all(|input| input.len() >= blocks * BLOCK_LEN), "hash_many input too short");
    assert!(out.len() >= inputs.len() * OUT_LEN, "hash_many output too short");
    (self.hash_many)(inputs, blocks, key, counter, increment, flags, flags_start, flags_end, out);
  }
}

impl Implementation for Backend {
  fn name(&self) -> &'static str {
    self.id.as_str()
  }

  fn required_caps(&self) -> Caps {
    self.id.required_caps()
  }
}

impl core::fmt::Debug for Backend {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Backend").field("name", &self.name()).field("degree", &self.degree).finish_non_exhaustive()
  }
}

const GENERIC: Backend = Backend {
  id: BackendId::Generic,
  degree: 4,
  compress_in_place: portable::compress_in_place,
  compress_xof: portable::compress_xof,
  hash_many: portable::hash_many,
};

#[cfg(target_arch = "x86_64")]
mod x86 {
  use super::{Backend, BackendId};
  use crate::x86_64;

  pub(super) const SSE2: Backend = Backend {
    id: BackendId::Sse2,
    degree: 4,
    compress_in_place: x86_64::compress_in_place_sse2,
    compress_xof: x86_64::compress_xof_sse2,
    hash_many: x86_64::hash_many_sse2,
  };

  pub(super) const SSE41: Backend = Backend {
    id: BackendId::Sse41,
    degree: 4,
    compress_in_place: x86_64::compress_in_place_sse41,
    compress_xof: x86_64::compress_xof_sse41,
    hash_many: x86_64::hash_many_sse41,
  };

  // Single-block compression has no use for 256-bit registers.
  pub(super) const AVX2: Backend = Backend {
    id: BackendId::Avx2,
    degree: 8,
    compress_in_place: x86_64::compress_in_place_sse41,
    compress_xof: x86_64::compress_xof_sse41,
    hash_many: x86_64::hash_many_avx2,
  };

  pub(super) const AVX512: Backend = Backend {
    id: BackendId::Avx512,
    degree: 16,
    compress_in_place: x86_64::compress_in_place_avx512,
    compress_xof: x86_64::compress_xof_avx512,
    hash_many: x86_64::hash_many_avx512,
  };
}

static BACKENDS: &[Backend] = &[
  GENERIC,
  #[cfg(target_arch = "x86_64")]
  x86::SSE2,
  #[cfg(target_arch = "x86_64")]
  x86::SSE41,
  #[cfg(target_arch = "x86_64")]
  x86::AVX2,
  #[cfg(target_arch = "x86_64")]
  x86::AVX512,
];

pub(crate) static REGISTRY: Registry<Backend> = Registry::new(BACKENDS);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generic_is_always_first() {
    assert!(REGISTRY.count_supported() >= 1);
    assert_eq!(REGISTRY.get(0).map(Backend::id), Some(BackendId::Generic));
  }

  #[test]
  fn names_round_trip() {
    for &id in BackendId::ALL {
      assert_eq!(BackendId::from_name(id.as_str()), Some(id));
    }
    assert_eq!(BackendId::from_name("neon"), None);
  }

  #[test]
  fn unsupported_backends_are_unreachable() {
    let caps = platform::caps();
    for &id in BackendId::ALL {
      if let Some(backend) = id.backend() {
        assert!(caps.has(id.required_caps()), "{id} handed out without its features");
        assert_eq!(backend.name(), id.as_str());
      }
    }
  }

  #[test]
  fn degrees_fit_batch_buffer() {
    for (_, backend) in REGISTRY.iter() {
      assert!((1..=crate::MAX_SIMD_DEGREE).contains(&backend.degree()));
    }
  }

  #[test]
  #[should_panic(expected = "hash_many input too short")]
  fn hash_many_rejects_short_inputs() {
    let input = [0u8; 63];
    let mut out = [0u8; 32];
    GENERIC.hash_many(&[&input], 1, &crate::IV, 0, IncrementCounter::Yes, 0, 0, 0, &mut out);
  }
}
