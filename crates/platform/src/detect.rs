//! Capability detection.
//!
//! Two sources are combined:
//! - Compile-time features via `cfg!(target_feature = ...)` (always available)
//! - Runtime detection via `is_x86_feature_detected!` (requires `std`)
//!
//! Results are cached in a `OnceLock` with `std`. Without `std` only the
//! compile-time set is reported, which is a constant and needs no cache.

use crate::caps::Caps;

/// Features known at compile time for the current target.
#[inline]
#[must_use]
pub const fn caps_static() -> Caps {
  #[allow(unused_mut)]
  let mut result = Caps::NONE;

  #[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
  {
    use crate::caps::x86;

    macro_rules! detect {
      ($caps:ident; $($feature:literal => $cap:expr),+ $(,)?) => {
        $(if cfg!(target_feature = $feature) { $caps = $caps.union($cap); })+
      };
    }

    // x86_64 baseline: SSE2 is guaranteed
    #[cfg(target_arch = "x86_64")]
    {
      result = result.union(x86::SSE2);
    }

    detect!(result;
      "sse2" => x86::SSE2,
      "ssse3" => x86::SSSE3,
      "sse4.1" => x86::SSE41,
      "avx" => x86::AVX,
      "avx2" => x86::AVX2,
      "avx512f" => x86::AVX512F,
      "avx512vl" => x86::AVX512VL,
    );
  }

  result
}

/// Get detected CPU capabilities.
///
/// Under Miri this returns [`Caps::NONE`] so only portable code runs.
#[inline]
#[must_use]
pub fn caps() -> Caps {
  #[cfg(miri)]
  {
    Caps::NONE
  }

  #[cfg(all(not(miri), feature = "std"))]
  {
    use std::sync::OnceLock;
    static CACHED: OnceLock<Caps> = OnceLock::new();
    *CACHED.get_or_init(detect_uncached)
  }

  #[cfg(all(not(miri), not(feature = "std")))]
  {
    caps_static()
  }
}

/// Detect capabilities without caching.
#[must_use]
pub fn detect_uncached() -> Caps {
  #[cfg(all(target_arch = "x86_64", feature = "std"))]
  {
    detect_x86_64()
  }

  #[cfg(not(all(target_arch = "x86_64", feature = "std")))]
  {
    caps_static()
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86_64 Detection
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(target_arch = "x86_64", feature = "std"))]
fn detect_x86_64() -> Caps {
  use crate::caps::x86;

  let mut caps = caps_static();

  // `is_x86_feature_detected!` already verifies OS support (XCR0) for AVX state.
  if std::arch::is_x86_feature_detected!("ssse3") {
    caps |= x86::SSSE3;
  }
  if std::arch::is_x86_feature_detected!("sse4.1") {
    caps |= x86::SSE41;
  }
  if std::arch::is_x86_feature_detected!("avx") {
    caps |= x86::AVX;
  }
  if std::arch::is_x86_feature_detected!("avx2") {
    caps |= x86::AVX2;
  }
  if std::arch::is_x86_feature_detected!("avx512f") {
    caps |= x86::AVX512F;
  }
  if std::arch::is_x86_feature_detected!("avx512vl") {
    caps |= x86::AVX512VL;
  }

  // Hybrid Intel parts can migrate a thread onto an E-core without AVX-512.
  if caps.has(x86::AVX512F) && is_intel_hybrid() && !force_avx512() {
    caps = caps.difference(x86::AVX512_READY);
  }

  caps
}

/// `B3_FORCE_AVX512=1` keeps AVX-512 enabled on hybrid parts.
#[cfg(all(target_arch = "x86_64", feature = "std"))]
fn force_avx512() -> bool {
  std::env::var("B3_FORCE_AVX512")
    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    .unwrap_or(false)
}

/// Intel family 6 client parts with P+E cores (Alder Lake and later).
#[cfg(all(target_arch = "x86_64", feature = "std"))]
fn is_intel_hybrid() -> bool {
  use core::arch::x86_64::__cpuid;

  // "GenuineIntel" has ebx = 0x756e6547 ("Genu")
  if __cpuid(0).ebx != 0x756e_6547 {
    return false;
  }

  let leaf1 = __cpuid(1).eax;
  let family = ((leaf1 >> 8) & 0xF) + ((leaf1 >> 20) & 0xFF);
  let model = ((leaf1 >> 4) & 0xF) | (((leaf1 >> 16) & 0xF) << 4);
  family == 6 && matches!(model, 0x97 | 0x9A | 0x9C | 0xAA | 0xAC | 0xB7 | 0xBA | 0xBD | 0xBF | 0xC5 | 0xC6)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detected_is_superset_of_static() {
    let detected = detect_uncached();
    let fixed = caps_static();
    // Hybrid masking only ever removes AVX-512 bits.
    #[cfg(target_arch = "x86_64")]
    let fixed = fixed.difference(crate::caps::x86::AVX512_READY);
    assert!(detected.has(fixed));
  }

  #[test]
  fn cached_matches_uncached() {
    #[cfg(not(miri))]
    assert_eq!(caps(), detect_uncached());
  }

  #[cfg(target_arch = "x86_64")]
  #[test]
  fn x86_64_always_has_sse2() {
    assert!(caps_static().has(crate::caps::x86::SSE2));
  }
}
