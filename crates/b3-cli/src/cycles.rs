//! Elapsed-time counter for the ` cycles=N` suffix.

/// A starting point. On x86_64 this is the time-stamp counter, elsewhere a
/// monotonic clock read in nanoseconds.
#[derive(Clone, Copy, Debug)]
pub struct Stamp {
  #[cfg(target_arch = "x86_64")]
  tsc: u64,
  #[cfg(not(target_arch = "x86_64"))]
  at: std::time::Instant,
}

impl Stamp {
  #[cfg(target_arch = "x86_64")]
  pub fn now() -> Self {
    Self { tsc: rdtsc() }
  }

  #[cfg(not(target_arch = "x86_64"))]
  pub fn now() -> Self {
    Self { at: std::time::Instant::now() }
  }

  #[cfg(target_arch = "x86_64")]
  pub fn elapsed(self) -> u64 {
    rdtsc().wrapping_sub(self.tsc)
  }

  #[cfg(not(target_arch = "x86_64"))]
  pub fn elapsed(self) -> u64 {
    u64::try_from(self.at.elapsed().as_nanos()).unwrap_or(u64::MAX)
  }
}

#[cfg(target_arch = "x86_64")]
#[allow(unused_unsafe)]
fn rdtsc() -> u64 {
  // SAFETY: every x86_64 CPU implements RDTSC.
  unsafe { core::arch::x86_64::_rdtsc() }
}
