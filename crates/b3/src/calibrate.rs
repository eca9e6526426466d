//! Throughput calibration.
//!
//! Times every supported backend over a sweep of buffer sizes and records the
//! winner as the selector's fastest backend. Each backend runs through a
//! hasher pinned to it, so hashers using the selector meanwhile are not
//! affected and the active selection is never changed.

use alloc::vec::Vec;
use core::hint::black_box;
use core::time::Duration;
use std::time::Instant;

use crate::backends::Backend;
use crate::hasher::Hasher;
use crate::select::BackendSelector;

const MIB: f64 = 1024.0 * 1024.0;

/// Buffer size and hashes per timing check, 1 KiB to 4 MiB.
pub const SIZES: [(usize, u32); 7] = [
  (1 << 10, 128),
  (1 << 12, 64),
  (1 << 14, 32),
  (1 << 16, 16),
  (1 << 18, 8),
  (1 << 20, 4),
  (1 << 22, 1),
];

/// Size whose throughput decides the fastest backend.
pub const REFERENCE_SIZE: usize = 1 << 18;

/// Calibration settings.
#[derive(Clone, Debug)]
pub struct Options {
  /// Minimum time spent on each (backend, size) pair.
  pub min_time: Duration,
  /// Sizes to time, with their batch counts.
  pub sizes: &'static [(usize, u32)],
}

impl Default for Options {
  fn default() -> Self {
    Self { min_time: Duration::from_millis(1), sizes: &SIZES }
  }
}

impl Options {
  /// A short sweep for tests and smoke checks.
  #[must_use]
  pub fn quick() -> Self {
    Self { min_time: Duration::from_micros(100), sizes: &[(1 << 10, 16), (1 << 14, 2)] }
  }
}

/// Throughput of one backend at one size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
  pub size: usize,
  pub mib_per_sec: f64,
}

/// All samples for one backend.
#[derive(Clone, Debug)]
pub struct BackendReport {
  pub id: u32,
  pub name: &'static str,
  pub samples: Vec<Sample>,
}

impl BackendReport {
  #[must_use]
  pub fn throughput_at(&self, size: usize) -> Option<f64> {
    self.samples.iter().find(|sample| sample.size == size).map(|sample| sample.mib_per_sec)
  }
}

/// Outcome of [`calibrate`].
#[derive(Clone, Debug)]
pub struct Calibration {
  pub reports: Vec<BackendReport>,
  /// Id recorded with [`Selector::record_fastest`](backend::Selector::record_fastest).
  pub fastest: u32,
  /// Size the decision was made at.
  pub reference_size: usize,
}

impl Calibration {
  #[must_use]
  pub fn fastest_name(&self) -> &'static str {
    self.reports.iter().find(|report| report.id == self.fastest).map_or("generic", |report| report.name)
  }
}

/// Calibrate `selector`'s backends with the default sweep.
pub fn calibrate(selector: &BackendSelector) -> Calibration {
  calibrate_with(selector, &Options::default())
}

/// Calibrate with explicit `options`.
pub fn calibrate_with(selector: &BackendSelector, options: &Options) -> Calibration {
  let largest = options.sizes.iter().map(|&(size, _)| size).max().unwrap_or(0);
  let data: Vec<u8> = (0..largest).map(|i| (i % 251) as u8).collect();

  let reference_size = if options.sizes.iter().any(|&(size, _)| size == REFERENCE_SIZE) {
    REFERENCE_SIZE
  } else {
    largest
  };

  let mut reports = Vec::new();
  for (id, backend) in selector.registry().iter() {
    let mut samples = Vec::with_capacity(options.sizes.len());
    for &(size, batch) in options.sizes {
      let Some(input) = data.get(..size) else { continue };
      let mib_per_sec = measure(backend, input, batch, options.min_time);
      log::trace!("{}: {size} bytes at {mib_per_sec:.1} MiB/s", backend.name());
      samples.push(Sample { size, mib_per_sec });
    }
    reports.push(BackendReport { id, name: backend.name(), samples });
  }

  let fastest = reports
    .iter()
    .filter_map(|report| report.throughput_at(reference_size).map(|speed| (report.id, speed)))
    .max_by(|a, b| a.1.total_cmp(&b.1))
    .map_or(0, |(id, _)| id);

  selector.record_fastest(fastest);
  log::debug!("calibrated {} backends, fastest at {reference_size} bytes is id {fastest}", reports.len());

  Calibration { reports, fastest, reference_size }
}

/// MiB/s hashing `input` with `backend` for at least `min_time`.
fn measure(backend: &'static Backend, input: &[u8], batch: u32, min_time: Duration) -> f64 {
  let mut hashed: u64 = 0;
  let start = Instant::now();
  loop {
    for _ in 0..batch.max(1) {
      let mut hasher = Hasher::new().with_backend(backend);
      hasher.update(black_box(input));
      black_box(hasher.finalize());
      hashed = hashed.saturating_add(input.len() as u64);
    }
    let elapsed = start.elapsed();
    if elapsed >= min_time {
      let secs = elapsed.as_secs_f64();
      return if secs > 0.0 { hashed as f64 / secs / MIB } else { 0.0 };
    }
  }
}

#[cfg(test)]
mod tests {
  use backend::{Mode, Selector};

  use super::*;
  use crate::backends::REGISTRY;

  #[test]
  fn reports_every_supported_backend() {
    let selector = Selector::new(&REGISTRY);
    let calibration = calibrate_with(&selector, &Options::quick());
    assert_eq!(calibration.reports.len() as u32, selector.count_supported());
    assert_eq!(calibration.reference_size, 1 << 14);
    for report in &calibration.reports {
      assert_eq!(report.samples.len(), 2);
      assert!(report.samples.iter().all(|sample| sample.mib_per_sec > 0.0));
    }
  }

  #[test]
  fn records_fastest_without_selecting_it() {
    let selector = Selector::new(&REGISTRY);
    selector.select_by_name("generic").unwrap();
    let calibration = calibrate_with(&selector, &Options::quick());
    assert_eq!(selector.fastest_id(), calibration.fastest);
    assert_eq!(selector.mode(), Mode::User);
    assert_eq!(selector.current_id(), 0);

    selector.select_by_name("fastest").unwrap();
    assert_eq!(selector.current_ops().name(), calibration.fastest_name());
  }
}
