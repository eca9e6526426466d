//! BLAKE3 with runtime backend selection.
//!
//! Every compression goes through a [`Backend`]: a portable implementation
//! plus SSE2, SSE4.1, AVX2 and AVX-512 variants on x86_64. A process-wide
//! [`BackendSelector`] decides which one [`Hasher`] uses, and the choice can
//! be changed at any time without affecting results.
//!
//! ```
//! let mut hasher = b3::Hasher::new();
//! hasher.update(b"hello ");
//! hasher.update(b"world");
//! assert_eq!(hasher.finalize(), b3::hash(b"hello world"));
//!
//! // Extended output, starting at output block 2.
//! let tail = hasher.finalize_seek(2, 16);
//! assert_eq!(tail[..], hasher.finalize_seek(0, 144)[128..]);
//! ```
//!
//! # Backend selection
//!
//! ```
//! for (id, backend) in b3::supported_backends() {
//!   println!("{id}: {} (degree {})", backend.name(), backend.degree());
//! }
//! b3::select_backend_by_name("generic")?;
//! assert_eq!(b3::active_backend_name(), "generic");
//! # Ok::<(), b3::Error>(())
//! ```
//!
//! The `B3_IMPL` environment variable (`generic`, `sse41`, `fastest`,
//! `cycle`, ...) is applied the first time the process-wide selector is used.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod backends;
#[cfg(feature = "std")]
pub mod calibrate;
mod chunk;
pub mod config;
mod error;
mod hasher;
#[doc(hidden)]
pub mod kernel_test;
mod output;
mod portable;
mod select;
mod util;
#[cfg(target_arch = "x86_64")]
mod x86_64;

pub use backend::{Choice, Mode, SelectError};
pub use backends::{Backend, BackendId, CompressInPlaceFn, CompressXofFn, HashManyFn, IncrementCounter};
#[cfg(feature = "std")]
pub use calibrate::{Calibration, calibrate};
pub use error::Error;
pub use hasher::{Dispatch, Hasher};
pub use output::OutputReader;
pub use select::{
  BackendRegistry, BackendSelector, active_backend, active_backend_id, active_backend_name, apply_deferred_selection,
  registry, select_backend_by_id, select_backend_by_name, selector, set_fastest_backend, supported_backend_count,
  supported_backends,
};
#[cfg(feature = "std")]
pub use traits::io;
pub use traits::{Digest, SeekableXof, Xof};

/// Key length in bytes.
pub const KEY_LEN: usize = 32;
/// Default output length in bytes.
pub const OUT_LEN: usize = 32;
/// Compression block length in bytes.
pub const BLOCK_LEN: usize = 64;
/// Leaf chunk length in bytes.
pub const CHUNK_LEN: usize = 1024;
/// Maximum height of the chunk tree (2^54 chunks fill a 64-bit byte count).
pub const MAX_DEPTH: usize = 54;
/// Widest `hash_many` batch any backend accepts at once.
pub const MAX_SIMD_DEGREE: usize = 16;

pub(crate) const CHUNK_START: u8 = 1 << 0;
pub(crate) const CHUNK_END: u8 = 1 << 1;
pub(crate) const PARENT: u8 = 1 << 2;
pub(crate) const ROOT: u8 = 1 << 3;
pub(crate) const KEYED_HASH: u8 = 1 << 4;
pub(crate) const DERIVE_KEY_CONTEXT: u8 = 1 << 5;
pub(crate) const DERIVE_KEY_MATERIAL: u8 = 1 << 6;

pub(crate) const IV: [u32; 8] = [
  0x6A09_E667,
  0xBB67_AE85,
  0x3C6E_F372,
  0xA54F_F53A,
  0x510E_527F,
  0x9B05_688C,
  0x1F83_D9AB,
  0x5BE0_CD19,
];

/// `MSG_SCHEDULE[round][i]` gives the index of the message word to use.
pub(crate) const MSG_SCHEDULE: [[usize; 16]; 7] = [
  [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
  [2, 6, 3, 10, 7, 0, 4, 13, 1, 11, 12, 5, 9, 14, 15, 8],
  [3, 4, 10, 12, 13, 2, 7, 14, 6, 5, 9, 0, 11, 15, 8, 1],
  [10, 7, 12, 9, 14, 3, 13, 15, 4, 0, 11, 2, 5, 8, 1, 6],
  [12, 13, 9, 11, 15, 10, 14, 8, 7, 2, 5, 3, 0, 1, 6, 4],
  [9, 14, 11, 5, 8, 12, 15, 1, 13, 3, 0, 10, 2, 6, 4, 7],
  [11, 15, 5, 0, 1, 9, 8, 6, 14, 10, 2, 12, 3, 4, 7, 13],
];

/// Hash `input` with the active backend.
#[must_use]
pub fn hash(input: &[u8]) -> [u8; OUT_LEN] {
  let mut hasher = Hasher::new();
  hasher.update(input);
  hasher.finalize()
}

/// Keyed hash (MAC) of `input`.
#[must_use]
pub fn keyed_hash(key: &[u8; KEY_LEN], input: &[u8]) -> [u8; OUT_LEN] {
  let mut hasher = Hasher::new_keyed(key);
  hasher.update(input);
  hasher.finalize()
}

/// Derive `out.len()` bytes of key material for `context`.
///
/// `context` should be a hardcoded, globally unique, application-specific
/// string.
pub fn derive_key(context: &str, key_material: &[u8], out: &mut [u8]) {
  let mut hasher = Hasher::new_derive_key(context);
  hasher.update(key_material);
  hasher.finalize_seek_into(0, out);
}
