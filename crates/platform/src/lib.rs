//! CPU capability detection for b3.
//!
//! This crate is the single source of truth for "may this process execute
//! instruction set X". Backends declare required [`Caps`] and compare them
//! against [`caps()`].
//!
//! ```
//! use platform::caps::x86;
//!
//! let caps = platform::caps();
//! if caps.has(x86::SSE41 | x86::AVX2) {
//!   // AVX2 paths are safe to call
//! }
//! ```
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod caps;
mod detect;

pub use caps::Caps;
pub use detect::{caps, caps_static, detect_uncached};
