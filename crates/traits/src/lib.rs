//! Core hashing traits for the b3 workspace.
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Digest`] | Fixed-size cryptographic digest with streaming updates |
//! | [`Xof`] | Extendable output, squeezed in arbitrary pieces |
//! | [`SeekableXof`] | Extendable output with random access |
//!
//! With `std`, [`io`] adapts any [`Digest`] to `std::io::Read`/`Write`.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod digest;
#[cfg(feature = "std")]
pub mod io;
mod xof;

pub use digest::Digest;
pub use xof::{SeekableXof, Xof};
