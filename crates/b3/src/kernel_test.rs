//! Cross-backend consistency checks used by the integration tests.

use alloc::vec::Vec;

use crate::backends::Backend;
use crate::hasher::Hasher;
use crate::{KEY_LEN, OUT_LEN};

/// Which hashing mode to run.
#[derive(Clone, Copy, Debug)]
pub enum Mode<'a> {
  Hash,
  Keyed(&'a [u8; KEY_LEN]),
  DeriveKey(&'a str),
}

impl Mode<'_> {
  fn hasher(self, backend: &'static Backend) -> Hasher {
    let hasher = match self {
      Self::Hash => Hasher::new(),
      Self::Keyed(key) => Hasher::new_keyed(key),
      Self::DeriveKey(context) => Hasher::new_derive_key(context),
    };
    hasher.with_backend(backend)
  }
}

#[derive(Clone, Debug)]
pub struct BackendResult {
  pub name: &'static str,
  pub digest: [u8; OUT_LEN],
  pub xof: Vec<u8>,
}

/// Hash `data` in `mode` with every supported backend, feeding it in pieces
/// of `piece` bytes and squeezing `xof_len` bytes of extended output.
#[must_use]
pub fn run_all_backends(mode: Mode<'_>, data: &[u8], piece: usize, xof_len: usize) -> Vec<BackendResult> {
  crate::supported_backends()
    .map(|(_, backend)| {
      let mut hasher = mode.hasher(backend);
      for chunk in data.chunks(piece.max(1)) {
        hasher.update(chunk);
      }
      BackendResult { name: backend.name(), digest: hasher.finalize(), xof: hasher.finalize_seek(0, xof_len) }
    })
    .collect()
}

/// Check that every supported backend agrees.
///
/// # Errors
///
/// The name of the first backend that disagrees with the generic one.
pub fn verify_backends(mode: Mode<'_>, data: &[u8], piece: usize, xof_len: usize) -> Result<(), &'static str> {
  let results = run_all_backends(mode, data, piece, xof_len);
  let Some((first, rest)) = results.split_first() else {
    return Ok(());
  };
  match rest.iter().find(|result| result.digest != first.digest || result.xof != first.xof) {
    Some(mismatch) => Err(mismatch.name),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const KEY: &[u8; 32] = b"whats the Elvish word for friend";
  const CONTEXT: &str = "BLAKE3 2019-12-27 16:29:52 test vectors context";

  fn input(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
  }

  #[test]
  fn all_backends_agree_across_sizes() {
    for len in [0, 1, 63, 64, 65, 1023, 1024, 1025, 2048, 2049, 8 * 1024 + 1, 16 * 1024, 31 * 1024 + 7, 100_000] {
      let data = input(len);
      for mode in [Mode::Hash, Mode::Keyed(KEY), Mode::DeriveKey(CONTEXT)] {
        for piece in [len.max(1), 1000, 4096] {
          assert_eq!(verify_backends(mode, &data, piece, 131), Ok(()), "len {len}, piece {piece}, {mode:?}");
        }
      }
    }
  }

  #[test]
  fn generic_runs_first() {
    let results = run_all_backends(Mode::Hash, b"", 1, 32);
    assert_eq!(results.first().map(|result| result.name), Some("generic"));
    assert_eq!(results[0].xof[..], results[0].digest);
  }
}
