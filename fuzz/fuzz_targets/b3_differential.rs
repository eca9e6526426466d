//! Differential fuzzing against the official `blake3` crate.
//!
//! Every supported backend hashes the same input in all three modes and must
//! agree with the reference, including extended output from a random offset.

#![no_main]

use arbitrary::Arbitrary;
use b3::{Hasher, SeekableXof as _, Xof as _};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  data: Vec<u8>,
  key: [u8; 32],
  context: String,
  xof_offset: u16,
  xof_len: u8,
}

fuzz_target!(|input: Input| {
  let Input { data, key, context, xof_offset, xof_len } = input;

  let mut reference = [
    blake3::Hasher::new(),
    blake3::Hasher::new_keyed(&key),
    blake3::Hasher::new_derive_key(&context),
  ];
  for hasher in &mut reference {
    hasher.update(&data);
  }

  for (_, backend) in b3::supported_backends() {
    let ours = [Hasher::new(), Hasher::new_keyed(&key), Hasher::new_derive_key(&context)];
    for (hasher, expected) in ours.into_iter().zip(&reference) {
      let mut hasher = hasher.with_backend(backend);
      hasher.update(&data);
      assert_eq!(hasher.finalize(), *expected.finalize().as_bytes(), "{} digest mismatch", backend.name());

      let mut expected_xof = vec![0u8; usize::from(xof_len)];
      let mut reader = expected.finalize_xof();
      reader.set_position(u64::from(xof_offset));
      reader.fill(&mut expected_xof);

      let mut actual_xof = vec![0u8; usize::from(xof_len)];
      let mut output = hasher.finalize_xof();
      output.set_position(u64::from(xof_offset));
      output.squeeze(&mut actual_xof);
      assert_eq!(actual_xof, expected_xof, "{} xof mismatch", backend.name());
    }
  }
});
