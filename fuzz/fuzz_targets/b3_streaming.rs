//! Arbitrary sequences of `update` calls must match one-shot hashing, and
//! interleaved finalizations must not disturb the state.

#![no_main]

use arbitrary::Arbitrary;
use b3::Hasher;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  data: Vec<u8>,
  /// Update sizes, cycled until the data runs out.
  pieces: Vec<u16>,
  /// Finalize after every n-th update (0: never).
  finalize_every: u8,
}

fuzz_target!(|input: Input| {
  let expected = *blake3::hash(&input.data).as_bytes();

  let mut hasher = Hasher::new();
  let mut rest = input.data.as_slice();
  let mut updates = 0usize;
  while !rest.is_empty() {
    let size = match input.pieces.get(updates % input.pieces.len().max(1)) {
      Some(&size) => usize::from(size).max(1),
      None => 1,
    };
    let (head, tail) = rest.split_at(size.min(rest.len()));
    hasher.update(head);
    rest = tail;
    updates += 1;

    if input.finalize_every != 0 && updates % usize::from(input.finalize_every) == 0 {
      let consumed = input.data.len() - rest.len();
      assert_eq!(hasher.finalize(), *blake3::hash(&input.data[..consumed]).as_bytes());
    }
  }

  assert_eq!(hasher.finalize(), expected, "streaming mismatch after {updates} updates");
  assert_eq!(hasher.count(), input.data.len() as u64);
});
