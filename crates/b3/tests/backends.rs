use b3::kernel_test::{Mode, run_all_backends, verify_backends};
use b3::{BLOCK_LEN, BackendId, CHUNK_LEN, Hasher, IncrementCounter, OUT_LEN};

const KEY: &[u8; 32] = b"whats the Elvish word for friend";
const IV: [u32; 8] = [
  0x6A09_E667, 0xBB67_AE85, 0x3C6E_F372, 0xA54F_F53A, 0x510E_527F, 0x9B05_688C, 0x1F83_D9AB, 0x5BE0_CD19,
];
const CHUNK_START: u8 = 1;
const CHUNK_END: u8 = 2;

fn input(len: usize) -> Vec<u8> {
  (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn backends_agree_on_large_inputs() {
  // Enough chunks to exercise full AVX-512 batches plus a remainder, and a
  // tree several levels deep.
  let data = input(67 * CHUNK_LEN + 333);
  for piece in [1, 777, CHUNK_LEN, 16 * CHUNK_LEN + 1, data.len()] {
    assert_eq!(verify_backends(Mode::Hash, &data, piece, 200), Ok(()), "piece {piece}");
    assert_eq!(verify_backends(Mode::Keyed(KEY), &data, piece, 64), Ok(()), "keyed piece {piece}");
  }
}

#[test]
fn backends_match_reference() {
  let data = input(33 * CHUNK_LEN + 1);
  let expected = *blake3::hash(&data).as_bytes();
  for result in run_all_backends(Mode::Hash, &data, 5000, 32) {
    assert_eq!(result.digest, expected, "{}", result.name);
  }
}

#[test]
fn hash_many_equals_sequential_compression() {
  let generic = BackendId::Generic.backend().unwrap();
  let data = input(21 * CHUNK_LEN);
  let chunks: Vec<&[u8]> = data.chunks(CHUNK_LEN).collect();

  // Sequential: one compression per block.
  let mut expected = vec![0u8; chunks.len() * OUT_LEN];
  for (index, (chunk, out)) in chunks.iter().zip(expected.chunks_mut(OUT_LEN)).enumerate() {
    let mut cv = IV;
    let blocks = chunk.len() / BLOCK_LEN;
    for (b, block) in chunk.chunks_exact(BLOCK_LEN).enumerate() {
      let mut flags = 0;
      if b == 0 {
        flags |= CHUNK_START;
      }
      if b + 1 == blocks {
        flags |= CHUNK_END;
      }
      generic.compress_in_place(&mut cv, block.try_into().unwrap(), BLOCK_LEN as u8, 9 + index as u64, flags);
    }
    for (dst, word) in out.chunks_mut(4).zip(cv) {
      dst.copy_from_slice(&word.to_le_bytes());
    }
  }

  for (_, backend) in b3::supported_backends() {
    let mut actual = vec![0u8; chunks.len() * OUT_LEN];
    backend.hash_many(&chunks, CHUNK_LEN / BLOCK_LEN, &IV, 9, IncrementCounter::Yes, 0, CHUNK_START, CHUNK_END, &mut actual);
    assert_eq!(actual, expected, "{}", backend.name());
  }
}

#[test]
fn pinned_hashers_ignore_the_selector() {
  let data = input(5 * CHUNK_LEN);
  let expected = b3::hash(&data);
  for (_, backend) in b3::supported_backends() {
    let mut hasher = Hasher::new().with_backend(backend);
    hasher.update(&data);
    assert_eq!(hasher.finalize(), expected, "{}", backend.name());
    assert!(matches!(hasher.dispatch(), b3::Dispatch::Pinned(b) if b.id() == backend.id()));
  }
}
