use assert_cmd::Command;
use predicates::prelude::*;

const EMPTY_HASH: &str = "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262";
const KEY: &[u8; 32] = b"whats the Elvish word for friend";

fn b3hash() -> Command {
  let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("b3hash");
  cmd.env_remove("B3_IMPL").env_remove("RUST_LOG");
  cmd
}

fn input(len: usize) -> Vec<u8> {
  (0..len).map(|i| (i % 251) as u8).collect()
}

fn reference_xof(hasher: &mut blake3::Hasher, data: &[u8], position: u64, len: usize) -> String {
  hasher.update(data);
  let mut reader = hasher.finalize_xof();
  reader.set_position(position);
  let mut out = vec![0u8; len];
  reader.fill(&mut out);
  hex::encode(out)
}

#[test]
fn empty_stdin_prints_empty_hash() {
  b3hash()
    .write_stdin(Vec::new())
    .assert()
    .success()
    .stdout(predicate::str::is_match(format!("^{EMPTY_HASH} cycles=[0-9]+\n$")).unwrap());
}

#[test]
fn large_stdin_matches_reference() {
  let data = input(100_000);
  let expected = blake3::hash(&data).to_hex().to_string();
  b3hash().write_stdin(data).assert().success().stdout(predicate::str::starts_with(format!("{expected} cycles=")));
}

#[test]
fn length_and_seek_select_output_window() {
  let data = input(3000);
  let expected = reference_xof(&mut blake3::Hasher::new(), &data, 2 * 64, 100);
  b3hash()
    .args(["--length", "100", "--seek", "2"])
    .write_stdin(data)
    .assert()
    .success()
    .stdout(predicate::str::starts_with(format!("{expected} cycles=")));
}

#[test]
fn keyed_mode_matches_reference() {
  let data = input(5000);
  let expected = blake3::keyed_hash(KEY, &data).to_hex().to_string();
  b3hash()
    .args(["--keyed", &hex::encode(KEY)])
    .write_stdin(data)
    .assert()
    .success()
    .stdout(predicate::str::starts_with(format!("{expected} cycles=")));
}

#[test]
fn derive_key_mode_matches_reference() {
  let context = "b3hash 2026-10-19 cli test context";
  let data = input(64);
  let expected = hex::encode(blake3::derive_key(context, &data));
  b3hash()
    .args(["--derive-key", context])
    .write_stdin(data)
    .assert()
    .success()
    .stdout(predicate::str::starts_with(format!("{expected} cycles=")));
}

#[test]
fn short_key_is_rejected() {
  b3hash()
    .args(["--keyed", "0011"])
    .write_stdin(b"abc".to_vec())
    .assert()
    .code(2)
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("error: key must be 32 bytes, got 2"));
}

#[test]
fn non_hex_key_is_rejected() {
  b3hash()
    .args(["--keyed", "not hex"])
    .write_stdin(Vec::new())
    .assert()
    .code(2)
    .stderr(predicate::str::contains("error: --keyed expects hex"));
}

#[test]
fn every_listed_backend_hashes_the_same() {
  let listing = b3hash().arg("--list").output().unwrap();
  assert!(listing.status.success());
  let listing = String::from_utf8(listing.stdout).unwrap();
  let names: Vec<String> = listing
    .lines()
    .filter_map(|line| line.get(2..))
    .filter_map(|rest| rest.split_whitespace().nth(1))
    .map(str::to_owned)
    .collect();
  assert_eq!(names.first().map(String::as_str), Some("generic"));

  let data = input(40_000);
  let expected = blake3::hash(&data).to_hex().to_string();
  for name in names.iter().map(String::as_str).chain(["fastest", "cycle"]) {
    b3hash()
      .args(["--impl", name])
      .write_stdin(data.clone())
      .assert()
      .success()
      .stdout(predicate::str::starts_with(format!("{expected} cycles=")));
  }
}

#[test]
fn list_marks_active_backend() {
  b3hash()
    .args(["--impl", "generic", "--list"])
    .assert()
    .success()
    .stdout(predicate::str::starts_with("* 0 generic"));
}

#[test]
fn env_selects_backend() {
  b3hash()
    .env("B3_IMPL", "generic")
    .arg("--list")
    .assert()
    .success()
    .stdout(predicate::str::starts_with("* 0 generic"));
}

#[test]
fn unknown_backend_fails() {
  b3hash()
    .args(["--impl", "z80"])
    .write_stdin(Vec::new())
    .assert()
    .code(2)
    .stderr(predicate::str::contains("error: cannot use backend `z80`: no supported backend named `z80`"));
}

#[test]
fn bench_reports_fastest() {
  b3hash()
    .arg("--bench")
    .assert()
    .success()
    .stdout(predicate::str::contains("generic").and(predicate::str::contains("fastest: ")));
}
