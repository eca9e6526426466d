//! `b3hash`: hash stdin with BLAKE3.
//!
//! Usage:
//!   b3hash < file
//!   b3hash --length 64 --seek 2 < file
//!   b3hash --keyed 000102...1f < file
//!   b3hash --impl sse41 < file
//!   b3hash --list
//!   b3hash --bench
//!
//! Prints the lowercase hex output followed by ` cycles=N`, the time spent
//! hashing in TSC ticks on x86_64 and nanoseconds elsewhere. Set `RUST_LOG`
//! for diagnostics on stderr.

use std::io::{self, ErrorKind, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use b3::Hasher;
use b3::io::DigestReader;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cycles;

/// Stdin is fed to the hasher in pieces of this size.
const BUF_LEN: usize = 16 * 1024;

#[derive(Debug, Parser)]
#[command(name = "b3hash", version, about = "Hash stdin with BLAKE3", long_about = None)]
struct Cli {
  /// Output length in bytes
  #[arg(short, long, default_value_t = 32)]
  length: usize,

  /// Keyed hashing with a 32-byte key given as 64 hex characters
  #[arg(short, long, value_name = "HEX", conflicts_with = "derive_key")]
  keyed: Option<String>,

  /// Key derivation under this context string
  #[arg(short, long, value_name = "CONTEXT")]
  derive_key: Option<String>,

  /// First 64-byte output block to print
  #[arg(short, long, value_name = "BLOCK", default_value_t = 0)]
  seek: u64,

  /// Backend to use: a name from --list, `fastest` or `cycle`
  #[arg(short, long = "impl", value_name = "NAME")]
  implementation: Option<String>,

  /// List supported backends, marking the active one
  #[arg(long)]
  list: bool,

  /// Measure every backend and record the fastest
  #[arg(long)]
  bench: bool,
}

fn main() -> ExitCode {
  init_logging();
  let cli = Cli::parse();
  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::from(2)
    }
  }
}

fn init_logging() {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();
}

fn run(cli: &Cli) -> Result<()> {
  if let Some(name) = &cli.implementation {
    b3::select_backend_by_name(name).with_context(|| format!("cannot use backend `{name}`"))?;
  }

  if cli.bench {
    return bench();
  }
  if cli.list {
    return list();
  }

  let hasher = build_hasher(cli)?;
  tracing::info!(backend = b3::active_backend_name(), "hashing stdin");

  let start = cycles::Stamp::now();
  let hasher = hash_stdin(hasher)?;
  let output = hasher.finalize_seek(cli.seek, cli.length);
  let elapsed = start.elapsed();

  let mut stdout = io::stdout().lock();
  writeln!(stdout, "{} cycles={elapsed}", hex::encode(output)).context("writing output")?;
  Ok(())
}

fn build_hasher(cli: &Cli) -> Result<Hasher> {
  match (&cli.keyed, &cli.derive_key) {
    (Some(key), _) => {
      let key = hex::decode(key.trim()).context("--keyed expects hex")?;
      Ok(Hasher::init_keyed(&key)?)
    }
    (None, Some(context)) => Ok(Hasher::new_derive_key(context)),
    (None, None) => Ok(Hasher::new()),
  }
}

fn hash_stdin(hasher: Hasher) -> Result<Hasher> {
  let mut reader = DigestReader::with_hasher(io::stdin().lock(), hasher);
  let mut buf = vec![0u8; BUF_LEN];
  loop {
    match reader.read(&mut buf) {
      Ok(0) => break,
      Ok(_) => {}
      Err(err) if err.kind() == ErrorKind::Interrupted => {}
      Err(err) => return Err(err).context("reading stdin"),
    }
  }
  let (_, hasher) = reader.into_parts();
  tracing::debug!(bytes = hasher.count(), "stdin exhausted");
  Ok(hasher)
}

fn list() -> Result<()> {
  let active = b3::active_backend_id();
  let mut stdout = io::stdout().lock();
  for (id, backend) in b3::supported_backends() {
    let marker = if id == active { '*' } else { ' ' };
    writeln!(stdout, "{marker} {id} {:<8} degree={}", backend.name(), backend.degree())?;
  }
  Ok(())
}

fn bench() -> Result<()> {
  let calibration = b3::calibrate(b3::selector());
  let mut stdout = io::stdout().lock();
  for report in &calibration.reports {
    write!(stdout, "{:<8}", report.name)?;
    for sample in &report.samples {
      write!(stdout, " {}KiB={:.0}MiB/s", sample.size / 1024, sample.mib_per_sec)?;
    }
    writeln!(stdout)?;
  }
  writeln!(stdout, "fastest: {} (at {} KiB)", calibration.fastest_name(), calibration.reference_size / 1024)?;
  Ok(())
}
