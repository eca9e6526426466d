//! The process-wide backend selector and its free-function API.
//!
//! The global selector starts in deferred mode. The first call to
//! [`selector`] applies `B3_IMPL` (with `std`) and resolves the selection, so
//! a backend named in the environment is in place before anything is hashed.

use backend::{Choice, OnceCache, Registry, Selector};

use crate::backends::{Backend, REGISTRY};
use crate::error::Error;

/// Registry of [`Backend`] descriptors.
pub type BackendRegistry = Registry<Backend>;

/// Selector over the backend registry.
pub type BackendSelector = Selector<Backend>;

static GLOBAL: BackendSelector = Selector::deferred(&REGISTRY);
static CONFIGURED: OnceCache<()> = OnceCache::new();

fn configure() {
  #[cfg(feature = "std")]
  {
    if let Err(err) = crate::config::Config::from_env().apply(&GLOBAL) {
      log::debug!("keeping default backend selection: {err}");
    }
  }
  if GLOBAL.mode() == backend::Mode::Pending {
    GLOBAL.resolve_deferred();
  }
}

/// The process-wide selector, configured on first use.
///
/// Without `B3_IMPL` it starts in `Fastest` mode with the generic backend
/// recorded as fastest. Run `b3::calibrate` (feature `std`) once at startup
/// (or [`set_fastest_backend`]) to move hashing onto the best SIMD backend.
#[inline]
#[must_use]
pub fn selector() -> &'static BackendSelector {
  CONFIGURED.get_or_init(configure);
  &GLOBAL
}

/// The static backend registry.
#[inline]
#[must_use]
pub fn registry() -> &'static BackendRegistry {
  &REGISTRY
}

/// Number of backends this CPU can run.
#[must_use]
pub fn supported_backend_count() -> u32 {
  REGISTRY.count_supported()
}

/// Supported backends with their ids.
pub fn supported_backends() -> impl Iterator<Item = (u32, &'static Backend)> {
  REGISTRY.iter()
}

/// The backend [`Hasher`](crate::Hasher)s use right now.
#[must_use]
pub fn active_backend() -> &'static Backend {
  selector().current_ops()
}

#[must_use]
pub fn active_backend_id() -> u32 {
  selector().current_id()
}

#[must_use]
pub fn active_backend_name() -> &'static str {
  active_backend().name()
}

/// Record `id` as the fastest backend. Takes effect in `fastest` mode.
pub fn set_fastest_backend(id: u32) {
  selector().record_fastest(id);
}

/// See [`Selector::select_by_id`].
pub fn select_backend_by_id(choice: Choice) {
  selector().select_by_id(choice);
}

/// Select a backend by name, or `"fastest"` / `"cycle"`.
///
/// # Errors
///
/// [`Error::BackendNotFound`] if no supported backend has that name; the
/// selection is left unchanged.
pub fn select_backend_by_name(name: &str) -> Result<(), Error> {
  selector().select_by_name(name).map_err(|err| Error::from_select(err, name))
}

/// Re-resolve the configured mode. See [`Selector::resolve_deferred`].
pub fn apply_deferred_selection() {
  selector().resolve_deferred();
}
