//! Environment configuration.
//!
//! | variable  | values |
//! |-----------|--------|
//! | `B3_IMPL` | a backend name (`generic`, `sse2`, `sse41`, `avx2`, `avx512`), `fastest` or `cycle` |
//!
//! The process-wide selector reads the environment once, on first use.
//! Platform detection separately honors `B3_FORCE_AVX512`.

use alloc::string::String;

use crate::error::Error;
use crate::select::BackendSelector;

/// Environment variable naming the backend to use.
pub const IMPL_ENV: &str = "B3_IMPL";

/// Selection settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
  /// Backend name, `"fastest"` or `"cycle"`.
  pub implementation: Option<String>,
}

impl Config {
  /// Read [`IMPL_ENV`]. Unset or blank means no preference.
  #[cfg(feature = "std")]
  #[must_use]
  pub fn from_env() -> Self {
    let implementation = std::env::var(IMPL_ENV)
      .ok()
      .map(|value| String::from(value.trim()))
      .filter(|value| !value.is_empty());
    Self { implementation }
  }

  /// Hand the configured name to `selector`.
  ///
  /// On a deferred selector the name is recorded and takes effect when the
  /// selector resolves.
  ///
  /// # Errors
  ///
  /// [`Error::BackendNotFound`] when the name matches no supported backend.
  /// The selector is left untouched.
  pub fn apply(&self, selector: &BackendSelector) -> Result<(), Error> {
    let Some(name) = self.implementation.as_deref() else {
      return Ok(());
    };
    match selector.select_by_name(name) {
      Ok(()) => {
        log::debug!("{IMPL_ENV}={name} applied ({} mode)", selector.mode().as_str());
        Ok(())
      }
      Err(err) => {
        log::warn!("ignoring {IMPL_ENV}={name}: {err}");
        Err(Error::from_select(err, name))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use backend::{Mode, Selector};

  use super::*;
  use crate::backends::REGISTRY;

  fn config(name: &str) -> Config {
    Config { implementation: Some(name.into()) }
  }

  #[test]
  fn empty_config_is_a_no_op() {
    let selector = Selector::deferred(&REGISTRY);
    Config::default().apply(&selector).unwrap();
    assert_eq!(selector.mode(), Mode::Pending);
    assert_eq!(selector.pending_id(), None);
  }

  #[test]
  fn name_is_deferred_until_resolve() {
    let selector = Selector::deferred(&REGISTRY);
    config("generic").apply(&selector).unwrap();
    assert_eq!(selector.pending_id(), Some(0));
    selector.resolve_deferred();
    assert_eq!(selector.mode(), Mode::User);
    assert_eq!(selector.current_ops().name(), "generic");
  }

  #[test]
  fn cycle_applies_immediately() {
    let selector = Selector::deferred(&REGISTRY);
    config("cycle").apply(&selector).unwrap();
    assert_eq!(selector.mode(), Mode::Cycle);
  }

  #[test]
  fn unknown_name_leaves_selector_pending() {
    let selector = Selector::deferred(&REGISTRY);
    assert_eq!(config("mmx").apply(&selector), Err(Error::BackendNotFound("mmx".into())));
    assert_eq!(selector.mode(), Mode::Pending);
    selector.resolve_deferred();
    assert_eq!(selector.mode(), Mode::Fastest);
    assert_eq!(selector.current_id(), 0);
  }
}
