//! Selection errors.

/// Why a selection request could not be honored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
  /// No supported implementation has the requested name.
  #[error("no supported implementation has that name")]
  NotFound,
  /// The registry has no supported implementation at all.
  #[error("no supported implementation is registered")]
  NoSupported,
}
