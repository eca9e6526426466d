use alloc::string::String;

/// Errors reported by the b3 API.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  /// Key material must be exactly [`KEY_LEN`](crate::KEY_LEN) bytes.
  #[error("key must be {expected} bytes, got {0}", expected = crate::KEY_LEN)]
  InvalidKeyLength(usize),
  /// No supported backend has the requested name.
  #[error("no supported backend named `{0}`")]
  BackendNotFound(String),
  /// The backend registry is empty. The generic backend is always supported,
  /// so this indicates a broken build.
  #[error("no supported backend available")]
  NoSupportedBackend,
}

impl Error {
  pub(crate) fn from_select(err: backend::SelectError, name: &str) -> Self {
    match err {
      backend::SelectError::NotFound => Self::BackendNotFound(name.into()),
      backend::SelectError::NoSupported => Self::NoSupportedBackend,
    }
  }
}
