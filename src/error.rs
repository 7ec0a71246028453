//! Error types for the data access layer.

use thiserror::Error;

/// Result type alias for repository operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced to callers of the repository.
///
/// Every variant renders as a human-readable message; callers match on the
/// variant to tell validation failures apart from missing records, ownership
/// violations, and remote store faults.
#[derive(Debug, Error)]
pub enum Error {
  /// A submission failed a schema rule. Raised before any network call;
  /// `field` names the first rule violated.
  #[error("{message}")]
  Validation {
    field: &'static str,
    message: String,
  },

  /// No authenticated user at the time of a user-scoped call.
  #[error("User not authenticated")]
  Unauthenticated,

  /// The referenced id has no parent row in the store.
  #[error("Recipe not found: {id}")]
  NotFound { id: String },

  /// The authenticated user does not own the referenced recipe.
  #[error("Not authorized to modify recipe {id}")]
  Forbidden { id: String },

  /// The remote store reported a failure on some call.
  #[error(transparent)]
  Store(#[from] StoreError),
}

impl Error {
  pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation {
      field,
      message: message.into(),
    }
  }
}

/// Failures reported by the remote store or its transport.
///
/// The store's own message is carried through verbatim, never reinterpreted.
#[derive(Debug, Error)]
pub enum StoreError {
  /// The HTTP transport failed before a response was produced.
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The store answered with an error status; `message` is the store's own.
  #[error("{message}")]
  Api { status: u16, message: String },

  /// The store's response body could not be decoded.
  #[error("unexpected response from store: {0}")]
  Decode(#[from] serde_json::Error),
}
