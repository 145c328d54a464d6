//! Error types for `orgdir-core`.
//!
//! "Not found" is deliberately absent from this taxonomy: an unknown person,
//! an empty function list, or a missing manager link are valid, complete
//! results and are expressed in types (`Option`, empty collections).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Transport-level failure (connection refused, timeout). Fatal for the
  /// current request; the core never retries.
  #[error("backend unavailable: {reason}")]
  BackendUnavailable { reason: String },

  /// The backend understood the request and refused it (4xx-equivalent).
  /// The response body is kept verbatim for diagnosis of the remote service.
  #[error("backend rejected request (status {status}): {body}")]
  BackendRejected { status: u16, body: String },

  /// Malformed caller input (unknown search type, unrecognised filter key).
  /// Raised before any backend call is made.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// Malformed configuration. Raised before any backend call is made.
  #[error("invalid setting: {0}")]
  InvalidSetting(String),

  /// A sub-fetch failed inside a multi-call assembly while its siblings
  /// succeeded. Wraps the underlying failure so callers can tell a partial
  /// failure from a total one.
  #[error("assembly gap in {context}: {source}")]
  AssemblyGap {
    context: String,
    #[source]
    source:  Box<Error>,
  },
}

impl Error {
  pub fn unavailable(reason: impl Into<String>) -> Self {
    Error::BackendUnavailable { reason: reason.into() }
  }

  pub fn gap(context: impl Into<String>, source: Error) -> Self {
    Error::AssemblyGap {
      context: context.into(),
      source:  Box::new(source),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
