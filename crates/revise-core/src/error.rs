//! Error types for `revise-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A required text field was empty or whitespace.
  #[error("{0} must not be empty")]
  Validation(&'static str),

  #[error("no revision checkpoint at day {0}")]
  InvalidCheckpoint(u32),

  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("topic not found: {0}")]
  TopicNotFound(Uuid),

  /// The backing store could not be reached or rejected the request.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
