//! Error type for `revise-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A `revisions.day_number` value outside 2, 7 and 14.
  #[error("invalid stored day number: {0}")]
  InvalidDayNumber(i64),

  /// A stored topic does not have exactly one row per day offset.
  #[error("topic {0} has a malformed revision schedule")]
  MalformedSchedule(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
