//! Subject: the top-level grouping of topics (e.g. a course).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A named collection of topics. Deleting a subject removes every topic it
/// owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  #[serde(rename = "id")]
  pub subject_id: Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Trim `raw` and reject it if nothing is left.
///
/// `field` names the offending input in the resulting
/// [`Error::Validation`].
pub fn validate_name(field: &'static str, raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation(field));
  }
  Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validate_name_trims() {
    assert_eq!(validate_name("name", "  Biology ").unwrap(), "Biology");
  }

  #[test]
  fn validate_name_rejects_blank() {
    let err = validate_name("subject name", "   ").unwrap_err();
    assert!(matches!(err, Error::Validation("subject name")));
    assert!(validate_name("name", "").is_err());
  }
}
