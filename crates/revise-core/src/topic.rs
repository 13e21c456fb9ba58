//! Topic types: a study item owning exactly three revision checkpoints.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use uuid::Uuid;

use crate::Error;

// ─── Day offsets ─────────────────────────────────────────────────────────────

/// The fixed set of review points, counted in days after topic creation.
///
/// Serialised as the bare number (`2`, `7` or `14`).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  EnumIter,
  Serialize,
  Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum DayOffset {
  Two,
  Seven,
  Fourteen,
}

impl DayOffset {
  /// All offsets in schedule order.
  pub const ALL: [DayOffset; 3] = [Self::Two, Self::Seven, Self::Fourteen];

  pub const fn days(self) -> u32 {
    match self {
      Self::Two => 2,
      Self::Seven => 7,
      Self::Fourteen => 14,
    }
  }
}

impl TryFrom<u32> for DayOffset {
  type Error = Error;

  fn try_from(days: u32) -> Result<Self, Self::Error> {
    match days {
      2 => Ok(Self::Two),
      7 => Ok(Self::Seven),
      14 => Ok(Self::Fourteen),
      other => Err(Error::InvalidCheckpoint(other)),
    }
  }
}

impl From<DayOffset> for u32 {
  fn from(offset: DayOffset) -> Self { offset.days() }
}

impl fmt::Display for DayOffset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "day {}", self.days())
  }
}

// ─── Checkpoints ─────────────────────────────────────────────────────────────

/// One scheduled review of a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionCheckpoint {
  /// Creation date plus the day offset; date-only.
  pub date:       NaiveDate,
  pub day_number: DayOffset,
  /// Once set, never cleared.
  pub completed:  bool,
}

// ─── Topic ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
  #[serde(rename = "id")]
  pub topic_id:       Uuid,
  pub subject_id:     Uuid,
  pub name:           String,
  #[serde(default)]
  pub notes:          String,
  pub created_at:     DateTime<Utc>,
  /// Ordered by day offset: 2, 7, 14.
  pub revision_dates: [RevisionCheckpoint; 3],
}

/// A topic bundled with the display name of its owning subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTopic {
  #[serde(flatten)]
  pub topic:        Topic,
  pub subject_name: String,
}

/// Placeholder used when a topic's subject can no longer be resolved.
pub const UNKNOWN_SUBJECT: &str = "Unknown";

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::StudyStore::create_topic`].
/// The schedule and `created_at` are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTopic {
  pub subject_id: Uuid,
  pub name:       String,
  #[serde(default)]
  pub notes:      String,
}

/// Partial update for a topic; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

impl TopicPatch {
  pub fn is_empty(&self) -> bool { self.name.is_none() && self.notes.is_none() }
}
