//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width so
//! that lexical order matches chronological order. Checkpoint dates are ISO
//! 8601 dates. UUIDs are stored as hyphenated lowercase strings.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use revise_core::{
  subject::Subject,
  topic::{DayOffset, ResolvedTopic, RevisionCheckpoint, Topic, UNKNOWN_SUBJECT},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> / NaiveDate ───────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DayOffset ───────────────────────────────────────────────────────────────

pub fn encode_day(day: DayOffset) -> i64 { i64::from(day.days()) }

pub fn decode_day(raw: i64) -> Result<DayOffset> {
  u32::try_from(raw)
    .ok()
    .and_then(|days| DayOffset::try_from(days).ok())
    .ok_or(Error::InvalidDayNumber(raw))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id: String,
  pub name:       String,
  pub created_at: String,
}

impl RawSubject {
  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id: decode_uuid(&self.subject_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `topics` row left-joined with its subject's name.
pub struct RawTopic {
  pub topic_id:     String,
  pub subject_id:   String,
  pub subject_name: Option<String>,
  pub name:         String,
  pub notes:        String,
  pub created_at:   String,
}

/// A `revisions` row.
pub struct RawRevision {
  pub topic_id:   String,
  pub day_number: i64,
  pub due_on:     String,
  pub completed:  bool,
}

impl RawRevision {
  fn into_checkpoint(self) -> Result<RevisionCheckpoint> {
    Ok(RevisionCheckpoint {
      date:       decode_date(&self.due_on)?,
      day_number: decode_day(self.day_number)?,
      completed:  self.completed,
    })
  }
}

impl RawTopic {
  fn into_resolved(self, mut checkpoints: Vec<RevisionCheckpoint>) -> Result<ResolvedTopic> {
    let topic_id = decode_uuid(&self.topic_id)?;
    checkpoints.sort_by_key(|c| c.day_number);
    let revision_dates: [RevisionCheckpoint; 3] = checkpoints
      .try_into()
      .map_err(|_| Error::MalformedSchedule(topic_id))?;

    Ok(ResolvedTopic {
      topic:        Topic {
        topic_id,
        subject_id: decode_uuid(&self.subject_id)?,
        name: self.name,
        notes: self.notes,
        created_at: decode_dt(&self.created_at)?,
        revision_dates,
      },
      subject_name: self
        .subject_name
        .unwrap_or_else(|| UNKNOWN_SUBJECT.to_owned()),
    })
  }
}

/// Join topic rows with their revision rows, keeping the topic order.
pub fn assemble_topics(
  topics: Vec<RawTopic>,
  revisions: Vec<RawRevision>,
) -> Result<Vec<ResolvedTopic>> {
  let mut by_topic: HashMap<String, Vec<RevisionCheckpoint>> = HashMap::new();
  for raw in revisions {
    let key = raw.topic_id.clone();
    by_topic.entry(key).or_default().push(raw.into_checkpoint()?);
  }

  topics
    .into_iter()
    .map(|t| {
      let checkpoints = by_topic.remove(&t.topic_id).unwrap_or_default();
      t.into_resolved(checkpoints)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a: DateTime<Utc> = "2024-01-01T10:00:00Z".parse().unwrap();
    let b: DateTime<Utc> = "2024-01-01T10:00:00.5Z".parse().unwrap();
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn bad_day_number_is_rejected() {
    assert!(decode_day(7).is_ok());
    assert!(matches!(decode_day(3), Err(Error::InvalidDayNumber(3))));
    assert!(matches!(decode_day(-2), Err(Error::InvalidDayNumber(-2))));
    assert!(matches!(
      decode_day(i64::from(u32::MAX) + 7),
      Err(Error::InvalidDayNumber(n)) if n == i64::from(u32::MAX) + 7
    ));
  }

  #[test]
  fn topic_without_full_schedule_is_malformed() {
    let raw = RawTopic {
      topic_id:     Uuid::nil().to_string(),
      subject_id:   Uuid::nil().to_string(),
      subject_name: None,
      name:         "Partial".into(),
      notes:        String::new(),
      created_at:   "2024-01-01T00:00:00.000000Z".into(),
    };
    let revision = RawRevision {
      topic_id:   Uuid::nil().to_string(),
      day_number: 2,
      due_on:     "2024-01-03".into(),
      completed:  false,
    };
    let err = assemble_topics(vec![raw], vec![revision]).unwrap_err();
    assert!(matches!(err, Error::MalformedSchedule(id) if id.is_nil()));
  }
}
