//! Flattening per-topic checkpoints into revision records.
//!
//! A [`RevisionRecord`] joins one checkpoint to its topic and subject. Records
//! are never stored; every view below is recomputed from the resolved topics
//! on each refresh. All list outputs share one total order: date, then the
//! palette priority of the day offset, then subject name, topic name and
//! topic id.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  status::Palette,
  subject::Subject,
  topic::{DayOffset, ResolvedTopic, RevisionCheckpoint},
};

// ─── Record ──────────────────────────────────────────────────────────────────

/// One checkpoint annotated with its topic and subject context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
  #[serde(rename = "id")]
  pub topic_id:      Uuid,
  pub topic_name:    String,
  pub notes:         String,
  pub subject_id:    Uuid,
  pub subject_name:  String,
  pub day_number:    DayOffset,
  pub revision_date: NaiveDate,
  pub completed:     bool,
}

impl RevisionRecord {
  fn new(resolved: &ResolvedTopic, checkpoint: &RevisionCheckpoint) -> Self {
    let topic = &resolved.topic;
    Self {
      topic_id:      topic.topic_id,
      topic_name:    topic.name.clone(),
      notes:         topic.notes.clone(),
      subject_id:    topic.subject_id,
      subject_name:  resolved.subject_name.clone(),
      day_number:    checkpoint.day_number,
      revision_date: checkpoint.date,
      completed:     checkpoint.completed,
    }
  }

  pub fn palette(&self) -> Palette { self.day_number.palette() }

  pub fn is_pending(&self) -> bool { !self.completed }

  fn sort_key(&self) -> (NaiveDate, u8, &str, &str, Uuid) {
    (
      self.revision_date,
      self.palette().priority(),
      &self.subject_name,
      &self.topic_name,
      self.topic_id,
    )
  }
}

/// Sort `records` into the canonical display order.
pub fn sort_records(records: &mut [RevisionRecord]) {
  records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

// ─── Flattening ──────────────────────────────────────────────────────────────

/// The three records for a single topic, in schedule order.
pub fn records_for(
  resolved: &ResolvedTopic,
) -> impl Iterator<Item = RevisionRecord> + '_ {
  resolved
    .topic
    .revision_dates
    .iter()
    .map(move |cp| RevisionRecord::new(resolved, cp))
}

fn collect_where(
  topics: &[ResolvedTopic],
  keep: impl Fn(&RevisionRecord) -> bool,
) -> Vec<RevisionRecord> {
  let mut out: Vec<_> = topics
    .iter()
    .flat_map(records_for)
    .filter(|r| keep(r))
    .collect();
  sort_records(&mut out);
  out
}

/// Every record of every topic: exactly three per topic.
pub fn records(topics: &[ResolvedTopic]) -> Vec<RevisionRecord> {
  collect_where(topics, |_| true)
}

/// Records due on `now`'s calendar date, completed or not.
pub fn today(topics: &[ResolvedTopic], now: DateTime<Utc>) -> Vec<RevisionRecord> {
  let day = now.date_naive();
  collect_where(topics, |r| r.revision_date == day)
}

/// Records due on `now`'s calendar date that are not yet completed.
pub fn pending_today(
  topics: &[ResolvedTopic],
  now: DateTime<Utc>,
) -> Vec<RevisionRecord> {
  let day = now.date_naive();
  collect_where(topics, |r| r.revision_date == day && r.is_pending())
}

/// Records dated strictly after `now`'s calendar date.
pub fn upcoming(
  topics: &[ResolvedTopic],
  now: DateTime<Utc>,
) -> Vec<RevisionRecord> {
  let day = now.date_naive();
  collect_where(topics, |r| r.revision_date > day)
}

/// Records dated strictly before `now`'s calendar date.
pub fn past(topics: &[ResolvedTopic], now: DateTime<Utc>) -> Vec<RevisionRecord> {
  let day = now.date_naive();
  collect_where(topics, |r| r.revision_date < day)
}

/// For each topic, its earliest incomplete checkpoint after today. Topics with
/// nothing left in the future contribute nothing.
pub fn next_due(
  topics: &[ResolvedTopic],
  now: DateTime<Utc>,
) -> Vec<RevisionRecord> {
  let day = now.date_naive();
  let mut out: Vec<_> = topics
    .iter()
    .filter_map(|t| {
      records_for(t)
        .filter(|r| r.is_pending() && r.revision_date > day)
        .min_by_key(|r| r.revision_date)
    })
    .collect();
  sort_records(&mut out);
  out
}

// ─── Partitions ──────────────────────────────────────────────────────────────

/// The disjoint date partitions of all records relative to one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
  pub past:     Vec<RevisionRecord>,
  pub today:    Vec<RevisionRecord>,
  pub upcoming: Vec<RevisionRecord>,
}

impl Partition {
  pub fn len(&self) -> usize {
    self.past.len() + self.today.len() + self.upcoming.len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

pub fn partition(topics: &[ResolvedTopic], now: DateTime<Utc>) -> Partition {
  let day = now.date_naive();
  let mut out = Partition::default();
  for record in records(topics) {
    match record.revision_date.cmp(&day) {
      std::cmp::Ordering::Less => out.past.push(record),
      std::cmp::Ordering::Equal => out.today.push(record),
      std::cmp::Ordering::Greater => out.upcoming.push(record),
    }
  }
  out
}

// ─── Lookup over an aggregated set ───────────────────────────────────────────

/// Exact-date filter; keeps the input order.
pub fn for_date(records: &[RevisionRecord], date: NaiveDate) -> Vec<RevisionRecord> {
  records
    .iter()
    .filter(|r| r.revision_date == date)
    .cloned()
    .collect()
}

pub fn group_by_date(
  records: &[RevisionRecord],
) -> BTreeMap<NaiveDate, Vec<RevisionRecord>> {
  let mut groups: BTreeMap<NaiveDate, Vec<RevisionRecord>> = BTreeMap::new();
  for record in records {
    groups
      .entry(record.revision_date)
      .or_default()
      .push(record.clone());
  }
  groups
}

// ─── Subject roll-up ─────────────────────────────────────────────────────────

/// Per-subject counts for the subject list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectOverview {
  pub subject:          Subject,
  pub topic_count:      usize,
  pub completed_topics: usize,
  /// Incomplete checkpoints dated today.
  pub due_today:        usize,
}

/// Roll topics up into their subjects, preserving the order of `subjects`.
/// Topics whose subject is not in `subjects` are ignored.
pub fn subject_overview(
  subjects: &[Subject],
  topics: &[ResolvedTopic],
  now: DateTime<Utc>,
) -> Vec<SubjectOverview> {
  let day = now.date_naive();
  subjects
    .iter()
    .map(|subject| {
      let owned = topics
        .iter()
        .filter(|t| t.topic.subject_id == subject.subject_id);
      let mut overview = SubjectOverview {
        subject:          subject.clone(),
        topic_count:      0,
        completed_topics: 0,
        due_today:        0,
      };
      for t in owned {
        overview.topic_count += 1;
        if t.topic.status() == crate::status::TopicStatus::Complete {
          overview.completed_topics += 1;
        }
        overview.due_today += t
          .topic
          .revision_dates
          .iter()
          .filter(|c| c.date == day && !c.completed)
          .count();
      }
      overview
    })
    .collect()
}
