//! The `StudyStore` trait.
//!
//! The trait is implemented by storage backends (`revise-store-sqlite`) and by
//! remote clients (`revise-cli` over HTTP). Higher layers depend on this
//! abstraction, not on any concrete backend.
//!
//! Lookups that can miss return `Option` (or `bool` for deletes); `Err` is
//! reserved for the backend itself failing.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  aggregate::RevisionRecord,
  subject::Subject,
  topic::{DayOffset, NewTopic, ResolvedTopic, TopicPatch},
};

/// Abstraction over a study-tracker backend.
///
/// Names are assumed to be validated by the caller. All methods return `Send`
/// futures so the trait can be used in multi-threaded async runtimes.
pub trait StudyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// All subjects, newest first.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  fn create_subject(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Returns `None` if the subject does not exist.
  fn rename_subject(
    &self,
    id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Delete a subject and every topic it owns. Returns `false` if the
  /// subject did not exist.
  fn delete_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Topics ────────────────────────────────────────────────────────────

  /// Topics of one subject, newest first. `None` if the subject does not
  /// exist.
  fn list_topics(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Option<Vec<ResolvedTopic>>, Self::Error>>
  + Send
  + '_;

  /// Every topic across all subjects, newest first.
  fn list_all_topics(
    &self,
  ) -> impl Future<Output = Result<Vec<ResolvedTopic>, Self::Error>> + Send + '_;

  fn get_topic(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ResolvedTopic>, Self::Error>> + Send + '_;

  /// Persist a topic with a freshly generated schedule. `created_at` is set
  /// by the store. Returns `None` if the owning subject does not exist.
  fn create_topic(
    &self,
    input: NewTopic,
  ) -> impl Future<Output = Result<Option<ResolvedTopic>, Self::Error>> + Send + '_;

  /// Returns `None` if the topic does not exist.
  fn update_topic(
    &self,
    id: Uuid,
    patch: TopicPatch,
  ) -> impl Future<Output = Result<Option<ResolvedTopic>, Self::Error>> + Send + '_;

  fn delete_topic(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Revisions ─────────────────────────────────────────────────────────

  /// Mark one checkpoint completed. Idempotent. Returns the updated topic,
  /// or `None` if the topic does not exist.
  fn complete_revision(
    &self,
    topic_id: Uuid,
    day: DayOffset,
  ) -> impl Future<Output = Result<Option<ResolvedTopic>, Self::Error>> + Send + '_;

  /// Records due on the calendar date of `as_of` (defaults to now).
  fn list_revisions_today(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Vec<RevisionRecord>, Self::Error>> + Send + '_;

  /// Records dated after the calendar date of `as_of` (defaults to now).
  fn list_revisions_upcoming(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Vec<RevisionRecord>, Self::Error>> + Send + '_;
}
