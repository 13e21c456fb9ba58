//! The application flows that sit between a presentation layer and a
//! [`StudyStore`]: input validation, topic creation with reminder scheduling,
//! checkpoint completion, and the home-view refresh cycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::{self, RevisionRecord, SubjectOverview},
  calendar::{CalendarIndex, Selection},
  notify::{Notifier, Silent, reminders_for},
  status::{Completion, mark_completed},
  store::StudyStore,
  subject::{Subject, validate_name},
  topic::{DayOffset, NewTopic, ResolvedTopic, TopicPatch},
};

// ─── Service ─────────────────────────────────────────────────────────────────

/// Study-tracker operations over a store and a reminder sink.
///
/// Holds no view state of its own; see [`HomeState`] for that.
pub struct StudyService<S, N = Silent> {
  store:    S,
  notifier: N,
}

impl<S: StudyStore> StudyService<S> {
  /// A service that never schedules reminders.
  pub fn without_reminders(store: S) -> Self { Self::new(store, Silent) }
}

impl<S: StudyStore, N: Notifier> StudyService<S, N> {
  pub fn new(store: S, notifier: N) -> Self { Self { store, notifier } }

  pub fn store(&self) -> &S { &self.store }

  // ── Subjects ──────────────────────────────────────────────────────────

  pub async fn subjects(&self) -> Result<Vec<Subject>> {
    self.store.list_subjects().await.map_err(Error::store)
  }

  pub async fn subject(&self, id: Uuid) -> Result<Subject> {
    self
      .store
      .get_subject(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound(id))
  }

  pub async fn create_subject(&self, name: &str) -> Result<Subject> {
    let name = validate_name("subject name", name)?;
    self.store.create_subject(name).await.map_err(Error::store)
  }

  pub async fn rename_subject(&self, id: Uuid, name: &str) -> Result<Subject> {
    let name = validate_name("subject name", name)?;
    self
      .store
      .rename_subject(id, name)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound(id))
  }

  pub async fn delete_subject(&self, id: Uuid) -> Result<()> {
    let deleted = self.store.delete_subject(id).await.map_err(Error::store)?;
    if !deleted {
      return Err(Error::SubjectNotFound(id));
    }
    Ok(())
  }

  // ── Topics ────────────────────────────────────────────────────────────

  pub async fn topics(&self, subject_id: Uuid) -> Result<Vec<ResolvedTopic>> {
    self
      .store
      .list_topics(subject_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound(subject_id))
  }

  pub async fn topic(&self, id: Uuid) -> Result<ResolvedTopic> {
    self
      .store
      .get_topic(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::TopicNotFound(id))
  }

  /// Create a topic and schedule a reminder for each checkpoint still in the
  /// future relative to `now`.
  ///
  /// Reminder failures are logged and do not fail the call: the topic is
  /// already stored at that point.
  pub async fn create_topic(
    &self,
    subject_id: Uuid,
    name: &str,
    notes: &str,
    now: DateTime<Utc>,
  ) -> Result<ResolvedTopic> {
    let input = NewTopic {
      subject_id,
      name: validate_name("topic name", name)?,
      notes: notes.trim().to_owned(),
    };

    let topic = self
      .store
      .create_topic(input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubjectNotFound(subject_id))?;

    for reminder in reminders_for(&topic, now) {
      let day = reminder.day_number;
      if let Err(e) = self.notifier.schedule(reminder).await {
        warn!(
          topic_id = %topic.topic.topic_id,
          %day,
          error = %e,
          "failed to schedule revision reminder"
        );
      }
    }

    Ok(topic)
  }

  pub async fn update_topic(
    &self,
    id: Uuid,
    mut patch: TopicPatch,
  ) -> Result<ResolvedTopic> {
    if patch.is_empty() {
      return Err(Error::Validation("name or notes"));
    }
    if let Some(name) = &patch.name {
      patch.name = Some(validate_name("topic name", name)?);
    }
    if let Some(notes) = &mut patch.notes {
      *notes = notes.trim().to_owned();
    }

    self
      .store
      .update_topic(id, patch)
      .await
      .map_err(Error::store)?
      .ok_or(Error::TopicNotFound(id))
  }

  pub async fn delete_topic(&self, id: Uuid) -> Result<()> {
    let deleted = self.store.delete_topic(id).await.map_err(Error::store)?;
    if !deleted {
      return Err(Error::TopicNotFound(id));
    }
    Ok(())
  }

  // ── Revisions ─────────────────────────────────────────────────────────

  /// Mark the checkpoint at `day` completed and persist it.
  ///
  /// `topic` is only updated once the store has accepted the change; on
  /// failure it is left as it was. An already-completed checkpoint is a
  /// no-op and does not touch the store.
  pub async fn complete_revision(
    &self,
    topic: &mut ResolvedTopic,
    day: u32,
  ) -> Result<Completion> {
    let mut marked = topic.topic.clone();
    let outcome = mark_completed(&mut marked, day)?;
    if outcome == Completion::AlreadyCompleted {
      return Ok(outcome);
    }

    let id = topic.topic.topic_id;
    let offset = DayOffset::try_from(day)?;
    let stored = self
      .store
      .complete_revision(id, offset)
      .await
      .map_err(Error::store)?
      .ok_or(Error::TopicNotFound(id))?;

    *topic = stored;
    Ok(outcome)
  }

  // ── Home view ─────────────────────────────────────────────────────────

  /// Fetch subjects and topics concurrently and derive the home view.
  ///
  /// A failed fetch degrades only the sections that depend on it. Subject
  /// counts are zero when topics could not be fetched.
  pub async fn refresh(&self, now: DateTime<Utc>) -> HomeView {
    let (subjects, topics) =
      tokio::join!(self.store.list_subjects(), self.store.list_all_topics());

    let topics = topics.map_err(|e| {
      warn!(error = %e, "failed to fetch topics");
      e.to_string()
    });
    let subjects = subjects.map_err(|e| {
      warn!(error = %e, "failed to fetch subjects");
      e.to_string()
    });

    let loaded: &[ResolvedTopic] = topics.as_deref().unwrap_or_default();
    debug!(topics = loaded.len(), "aggregating revisions");

    let section = |f: fn(&[ResolvedTopic], DateTime<Utc>) -> Vec<RevisionRecord>| {
      match &topics {
        Ok(t) => Section::Ready(f(t, now)),
        Err(e) => Section::Failed(e.clone()),
      }
    };

    HomeView {
      as_of:    now,
      today:    section(aggregate::today),
      upcoming: section(aggregate::upcoming),
      subjects: match subjects {
        Ok(s) => Section::Ready(aggregate::subject_overview(&s, loaded, now)),
        Err(e) => Section::Failed(e),
      },
      records:  aggregate::records(loaded),
    }
  }
}

// ─── View model ──────────────────────────────────────────────────────────────

/// One independently-loaded part of a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
  Ready(T),
  /// The fetch behind this section failed; carries a user-facing message.
  Failed(String),
}

impl<T> Section<T> {
  pub fn ready(&self) -> Option<&T> {
    match self {
      Self::Ready(v) => Some(v),
      Self::Failed(_) => None,
    }
  }
}

/// Everything the home screen shows, derived from one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeView {
  pub as_of:    DateTime<Utc>,
  pub subjects: Section<Vec<SubjectOverview>>,
  pub today:    Section<Vec<RevisionRecord>>,
  pub upcoming: Section<Vec<RevisionRecord>>,
  /// Every record, past ones included; empty if topics failed to load.
  pub records:  Vec<RevisionRecord>,
}

impl HomeView {
  pub fn today_date(&self) -> NaiveDate { self.as_of.date_naive() }

  pub fn calendar(&self, selection: &Selection) -> CalendarIndex {
    selection.index(&self.records, self.today_date())
  }

  pub fn revisions_on(&self, date: NaiveDate) -> Vec<RevisionRecord> {
    aggregate::for_date(&self.records, date)
  }
}

// ─── Refresh ordering ────────────────────────────────────────────────────────

/// Issued by [`HomeState::begin_refresh`]; orders overlapping refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Long-lived home-screen state: the latest applied view and the selection.
#[derive(Debug, Clone)]
pub struct HomeState {
  issued:    u64,
  applied:   Option<RefreshTicket>,
  view:      Option<HomeView>,
  selection: Selection,
}

impl HomeState {
  pub fn new(today: NaiveDate) -> Self {
    Self {
      issued:    0,
      applied:   None,
      view:      None,
      selection: Selection::new(today),
    }
  }

  pub fn begin_refresh(&mut self) -> RefreshTicket {
    self.issued += 1;
    RefreshTicket(self.issued)
  }

  /// Install `view` unless a newer refresh has already been applied.
  /// Returns whether the view was installed.
  pub fn apply(&mut self, ticket: RefreshTicket, view: HomeView) -> bool {
    if self.applied.is_some_and(|latest| ticket <= latest) {
      debug!(?ticket, "discarding stale refresh");
      return false;
    }
    self.applied = Some(ticket);
    self.view = Some(view);
    true
  }

  pub fn view(&self) -> Option<&HomeView> { self.view.as_ref() }

  pub fn select(&mut self, date: NaiveDate) { self.selection.select(date); }

  pub fn selection(&self) -> &Selection { &self.selection }

  /// The calendar for the current view and selection, rebuilt on each call.
  pub fn calendar(&self) -> Option<CalendarIndex> {
    self.view.as_ref().map(|v| v.calendar(&self.selection))
  }

  pub fn selected_revisions(&self) -> Vec<RevisionRecord> {
    self
      .view
      .as_ref()
      .map(|v| v.revisions_on(self.selection.selected()))
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests;
