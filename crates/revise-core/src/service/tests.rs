//! Service flows against an in-memory store and a recording notifier.

use std::sync::{
  Mutex,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::*;
use crate::{
  aggregate,
  notify::Reminder,
  schedule::generate,
  status::TopicStatus,
  topic::{DayOffset, Topic, UNKNOWN_SUBJECT},
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("store offline")]
struct Offline;

#[derive(Default)]
struct MemoryStore {
  subjects:       Mutex<Vec<Subject>>,
  topics:         Mutex<Vec<Topic>>,
  /// Pinned creation time for new topics.
  clock:          Mutex<Option<DateTime<Utc>>>,
  topics_offline: AtomicBool,
  writes:         AtomicUsize,
}

impl MemoryStore {
  fn now(&self) -> DateTime<Utc> {
    self.clock.lock().unwrap().unwrap_or_else(Utc::now)
  }

  fn resolve(&self, topic: &Topic) -> ResolvedTopic {
    let subject_name = self
      .subjects
      .lock()
      .unwrap()
      .iter()
      .find(|s| s.subject_id == topic.subject_id)
      .map(|s| s.name.clone())
      .unwrap_or_else(|| UNKNOWN_SUBJECT.to_owned());
    ResolvedTopic { topic: topic.clone(), subject_name }
  }

  fn all(&self) -> Vec<ResolvedTopic> {
    let topics = self.topics.lock().unwrap().clone();
    topics.iter().map(|t| self.resolve(t)).collect()
  }
}

impl StudyStore for MemoryStore {
  type Error = Offline;

  async fn list_subjects(&self) -> Result<Vec<Subject>, Offline> {
    Ok(self.subjects.lock().unwrap().clone())
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>, Offline> {
    Ok(
      self
        .subjects
        .lock()
        .unwrap()
        .iter()
        .find(|s| s.subject_id == id)
        .cloned(),
    )
  }

  async fn create_subject(&self, name: String) -> Result<Subject, Offline> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    let subject = Subject {
      subject_id: Uuid::new_v4(),
      name,
      created_at: self.now(),
    };
    self.subjects.lock().unwrap().push(subject.clone());
    Ok(subject)
  }

  async fn rename_subject(
    &self,
    id: Uuid,
    name: String,
  ) -> Result<Option<Subject>, Offline> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    let mut subjects = self.subjects.lock().unwrap();
    Ok(subjects.iter_mut().find(|s| s.subject_id == id).map(|s| {
      s.name = name;
      s.clone()
    }))
  }

  async fn delete_subject(&self, id: Uuid) -> Result<bool, Offline> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    let mut subjects = self.subjects.lock().unwrap();
    let before = subjects.len();
    subjects.retain(|s| s.subject_id != id);
    self.topics.lock().unwrap().retain(|t| t.subject_id != id);
    Ok(subjects.len() != before)
  }

  async fn list_topics(
    &self,
    subject_id: Uuid,
  ) -> Result<Option<Vec<ResolvedTopic>>, Offline> {
    if self.get_subject(subject_id).await?.is_none() {
      return Ok(None);
    }
    Ok(Some(
      self
        .all()
        .into_iter()
        .filter(|t| t.topic.subject_id == subject_id)
        .collect(),
    ))
  }

  async fn list_all_topics(&self) -> Result<Vec<ResolvedTopic>, Offline> {
    if self.topics_offline.load(Ordering::SeqCst) {
      return Err(Offline);
    }
    Ok(self.all())
  }

  async fn get_topic(&self, id: Uuid) -> Result<Option<ResolvedTopic>, Offline> {
    Ok(self.all().into_iter().find(|t| t.topic.topic_id == id))
  }

  async fn create_topic(
    &self,
    input: NewTopic,
  ) -> Result<Option<ResolvedTopic>, Offline> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    if self.get_subject(input.subject_id).await?.is_none() {
      return Ok(None);
    }
    let created_at = self.now();
    let topic = Topic {
      topic_id: Uuid::new_v4(),
      subject_id: input.subject_id,
      name: input.name,
      notes: input.notes,
      created_at,
      revision_dates: generate(created_at),
    };
    self.topics.lock().unwrap().push(topic.clone());
    Ok(Some(self.resolve(&topic)))
  }

  async fn update_topic(
    &self,
    id: Uuid,
    patch: TopicPatch,
  ) -> Result<Option<ResolvedTopic>, Offline> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    let updated = {
      let mut topics = self.topics.lock().unwrap();
      topics.iter_mut().find(|t| t.topic_id == id).map(|t| {
        if let Some(name) = patch.name {
          t.name = name;
        }
        if let Some(notes) = patch.notes {
          t.notes = notes;
        }
        t.clone()
      })
    };
    Ok(updated.map(|t| self.resolve(&t)))
  }

  async fn delete_topic(&self, id: Uuid) -> Result<bool, Offline> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    let mut topics = self.topics.lock().unwrap();
    let before = topics.len();
    topics.retain(|t| t.topic_id != id);
    Ok(topics.len() != before)
  }

  async fn complete_revision(
    &self,
    topic_id: Uuid,
    day: DayOffset,
  ) -> Result<Option<ResolvedTopic>, Offline> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    let updated = {
      let mut topics = self.topics.lock().unwrap();
      topics.iter_mut().find(|t| t.topic_id == topic_id).map(|t| {
        for cp in &mut t.revision_dates {
          if cp.day_number == day {
            cp.completed = true;
          }
        }
        t.clone()
      })
    };
    Ok(updated.map(|t| self.resolve(&t)))
  }

  async fn list_revisions_today(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Vec<RevisionRecord>, Offline> {
    Ok(aggregate::today(&self.all(), as_of.unwrap_or_else(Utc::now)))
  }

  async fn list_revisions_upcoming(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Vec<RevisionRecord>, Offline> {
    Ok(aggregate::upcoming(&self.all(), as_of.unwrap_or_else(Utc::now)))
  }
}

#[derive(Default)]
struct Recorder {
  scheduled: Mutex<Vec<Reminder>>,
  fail:      bool,
}

impl Notifier for Recorder {
  type Error = Offline;

  async fn schedule(&self, reminder: Reminder) -> Result<(), Offline> {
    if self.fail {
      return Err(Offline);
    }
    self.scheduled.lock().unwrap().push(reminder);
    Ok(())
  }
}

fn at(s: &str) -> DateTime<Utc> { s.parse().unwrap() }

fn service_at(created: &str) -> StudyService<MemoryStore, Recorder> {
  let store = MemoryStore::default();
  *store.clock.lock().unwrap() = Some(at(created));
  StudyService::new(store, Recorder::default())
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_names_never_reach_the_store() {
  let svc = service_at("2024-01-01T09:00:00Z");

  assert!(matches!(
    svc.create_subject("  ").await,
    Err(Error::Validation("subject name"))
  ));
  let subject = svc.create_subject("Biology").await.unwrap();
  let writes = svc.store().writes.load(Ordering::SeqCst);

  assert!(matches!(
    svc.rename_subject(subject.subject_id, "").await,
    Err(Error::Validation(_))
  ));
  assert!(matches!(
    svc
      .create_topic(subject.subject_id, "\t", "", at("2024-01-01T09:00:00Z"))
      .await,
    Err(Error::Validation("topic name"))
  ));
  assert_eq!(svc.store().writes.load(Ordering::SeqCst), writes);
}

#[tokio::test]
async fn empty_topic_patch_is_rejected() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let err = svc
    .update_topic(Uuid::new_v4(), TopicPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn update_topic_trims_like_create() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let subject = svc.create_subject("Geography").await.unwrap();
  let topic = svc
    .create_topic(subject.subject_id, "Rivers", "", Utc::now())
    .await
    .unwrap();

  let patch = TopicPatch {
    name:  Some("  Deltas ".into()),
    notes: Some("  sediment  ".into()),
  };
  let updated = svc.update_topic(topic.topic.topic_id, patch).await.unwrap();
  assert_eq!(updated.topic.name, "Deltas");
  assert_eq!(updated.topic.notes, "sediment");
}

// ─── Topic creation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_topic_schedules_future_reminders() {
  let created = at("2024-01-01T09:00:00Z");
  let svc = service_at("2024-01-01T09:00:00Z");
  let subject = svc.create_subject("Chemistry").await.unwrap();

  let topic = svc
    .create_topic(subject.subject_id, " Titration ", " burettes ", created)
    .await
    .unwrap();
  assert_eq!(topic.topic.name, "Titration");
  assert_eq!(topic.topic.notes, "burettes");
  assert_eq!(topic.subject_name, "Chemistry");
  assert_eq!(topic.topic.status(), TopicStatus::None);

  let scheduled = svc.notifier.scheduled.lock().unwrap().clone();
  let triggers: Vec<_> = scheduled.iter().map(|r| r.trigger_at).collect();
  assert_eq!(
    triggers,
    [
      created + Duration::days(2),
      created + Duration::days(7),
      created + Duration::days(14),
    ]
  );
}

#[tokio::test]
async fn backdated_topic_skips_elapsed_reminders() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let subject = svc.create_subject("Chemistry").await.unwrap();

  svc
    .create_topic(subject.subject_id, "Moles", "", at("2024-01-05T00:00:00Z"))
    .await
    .unwrap();

  let scheduled = svc.notifier.scheduled.lock().unwrap();
  let days: Vec<_> = scheduled.iter().map(|r| r.day_number.days()).collect();
  assert_eq!(days, [7, 14]);
}

#[tokio::test]
async fn topic_created_on_a_checkpoint_date_skips_that_reminder() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let subject = svc.create_subject("Chemistry").await.unwrap();

  // Created at 09:00 on Jan 1, so the day-2 checkpoint is Jan 3 at 09:00.
  svc
    .create_topic(subject.subject_id, "Moles", "", at("2024-01-03T08:00:00Z"))
    .await
    .unwrap();

  let scheduled = svc.notifier.scheduled.lock().unwrap();
  let days: Vec<_> = scheduled.iter().map(|r| r.day_number.days()).collect();
  assert_eq!(days, [7, 14]);
}

#[tokio::test]
async fn reminder_failure_does_not_fail_creation() {
  let store = MemoryStore::default();
  let svc = StudyService::new(store, Recorder { fail: true, ..Default::default() });
  let subject = svc.create_subject("Art").await.unwrap();

  let topic = svc
    .create_topic(subject.subject_id, "Perspective", "", Utc::now())
    .await;
  assert!(topic.is_ok());
  assert_eq!(svc.topics(subject.subject_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_topic_under_missing_subject() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let missing = Uuid::new_v4();
  let err = svc
    .create_topic(missing, "Orphan", "", Utc::now())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubjectNotFound(id) if id == missing));
}

// ─── Completion ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn complete_revision_persists_and_is_idempotent() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let subject = svc.create_subject("Maths").await.unwrap();
  let mut topic = svc
    .create_topic(subject.subject_id, "Vectors", "", at("2024-01-01T09:00:00Z"))
    .await
    .unwrap();

  let outcome = svc.complete_revision(&mut topic, 2).await.unwrap();
  assert_eq!(outcome, Completion::Marked);
  assert_eq!(topic.topic.status(), TopicStatus::Partial);

  let stored = svc.topic(topic.topic.topic_id).await.unwrap();
  assert_eq!(stored, topic);
  let done: Vec<_> = stored
    .topic
    .revision_dates
    .iter()
    .map(|c| (c.date.to_string(), c.completed))
    .collect();
  assert_eq!(
    done,
    [
      ("2024-01-03".to_owned(), true),
      ("2024-01-08".to_owned(), false),
      ("2024-01-15".to_owned(), false),
    ]
  );

  let writes = svc.store().writes.load(Ordering::SeqCst);
  let again = svc.complete_revision(&mut topic, 2).await.unwrap();
  assert_eq!(again, Completion::AlreadyCompleted);
  assert_eq!(svc.topic(topic.topic.topic_id).await.unwrap(), stored);
  assert_eq!(svc.store().writes.load(Ordering::SeqCst), writes);
}

#[tokio::test]
async fn complete_revision_with_bad_offset() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let subject = svc.create_subject("Maths").await.unwrap();
  let mut topic = svc
    .create_topic(subject.subject_id, "Matrices", "", Utc::now())
    .await
    .unwrap();
  let before = topic.clone();

  let err = svc.complete_revision(&mut topic, 3).await.unwrap_err();
  assert!(matches!(err, Error::InvalidCheckpoint(3)));
  assert_eq!(topic, before);
}

#[tokio::test]
async fn complete_revision_on_deleted_topic_leaves_state() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let subject = svc.create_subject("Maths").await.unwrap();
  let mut topic = svc
    .create_topic(subject.subject_id, "Groups", "", Utc::now())
    .await
    .unwrap();
  svc.delete_topic(topic.topic.topic_id).await.unwrap();
  let before = topic.clone();

  let err = svc.complete_revision(&mut topic, 7).await.unwrap_err();
  assert!(matches!(err, Error::TopicNotFound(_)));
  assert_eq!(topic, before);
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn subject_lookup_maps_miss_to_not_found() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let subject = svc.create_subject("Music").await.unwrap();
  assert_eq!(svc.subject(subject.subject_id).await.unwrap(), subject);

  let missing = Uuid::new_v4();
  assert!(matches!(
    svc.subject(missing).await,
    Err(Error::SubjectNotFound(id)) if id == missing
  ));
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_subject_cascades_and_reports_missing() {
  let svc = service_at("2024-01-01T09:00:00Z");
  let subject = svc.create_subject("Music").await.unwrap();
  svc
    .create_topic(subject.subject_id, "Scales", "", Utc::now())
    .await
    .unwrap();

  svc.delete_subject(subject.subject_id).await.unwrap();
  assert!(svc.store().all().is_empty());
  assert!(matches!(
    svc.delete_subject(subject.subject_id).await,
    Err(Error::SubjectNotFound(_))
  ));
  assert!(matches!(
    svc.topics(subject.subject_id).await,
    Err(Error::SubjectNotFound(_))
  ));
}

// ─── Refresh ─────────────────────────────────────────────────────────────────

async fn seeded() -> StudyService<MemoryStore, Recorder> {
  let svc = service_at("2024-01-01T09:00:00Z");
  let bio = svc.create_subject("Biology").await.unwrap();
  let chem = svc.create_subject("Chemistry").await.unwrap();
  svc
    .create_topic(bio.subject_id, "Cells", "", at("2024-01-01T09:00:00Z"))
    .await
    .unwrap();
  svc
    .create_topic(chem.subject_id, "Acids", "", at("2024-01-01T09:00:00Z"))
    .await
    .unwrap();
  svc
}

#[tokio::test]
async fn refresh_builds_home_view() {
  let svc = seeded().await;
  let view = svc.refresh(at("2024-01-03T12:00:00Z")).await;

  let today = view.today.ready().unwrap();
  assert_eq!(today.len(), 2);
  assert_eq!(today[0].subject_name, "Biology");
  assert_eq!(today[1].subject_name, "Chemistry");
  assert_eq!(view.upcoming.ready().unwrap().len(), 4);
  assert_eq!(view.records.len(), 6);

  let subjects = view.subjects.ready().unwrap();
  assert!(subjects.iter().all(|s| s.topic_count == 1 && s.due_today == 1));

  let mut selection = Selection::new(view.today_date());
  let index = view.calendar(&selection);
  let marker = index.get(view.today_date()).unwrap();
  assert!(marker.is_today && marker.is_selected);
  assert_eq!(marker.revision_count, 2);

  selection.select("2024-01-15".parse().unwrap());
  let index = view.calendar(&selection);
  assert!(index.get("2024-01-15".parse().unwrap()).unwrap().is_selected);
  assert_eq!(view.revisions_on(selection.selected()).len(), 2);
}

#[tokio::test]
async fn failed_topic_fetch_degrades_only_dependent_sections() {
  let svc = seeded().await;
  svc.store().topics_offline.store(true, Ordering::SeqCst);

  let view = svc.refresh(at("2024-01-03T12:00:00Z")).await;
  assert_eq!(view.today, Section::Failed("store offline".into()));
  assert!(matches!(view.upcoming, Section::Failed(_)));
  assert!(view.records.is_empty());

  let subjects = view.subjects.ready().unwrap();
  assert_eq!(subjects.len(), 2);
  assert!(subjects.iter().all(|s| s.topic_count == 0));

  // Calendar still marks today and the selection.
  let index = view.calendar(&Selection::new(view.today_date()));
  assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn stale_refresh_is_discarded() {
  let svc = seeded().await;
  let mut state = HomeState::new("2024-01-03".parse().unwrap());

  let first = state.begin_refresh();
  let second = state.begin_refresh();

  let newer = svc.refresh(at("2024-01-08T12:00:00Z")).await;
  let older = svc.refresh(at("2024-01-03T12:00:00Z")).await;

  assert!(state.apply(second, newer.clone()));
  assert!(!state.apply(first, older));
  assert_eq!(state.view(), Some(&newer));

  let third = state.begin_refresh();
  let latest = svc.refresh(at("2024-01-15T12:00:00Z")).await;
  assert!(state.apply(third, latest.clone()));
  assert_eq!(state.view(), Some(&latest));
}

#[tokio::test]
async fn home_state_tracks_selection() {
  let svc = seeded().await;
  let today = "2024-01-03".parse().unwrap();
  let mut state = HomeState::new(today);
  assert!(state.calendar().is_none());
  assert!(state.selected_revisions().is_empty());

  let ticket = state.begin_refresh();
  state.apply(ticket, svc.refresh(at("2024-01-03T12:00:00Z")).await);
  assert_eq!(state.selected_revisions().len(), 2);

  state.select("2024-01-04".parse().unwrap());
  assert!(state.selected_revisions().is_empty());
  let calendar = state.calendar().unwrap();
  assert!(calendar.get("2024-01-04".parse().unwrap()).unwrap().is_selected);
  assert!(!calendar.get(today).unwrap().is_selected);
}
