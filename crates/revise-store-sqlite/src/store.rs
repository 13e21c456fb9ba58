//! [`SqliteStore`]: the SQLite implementation of [`StudyStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use revise_core::{
  aggregate::{self, RevisionRecord},
  schedule,
  store::StudyStore,
  subject::Subject,
  topic::{DayOffset, NewTopic, ResolvedTopic, Topic, TopicPatch},
};

use crate::{
  Result,
  encode::{
    RawRevision, RawSubject, RawTopic, assemble_topics, encode_date, encode_day,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Topic selection ─────────────────────────────────────────────────────────

/// Which topics a [`SqliteStore::load_topics`] call reads.
#[derive(Debug, Clone, Copy)]
enum TopicFilter {
  All,
  Subject(Uuid),
  Topic(Uuid),
}

impl TopicFilter {
  fn clause(self) -> (&'static str, Option<String>) {
    match self {
      Self::All => ("", None),
      Self::Subject(id) => ("WHERE t.subject_id = ?1", Some(encode_uuid(id))),
      Self::Topic(id) => ("WHERE t.topic_id = ?1", Some(encode_uuid(id))),
    }
  }
}

/// The current time at the precision timestamps are stored with, so values
/// returned from a write compare equal to the same row read back.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Revise store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read topics and their revision rows in one call so both come from the
  /// same snapshot.
  async fn load_topics(&self, filter: TopicFilter) -> Result<Vec<ResolvedTopic>> {
    let (where_clause, param) = filter.clause();

    let (topics, revisions): (Vec<RawTopic>, Vec<RawRevision>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT t.topic_id, t.subject_id, s.name, t.name, t.notes, t.created_at
           FROM topics t
           LEFT JOIN subjects s ON s.subject_id = t.subject_id
           {where_clause}
           ORDER BY t.created_at DESC, t.topic_id"
        ))?;
        let topics = stmt
          .query_map(rusqlite::params_from_iter(param.iter()), |row| {
            Ok(RawTopic {
              topic_id:     row.get(0)?,
              subject_id:   row.get(1)?,
              subject_name: row.get(2)?,
              name:         row.get(3)?,
              notes:        row.get(4)?,
              created_at:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT r.topic_id, r.day_number, r.due_on, r.completed
           FROM revisions r
           JOIN topics t ON t.topic_id = r.topic_id
           {where_clause}"
        ))?;
        let revisions = stmt
          .query_map(rusqlite::params_from_iter(param.iter()), |row| {
            Ok(RawRevision {
              topic_id:   row.get(0)?,
              day_number: row.get(1)?,
              due_on:     row.get(2)?,
              completed:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((topics, revisions))
      })
      .await?;

    assemble_topics(topics, revisions)
  }

  async fn subject_exists(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM subjects WHERE subject_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// ─── StudyStore impl ─────────────────────────────────────────────────────────

impl StudyStore for SqliteStore {
  type Error = crate::Error;

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT subject_id, name, created_at FROM subjects
           ORDER BY created_at DESC, subject_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSubject {
              subject_id: row.get(0)?,
              name:       row.get(1)?,
              created_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject_id, name, created_at FROM subjects WHERE subject_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawSubject {
                  subject_id: row.get(0)?,
                  name:       row.get(1)?,
                  created_at: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn create_subject(&self, name: String) -> Result<Subject> {
    let subject = Subject {
      subject_id: Uuid::new_v4(),
      name,
      created_at: now(),
    };

    let id_str   = encode_uuid(subject.subject_id);
    let name_str = subject.name.clone();
    let at_str   = encode_dt(subject.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(subject_id = %subject.subject_id, "created subject");
    Ok(subject)
  }

  async fn rename_subject(&self, id: Uuid, name: String) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects SET name = ?2 WHERE subject_id = ?1",
          rusqlite::params![id_str, name],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_subject(id).await
  }

  async fn delete_subject(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    // Topics and revisions go with it via ON DELETE CASCADE.
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subjects WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    debug!(subject_id = %id, deleted, "delete subject");
    Ok(deleted > 0)
  }

  // ── Topics ────────────────────────────────────────────────────────────────

  async fn list_topics(&self, subject_id: Uuid) -> Result<Option<Vec<ResolvedTopic>>> {
    if !self.subject_exists(subject_id).await? {
      return Ok(None);
    }
    Ok(Some(self.load_topics(TopicFilter::Subject(subject_id)).await?))
  }

  async fn list_all_topics(&self) -> Result<Vec<ResolvedTopic>> {
    self.load_topics(TopicFilter::All).await
  }

  async fn get_topic(&self, id: Uuid) -> Result<Option<ResolvedTopic>> {
    Ok(self.load_topics(TopicFilter::Topic(id)).await?.into_iter().next())
  }

  async fn create_topic(&self, input: NewTopic) -> Result<Option<ResolvedTopic>> {
    let created_at = now();
    let topic = Topic {
      topic_id: Uuid::new_v4(),
      subject_id: input.subject_id,
      name: input.name,
      notes: input.notes,
      created_at,
      revision_dates: schedule::generate(created_at),
    };

    let topic_id_str   = encode_uuid(topic.topic_id);
    let subject_id_str = encode_uuid(topic.subject_id);
    let name_str       = topic.name.clone();
    let notes_str      = topic.notes.clone();
    let at_str         = encode_dt(topic.created_at);
    let rows: Vec<(i64, String)> = topic
      .revision_dates
      .iter()
      .map(|cp| (encode_day(cp.day_number), encode_date(cp.date)))
      .collect();

    let subject_name: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let subject_name: Option<String> = tx
          .query_row(
            "SELECT name FROM subjects WHERE subject_id = ?1",
            rusqlite::params![subject_id_str],
            |row| row.get(0),
          )
          .optional()?;
        if subject_name.is_none() {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO topics (topic_id, subject_id, name, notes, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![topic_id_str, subject_id_str, name_str, notes_str, at_str],
        )?;
        for (day_number, due_on) in &rows {
          tx.execute(
            "INSERT INTO revisions (topic_id, day_number, due_on, completed)
             VALUES (?1, ?2, ?3, 0)",
            rusqlite::params![topic_id_str, day_number, due_on],
          )?;
        }
        tx.commit()?;

        Ok(subject_name)
      })
      .await?;

    if subject_name.is_some() {
      debug!(topic_id = %topic.topic_id, "created topic");
    }
    Ok(subject_name.map(|subject_name| ResolvedTopic { topic, subject_name }))
  }

  async fn update_topic(
    &self,
    id: Uuid,
    patch: TopicPatch,
  ) -> Result<Option<ResolvedTopic>> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE topics
           SET name  = COALESCE(?2, name),
               notes = COALESCE(?3, notes)
           WHERE topic_id = ?1",
          rusqlite::params![id_str, patch.name, patch.notes],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_topic(id).await
  }

  async fn delete_topic(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM topics WHERE topic_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Revisions ─────────────────────────────────────────────────────────────

  async fn complete_revision(
    &self,
    topic_id: Uuid,
    day: DayOffset,
  ) -> Result<Option<ResolvedTopic>> {
    let id_str  = encode_uuid(topic_id);
    let day_num = encode_day(day);

    // Matches whether or not the row was already completed, so repeating the
    // call still reports the topic as found.
    let matched = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE revisions SET completed = 1
           WHERE topic_id = ?1 AND day_number = ?2",
          rusqlite::params![id_str, day_num],
        )?)
      })
      .await?;

    if matched == 0 {
      return Ok(None);
    }
    debug!(%topic_id, %day, "completed revision");
    self.get_topic(topic_id).await
  }

  async fn list_revisions_today(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Vec<RevisionRecord>> {
    let topics = self.list_all_topics().await?;
    Ok(aggregate::today(&topics, as_of.unwrap_or_else(Utc::now)))
  }

  async fn list_revisions_upcoming(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Vec<RevisionRecord>> {
    let topics = self.list_all_topics().await?;
    Ok(aggregate::upcoming(&topics, as_of.unwrap_or_else(Utc::now)))
  }
}
