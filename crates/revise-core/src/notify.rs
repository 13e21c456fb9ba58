//! Reminder scheduling capability.
//!
//! Delivering reminders is platform-specific, so the core only describes
//! *what* to schedule. Implementations decide how (desktop notification, a
//! reminder file, nothing at all).

use std::{convert::Infallible, future::Future};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{schedule::trigger_at, topic::{DayOffset, ResolvedTopic}};

/// A single reminder to fire at `trigger_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
  pub topic_id:   Uuid,
  pub day_number: DayOffset,
  pub title:      String,
  pub body:       String,
  pub trigger_at: DateTime<Utc>,
}

/// Fire-and-forget reminder sink.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn schedule(
    &self,
    reminder: Reminder,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// A notifier that drops every reminder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Notifier for Silent {
  type Error = Infallible;

  async fn schedule(&self, _reminder: Reminder) -> Result<(), Infallible> { Ok(()) }
}

/// Reminders for each checkpoint of `resolved` dated strictly after `now`'s
/// calendar date. A checkpoint due today gets no reminder, whatever its
/// trigger time.
pub fn reminders_for(resolved: &ResolvedTopic, now: DateTime<Utc>) -> Vec<Reminder> {
  let topic = &resolved.topic;
  let today = now.date_naive();
  topic
    .revision_dates
    .iter()
    .filter(|cp| cp.date > today)
    .map(|cp| {
      let at = trigger_at(topic.created_at, cp.day_number);
      Reminder {
        topic_id:   topic.topic_id,
        day_number: cp.day_number,
        title:      format!("Time to revise {}", topic.name),
        body:       format!(
          "Day {} revision for {} ({})",
          cp.day_number.days(),
          topic.name,
          resolved.subject_name
        ),
        trigger_at: at,
      }
    })
    .collect()
}
