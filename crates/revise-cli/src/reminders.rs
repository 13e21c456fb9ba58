//! A [`Notifier`] for the command line.
//!
//! A terminal program cannot fire a reminder days later, so reminders are
//! appended as JSON lines to a file that an external scheduler (cron, a
//! systemd timer, a desktop agent) can pick up. Without a file they are only
//! logged.

use std::path::PathBuf;

use revise_core::notify::{Notifier, Reminder};
use tokio::{fs::OpenOptions, io::AsyncWriteExt as _};
use tracing::info;

pub struct ReminderLog {
  path: Option<PathBuf>,
}

impl ReminderLog {
  pub fn new(path: Option<PathBuf>) -> Self { Self { path } }
}

impl Notifier for ReminderLog {
  type Error = std::io::Error;

  async fn schedule(&self, reminder: Reminder) -> Result<(), std::io::Error> {
    let Some(path) = &self.path else {
      info!(
        topic_id = %reminder.topic_id,
        day = %reminder.day_number,
        at = %reminder.trigger_at,
        "{}",
        reminder.title
      );
      return Ok(());
    };

    let mut line = serde_json::to_string(&reminder).map_err(std::io::Error::other)?;
    line.push('\n');

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
  }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, Utc};
  use revise_core::topic::DayOffset;
  use uuid::Uuid;

  use super::*;

  fn reminder(day: DayOffset) -> Reminder {
    let at: DateTime<Utc> = "2024-01-08T09:00:00Z".parse().unwrap();
    Reminder {
      topic_id:   Uuid::new_v4(),
      day_number: day,
      title:      "Time to revise Optics".into(),
      body:       "Day 7 revision for Optics (Physics)".into(),
      trigger_at: at,
    }
  }

  #[tokio::test]
  async fn appends_one_json_line_per_reminder() {
    let path = std::env::temp_dir().join(format!("revise-reminders-{}.jsonl", Uuid::new_v4()));
    let log = ReminderLog::new(Some(path.clone()));

    let first = reminder(DayOffset::Seven);
    let second = reminder(DayOffset::Fourteen);
    log.schedule(first.clone()).await.unwrap();
    log.schedule(second.clone()).await.unwrap();

    let raw = tokio::fs::read_to_string(&path).await.unwrap();
    let parsed: Vec<Reminder> = raw
      .lines()
      .map(|l| serde_json::from_str(l).unwrap())
      .collect();
    assert_eq!(parsed, [first, second]);

    tokio::fs::remove_file(&path).await.ok();
  }

  #[tokio::test]
  async fn without_a_file_nothing_fails() {
    let log = ReminderLog::new(None);
    assert!(log.schedule(reminder(DayOffset::Two)).await.is_ok());
  }

  #[tokio::test]
  async fn unwritable_path_is_an_error() {
    let dir = std::env::temp_dir().join(format!("revise-missing-{}", Uuid::new_v4()));
    let log = ReminderLog::new(Some(dir.join("nested").join("r.jsonl")));
    assert!(log.schedule(reminder(DayOffset::Two)).await.is_err());
  }
}
