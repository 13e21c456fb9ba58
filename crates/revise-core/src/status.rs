//! Completion status of a topic and the per-offset colour palette.

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{
  Error, Result,
  topic::{DayOffset, Topic},
};

// ─── Topic status ────────────────────────────────────────────────────────────

/// How far through its schedule a topic is.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TopicStatus {
  /// No checkpoint completed yet.
  None,
  Partial,
  /// Every checkpoint completed.
  Complete,
}

pub fn status_of(topic: &Topic) -> TopicStatus {
  let done = topic.revision_dates.iter().filter(|c| c.completed).count();
  match done {
    0 => TopicStatus::None,
    n if n == topic.revision_dates.len() => TopicStatus::Complete,
    _ => TopicStatus::Partial,
  }
}

impl Topic {
  pub fn status(&self) -> TopicStatus { status_of(self) }
}

// ─── Palette ─────────────────────────────────────────────────────────────────

/// Presentation grouping for a checkpoint, keyed by its day offset.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  EnumIter,
  Serialize,
  Deserialize,
  strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Palette {
  Warning,
  Info,
  Accent,
  Neutral,
}

impl Palette {
  /// Lower sorts first when several checkpoints share a date.
  pub fn priority(self) -> u8 {
    match self {
      Self::Warning => 0,
      Self::Info => 1,
      Self::Accent => 2,
      Self::Neutral => 3,
    }
  }
}

/// Map a raw day offset to its palette entry; offsets outside the schedule
/// fall back to [`Palette::Neutral`].
pub fn color_for(day: u32) -> Palette {
  match DayOffset::try_from(day) {
    Ok(DayOffset::Two) => Palette::Warning,
    Ok(DayOffset::Seven) => Palette::Info,
    Ok(DayOffset::Fourteen) => Palette::Accent,
    Err(_) => Palette::Neutral,
  }
}

impl DayOffset {
  pub fn palette(self) -> Palette { color_for(self.days()) }
}

// ─── Completion ──────────────────────────────────────────────────────────────

/// Outcome of [`mark_completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
  Marked,
  /// The checkpoint was already complete; nothing changed.
  AlreadyCompleted,
}

/// Set the checkpoint at `day` to completed.
///
/// Re-marking a completed checkpoint is a no-op. Fails with
/// [`Error::InvalidCheckpoint`] if the topic has no checkpoint at `day`.
pub fn mark_completed(topic: &mut Topic, day: u32) -> Result<Completion> {
  let checkpoint = topic
    .revision_dates
    .iter_mut()
    .find(|c| c.day_number.days() == day)
    .ok_or(Error::InvalidCheckpoint(day))?;

  if checkpoint.completed {
    return Ok(Completion::AlreadyCompleted);
  }
  checkpoint.completed = true;
  Ok(Completion::Marked)
}
