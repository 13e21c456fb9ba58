//! Revision schedule derivation.

use chrono::{DateTime, Days, Duration, NaiveDate, Utc};

use crate::topic::{DayOffset, RevisionCheckpoint};

/// Build the three checkpoints for a topic created at `created_at`.
///
/// Dates are calendar-day additions to the UTC creation date; every
/// checkpoint starts incomplete.
pub fn generate(created_at: DateTime<Utc>) -> [RevisionCheckpoint; 3] {
  let created_on = created_at.date_naive();
  DayOffset::ALL.map(|day_number| RevisionCheckpoint {
    date: due_date(created_on, day_number),
    day_number,
    completed: false,
  })
}

pub fn due_date(created_on: NaiveDate, offset: DayOffset) -> NaiveDate {
  created_on + Days::new(u64::from(offset.days()))
}

/// The instant a reminder for `offset` should fire. Keeps the time of day of
/// the creation timestamp.
pub fn trigger_at(created_at: DateTime<Utc>, offset: DayOffset) -> DateTime<Utc> {
  created_at + Duration::days(i64::from(offset.days()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  #[test]
  fn new_year_schedule() {
    let created_at = "2024-01-01T08:30:00Z".parse().unwrap();
    let checkpoints = generate(created_at);

    let dates: Vec<_> = checkpoints.iter().map(|c| c.date).collect();
    assert_eq!(
      dates,
      [date("2024-01-03"), date("2024-01-08"), date("2024-01-15")]
    );
    let offsets: Vec<_> = checkpoints.iter().map(|c| c.day_number.days()).collect();
    assert_eq!(offsets, [2, 7, 14]);
    assert!(checkpoints.iter().all(|c| !c.completed));
  }

  #[test]
  fn crosses_month_and_leap_day() {
    let created_at = "2024-02-20T23:59:59Z".parse().unwrap();
    let dates: Vec<_> = generate(created_at).iter().map(|c| c.date).collect();
    assert_eq!(
      dates,
      [date("2024-02-22"), date("2024-02-27"), date("2024-03-05")]
    );
  }

  #[test]
  fn offsets_hold_for_many_creation_dates() {
    let start: DateTime<Utc> = "2023-12-25T00:00:00Z".parse().unwrap();
    for n in 0..400 {
      let created_at = start + Duration::hours(n * 7);
      let created_on = created_at.date_naive();
      for cp in generate(created_at) {
        let gap = cp.date.signed_duration_since(created_on).num_days();
        assert_eq!(gap, i64::from(cp.day_number.days()));
        assert!(!cp.completed);
      }
    }
  }

  #[test]
  fn trigger_keeps_time_of_day() {
    let created_at: DateTime<Utc> = "2024-01-01T08:30:00Z".parse().unwrap();
    let trigger = trigger_at(created_at, DayOffset::Seven);
    assert_eq!(trigger, "2024-01-08T08:30:00Z".parse::<DateTime<Utc>>().unwrap());
  }
}
