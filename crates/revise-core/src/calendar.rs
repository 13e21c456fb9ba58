//! Date-keyed markers for the month view.
//!
//! [`CalendarIndex::build`] is total and stateless: callers rebuild it whenever
//! the record set or the selected date changes.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::aggregate::RevisionRecord;

/// Display metadata for a single calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
  pub revision_count: usize,
  pub has_revisions:  bool,
  pub is_selected:    bool,
  pub is_today:       bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarIndex {
  markers: BTreeMap<NaiveDate, Marker>,
}

impl CalendarIndex {
  /// Index `records` by date. `selected` and `today` always get an entry,
  /// even when no record falls on them.
  pub fn build(
    records: &[RevisionRecord],
    selected: NaiveDate,
    today: NaiveDate,
  ) -> Self {
    let mut markers: BTreeMap<NaiveDate, Marker> = BTreeMap::new();

    for record in records {
      let marker = markers.entry(record.revision_date).or_default();
      marker.revision_count += 1;
      marker.has_revisions = true;
    }
    markers.entry(selected).or_default().is_selected = true;
    markers.entry(today).or_default().is_today = true;

    Self { markers }
  }

  pub fn get(&self, date: NaiveDate) -> Option<&Marker> { self.markers.get(&date) }

  pub fn selected(&self) -> Option<NaiveDate> {
    self
      .markers
      .iter()
      .find_map(|(date, m)| m.is_selected.then_some(*date))
  }

  /// Markers falling inside the given month, in date order. An invalid
  /// `year`/`month` yields nothing.
  pub fn month(
    &self,
    year: i32,
    month: u32,
  ) -> impl Iterator<Item = (NaiveDate, &Marker)> + '_ {
    let bounds = NaiveDate::from_ymd_opt(year, month, 1)
      .and_then(|start| Some((start, start.checked_add_months(Months::new(1))?)));
    bounds
      .into_iter()
      .flat_map(move |(start, end)| self.markers.range(start..end))
      .map(|(date, marker)| (*date, marker))
  }

  pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &Marker)> + '_ {
    self.markers.iter().map(|(date, marker)| (*date, marker))
  }

  pub fn len(&self) -> usize { self.markers.len() }

  pub fn is_empty(&self) -> bool { self.markers.is_empty() }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// The single selected day of a long-lived calendar view. Starts on today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
  selected: NaiveDate,
}

impl Selection {
  pub fn new(today: NaiveDate) -> Self { Self { selected: today } }

  pub fn selected(&self) -> NaiveDate { self.selected }

  /// Move the selection, returning the previously selected date.
  pub fn select(&mut self, date: NaiveDate) -> NaiveDate {
    std::mem::replace(&mut self.selected, date)
  }

  pub fn index(&self, records: &[RevisionRecord], today: NaiveDate) -> CalendarIndex {
    CalendarIndex::build(records, self.selected, today)
  }
}
