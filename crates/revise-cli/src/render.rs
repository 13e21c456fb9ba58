//! Plain-text rendering of subjects, topics, revisions and the month view.

use std::{
  collections::BTreeMap,
  fmt::{self, Write},
};

use chrono::{Datelike, NaiveDate};
use revise_core::{
  aggregate::{RevisionRecord, SubjectOverview},
  calendar::CalendarIndex,
  service::{HomeState, Section},
  subject::Subject,
  topic::ResolvedTopic,
};

// ─── Home ─────────────────────────────────────────────────────────────────────

pub fn home(out: &mut impl Write, state: &HomeState) -> fmt::Result {
  let Some(view) = state.view() else {
    return writeln!(out, "Nothing loaded yet.");
  };

  writeln!(out, "Today ({})", view.today_date())?;
  section(out, &view.today, |out, r| records(out, r))?;
  writeln!(out)?;

  writeln!(out, "Upcoming")?;
  section(out, &view.upcoming, |out, r| records(out, r))?;
  writeln!(out)?;

  writeln!(out, "Subjects")?;
  section(out, &view.subjects, |out, s| overview(out, s))?;
  writeln!(out)?;

  if let Some(calendar) = state.calendar() {
    let selected = state.selection().selected();
    month(out, &calendar, selected.year(), selected.month())?;
    writeln!(out)?;
    writeln!(out, "On {selected}")?;
    let on_day = state.selected_revisions();
    if on_day.is_empty() {
      writeln!(out, "  no revisions")?;
    } else {
      records(out, &on_day)?;
    }
  }
  Ok(())
}

fn section<T, W: Write>(
  out: &mut W,
  section: &Section<T>,
  body: impl FnOnce(&mut W, &T) -> fmt::Result,
) -> fmt::Result {
  match section {
    Section::Ready(v) => body(out, v),
    Section::Failed(msg) => writeln!(out, "  unavailable: {msg}"),
  }
}

// ─── Revisions ────────────────────────────────────────────────────────────────

pub fn records(out: &mut impl Write, list: &[RevisionRecord]) -> fmt::Result {
  if list.is_empty() {
    return writeln!(out, "  nothing due");
  }
  for r in list {
    writeln!(
      out,
      "  {}  day {:<2} {:<8} {} / {}  [{}]  {}",
      r.revision_date,
      r.day_number.days(),
      r.palette().to_string(),
      r.subject_name,
      r.topic_name,
      if r.completed { "done" } else { "due" },
      r.topic_id,
    )?;
  }
  Ok(())
}

// ─── Subjects ─────────────────────────────────────────────────────────────────

fn overview(out: &mut impl Write, list: &[SubjectOverview]) -> fmt::Result {
  if list.is_empty() {
    return writeln!(out, "  no subjects yet");
  }
  for s in list {
    writeln!(
      out,
      "  {:<24} {:>3} topics  {:>3} complete  {:>3} due today  {}",
      s.subject.name,
      s.topic_count,
      s.completed_topics,
      s.due_today,
      s.subject.subject_id,
    )?;
  }
  Ok(())
}

pub fn subjects(out: &mut impl Write, list: &[Subject]) -> fmt::Result {
  if list.is_empty() {
    return writeln!(out, "no subjects yet");
  }
  for s in list {
    writeln!(
      out,
      "{}  {:<24} created {}",
      s.subject_id,
      s.name,
      s.created_at.date_naive()
    )?;
  }
  Ok(())
}

// ─── Topics ───────────────────────────────────────────────────────────────────

pub fn topics(out: &mut impl Write, list: &[ResolvedTopic]) -> fmt::Result {
  if list.is_empty() {
    return writeln!(out, "no topics yet");
  }
  for t in list {
    writeln!(
      out,
      "{}  {:<24} {:<16} {}",
      t.topic.topic_id,
      t.topic.name,
      t.subject_name,
      t.topic.status()
    )?;
  }
  Ok(())
}

pub fn topic(out: &mut impl Write, t: &ResolvedTopic) -> fmt::Result {
  writeln!(out, "{} ({})", t.topic.name, t.subject_name)?;
  writeln!(out, "  id:      {}", t.topic.topic_id)?;
  writeln!(out, "  created: {}", t.topic.created_at.date_naive())?;
  writeln!(out, "  status:  {}", t.topic.status())?;
  if !t.topic.notes.is_empty() {
    writeln!(out, "  notes:   {}", t.topic.notes)?;
  }
  for cp in &t.topic.revision_dates {
    writeln!(
      out,
      "  [{}] day {:<2} {}",
      if cp.completed { "x" } else { " " },
      cp.day_number.days(),
      cp.date
    )?;
  }
  Ok(())
}

// ─── Month grid ───────────────────────────────────────────────────────────────

/// A Monday-first month grid. `*` marks days with revisions, `>` marks today
/// and brackets mark the selected day.
pub fn month(
  out: &mut impl Write,
  calendar: &CalendarIndex,
  year: i32,
  month: u32,
) -> fmt::Result {
  let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
    return Ok(());
  };

  writeln!(out, "{}", first.format("%B %Y"))?;
  writeln!(out, " Mo  Tu  We  Th  Fr  Sa  Su")?;

  let markers: BTreeMap<_, _> = calendar
    .month(year, month)
    .map(|(date, marker)| (date, *marker))
    .collect();
  let lead = first.weekday().num_days_from_monday() as usize;
  let mut line = "    ".repeat(lead);
  let mut column = lead;

  for day in first.iter_days().take_while(|d| d.month() == month) {
    let marker = markers.get(&day).copied().unwrap_or_default();
    let (open, close) = if marker.is_selected {
      ('[', ']')
    } else {
      (
        if marker.is_today { '>' } else { ' ' },
        if marker.has_revisions { '*' } else { ' ' },
      )
    };
    write!(line, "{open}{:>2}{close}", day.day())?;

    column += 1;
    if column == 7 {
      writeln!(out, "{}", line.trim_end())?;
      line.clear();
      column = 0;
    }
  }
  if !line.is_empty() {
    writeln!(out, "{}", line.trim_end())?;
  }
  Ok(())
}
