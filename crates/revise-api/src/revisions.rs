//! Handlers for `/revisions` endpoints.
//!
//! Every endpoint takes an optional `as_of` instant (RFC 3339) that stands in
//! for "now"; the calendar date of `as_of` in UTC is "today".

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use revise_core::{
  Error,
  aggregate::{self, RevisionRecord},
  calendar::CalendarIndex,
  store::StudyStore,
};
use serde::Deserialize;

use crate::{Shared, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct AsOfParams {
  pub as_of:   Option<DateTime<Utc>>,
  /// `/revisions/today` only: drop completed checkpoints.
  #[serde(default)]
  pub pending: bool,
}

/// `GET /revisions/today[?as_of=...][&pending=true]`
pub async fn today<S: StudyStore>(
  State(service): State<Shared<S>>,
  Query(params): Query<AsOfParams>,
) -> Result<Json<Vec<RevisionRecord>>, ApiError> {
  if params.pending {
    let now = params.as_of.unwrap_or_else(Utc::now);
    let topics = service
      .store()
      .list_all_topics()
      .await
      .map_err(Error::store)?;
    return Ok(Json(aggregate::pending_today(&topics, now)));
  }

  let records = service
    .store()
    .list_revisions_today(params.as_of)
    .await
    .map_err(Error::store)?;
  Ok(Json(records))
}

/// `GET /revisions/upcoming[?as_of=...]`
pub async fn upcoming<S: StudyStore>(
  State(service): State<Shared<S>>,
  Query(params): Query<AsOfParams>,
) -> Result<Json<Vec<RevisionRecord>>, ApiError> {
  let records = service
    .store()
    .list_revisions_upcoming(params.as_of)
    .await
    .map_err(Error::store)?;
  Ok(Json(records))
}

/// `GET /revisions/next[?as_of=...]`: at most one record per topic: its
/// earliest incomplete checkpoint after today.
pub async fn next<S: StudyStore>(
  State(service): State<Shared<S>>,
  Query(params): Query<AsOfParams>,
) -> Result<Json<Vec<RevisionRecord>>, ApiError> {
  let now = params.as_of.unwrap_or_else(Utc::now);
  let topics = service
    .store()
    .list_all_topics()
    .await
    .map_err(Error::store)?;
  Ok(Json(aggregate::next_due(&topics, now)))
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
  pub as_of:    Option<DateTime<Utc>>,
  /// Defaults to today.
  pub selected: Option<NaiveDate>,
}

/// `GET /revisions/calendar[?as_of=...][&selected=YYYY-MM-DD]`
pub async fn calendar<S: StudyStore>(
  State(service): State<Shared<S>>,
  Query(params): Query<CalendarParams>,
) -> Result<Json<CalendarIndex>, ApiError> {
  let today = params.as_of.unwrap_or_else(Utc::now).date_naive();
  let topics = service
    .store()
    .list_all_topics()
    .await
    .map_err(Error::store)?;
  let records = aggregate::records(&topics);
  let selected = params.selected.unwrap_or(today);
  Ok(Json(CalendarIndex::build(&records, selected, today)))
}
