//! Handlers for `/topics` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/topics` | Every topic, newest first |
//! | `POST`   | `/topics` | Body: [`CreateBody`]; returns 201 + resolved topic |
//! | `GET`    | `/topics/:id` | 404 if not found |
//! | `PUT`    | `/topics/:id` | Body: [`TopicPatch`]; 400 if empty |
//! | `DELETE` | `/topics/:id` | |
//! | `POST`   | `/topics/complete-revision` | Body: [`CompleteBody`] |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use revise_core::{
  Error,
  store::StudyStore,
  topic::{DayOffset, ResolvedTopic, TopicPatch},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::{Shared, error::ApiError};

// ─── List / get ──────────────────────────────────────────────────────────────

/// `GET /topics`
pub async fn list<S: StudyStore>(
  State(service): State<Shared<S>>,
) -> Result<Json<Vec<ResolvedTopic>>, ApiError> {
  let topics = service
    .store()
    .list_all_topics()
    .await
    .map_err(Error::store)?;
  Ok(Json(topics))
}

/// `GET /topics/:id`
pub async fn get_one<S: StudyStore>(
  State(service): State<Shared<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ResolvedTopic>, ApiError> {
  Ok(Json(service.topic(id).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /topics`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub subject_id: Uuid,
  pub name:       String,
  #[serde(default)]
  pub notes:      Option<String>,
}

/// `POST /topics`: schedules the day 2, 7 and 14 checkpoints.
pub async fn create<S: StudyStore>(
  State(service): State<Shared<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let notes = body.notes.unwrap_or_default();
  let topic = service
    .create_topic(body.subject_id, &body.name, &notes, Utc::now())
    .await?;
  info!(topic_id = %topic.topic.topic_id, subject = %topic.subject_name, "topic created");
  Ok((StatusCode::CREATED, Json(topic)))
}

// ─── Update / delete ─────────────────────────────────────────────────────────

/// `PUT /topics/:id`: body: `{"name"?: "...", "notes"?: "..."}`
pub async fn update<S: StudyStore>(
  State(service): State<Shared<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<TopicPatch>,
) -> Result<Json<ResolvedTopic>, ApiError> {
  if patch.is_empty() {
    return Err(ApiError::BadRequest("No fields to update".into()));
  }
  Ok(Json(service.update_topic(id, patch).await?))
}

/// `DELETE /topics/:id`
pub async fn delete_one<S: StudyStore>(
  State(service): State<Shared<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
  service.delete_topic(id).await?;
  Ok(Json(json!({ "message": "Topic deleted successfully" })))
}

// ─── Complete a checkpoint ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompleteBody {
  pub topic_id:   Uuid,
  /// Raw offset; anything other than 2, 7 or 14 is a 404.
  pub day_number: u32,
}

/// `POST /topics/complete-revision`: returns the updated topic.
///
/// Completing an already-completed checkpoint succeeds and changes nothing.
pub async fn complete<S: StudyStore>(
  State(service): State<Shared<S>>,
  Json(body): Json<CompleteBody>,
) -> Result<Json<ResolvedTopic>, ApiError> {
  let day = DayOffset::try_from(body.day_number)?;
  let topic = service
    .store()
    .complete_revision(body.topic_id, day)
    .await
    .map_err(Error::store)?
    .ok_or(Error::TopicNotFound(body.topic_id))?;
  info!(topic_id = %body.topic_id, %day, "revision completed");
  Ok(Json(topic))
}
