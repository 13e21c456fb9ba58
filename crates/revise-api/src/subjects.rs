//! Handlers for `/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects` | Newest first |
//! | `POST`   | `/subjects` | Body: `{"name":"..."}`; returns 201 |
//! | `GET`    | `/subjects/:id` | 404 if not found |
//! | `PUT`    | `/subjects/:id` | Body: `{"name":"..."}` |
//! | `DELETE` | `/subjects/:id` | Also deletes the subject's topics |
//! | `GET`    | `/subjects/:id/topics` | 404 if the subject is unknown |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use revise_core::{
  store::StudyStore, subject::Subject, topic::ResolvedTopic,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{Shared, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /subjects`
pub async fn list<S: StudyStore>(
  State(service): State<Shared<S>>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  Ok(Json(service.subjects().await?))
}

// ─── Create / rename ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NameBody {
  pub name: String,
}

/// `POST /subjects`: body: `{"name":"Biology"}`
pub async fn create<S: StudyStore>(
  State(service): State<Shared<S>>,
  Json(body): Json<NameBody>,
) -> Result<impl IntoResponse, ApiError> {
  let subject = service.create_subject(&body.name).await?;
  Ok((StatusCode::CREATED, Json(subject)))
}

/// `PUT /subjects/:id`: body: `{"name":"..."}`
pub async fn rename<S: StudyStore>(
  State(service): State<Shared<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NameBody>,
) -> Result<Json<Subject>, ApiError> {
  Ok(Json(service.rename_subject(id, &body.name).await?))
}

// ─── Get / delete ────────────────────────────────────────────────────────────

/// `GET /subjects/:id`
pub async fn get_one<S: StudyStore>(
  State(service): State<Shared<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Subject>, ApiError> {
  Ok(Json(service.subject(id).await?))
}

/// `DELETE /subjects/:id`
pub async fn delete_one<S: StudyStore>(
  State(service): State<Shared<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
  service.delete_subject(id).await?;
  Ok(Json(json!({ "message": "Subject deleted successfully" })))
}

// ─── Topics of a subject ─────────────────────────────────────────────────────

/// `GET /subjects/:id/topics`
pub async fn topics<S: StudyStore>(
  State(service): State<Shared<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ResolvedTopic>>, ApiError> {
  Ok(Json(service.topics(id).await?))
}
