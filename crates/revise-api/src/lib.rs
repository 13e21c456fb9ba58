//! JSON REST API for Revise.
//!
//! Exposes an axum [`Router`] backed by any [`revise_core::store::StudyStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", revise_api::api_router(store))
//! ```

pub mod error;
pub mod revisions;
pub mod subjects;
pub mod topics;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use revise_core::{service::StudyService, store::StudyStore};
use serde_json::{Value, json};

pub use error::ApiError;

/// Handler state: the service wrapping the store.
pub type Shared<S> = Arc<StudyService<S>>;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type. The server has no reminder channel of its own, so
/// the service is built without one.
pub fn api_router<S>(store: S) -> Router<()>
where
  S: StudyStore + 'static,
{
  let service: Shared<S> = Arc::new(StudyService::without_reminders(store));

  Router::new()
    .route("/", get(root))
    // Subjects
    .route(
      "/subjects",
      get(subjects::list::<S>).post(subjects::create::<S>),
    )
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S>)
        .put(subjects::rename::<S>)
        .delete(subjects::delete_one::<S>),
    )
    .route("/subjects/{id}/topics", get(subjects::topics::<S>))
    // Topics
    .route("/topics", get(topics::list::<S>).post(topics::create::<S>))
    .route("/topics/complete-revision", post(topics::complete::<S>))
    .route(
      "/topics/{id}",
      get(topics::get_one::<S>)
        .put(topics::update::<S>)
        .delete(topics::delete_one::<S>),
    )
    // Revisions
    .route("/revisions/today", get(revisions::today::<S>))
    .route("/revisions/upcoming", get(revisions::upcoming::<S>))
    .route("/revisions/next", get(revisions::next::<S>))
    .route("/revisions/calendar", get(revisions::calendar::<S>))
    .with_state(service)
}

/// `GET /`
async fn root() -> Json<Value> { Json(json!({ "message": "Spaced Repetition API" })) }
