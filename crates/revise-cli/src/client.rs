//! Async HTTP client wrapping the revise JSON API.
//!
//! [`ApiClient`] implements [`StudyStore`], so the CLI drives the same
//! [`revise_core::service::StudyService`] flows the server does.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use revise_core::{
  aggregate::RevisionRecord,
  store::StudyStore,
  subject::Subject,
  topic::{DayOffset, NewTopic, ResolvedTopic, TopicPatch},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Connection settings for the revise API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Network(#[from] reqwest::Error),

  /// The server answered with a non-success status other than 404.
  #[error("server returned {status}: {message}")]
  Status { status: StatusCode, message: String },
}

/// Async HTTP client for the revise JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Send `req`, turning a 404 into `None` and any other failure status into
  /// [`ClientError::Status`].
  async fn send(&self, req: RequestBuilder) -> Result<Option<Response>, ClientError> {
    let resp = self.auth(req).send().await?;
    let status = resp.status();
    debug!(url = %resp.url(), %status, "api response");

    if status == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !status.is_success() {
      let message = resp
        .json::<Value>()
        .await
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());
      return Err(ClientError::Status { status, message });
    }
    Ok(Some(resp))
  }

  async fn fetch<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
  ) -> Result<Option<T>, ClientError> {
    match self.send(req).await? {
      Some(resp) => Ok(Some(resp.json().await?)),
      None => Ok(None),
    }
  }

  /// Like [`Self::fetch`] for endpoints where a 404 means the route itself
  /// is missing rather than a resource.
  async fn fetch_required<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
  ) -> Result<T, ClientError> {
    self.fetch(req).await?.ok_or(ClientError::Status {
      status:  StatusCode::NOT_FOUND,
      message: "endpoint not found; is the URL pointing at a revise server?".into(),
    })
  }

  fn as_of_query(as_of: Option<DateTime<Utc>>) -> Vec<(&'static str, String)> {
    as_of
      .map(|t| ("as_of", t.to_rfc3339()))
      .into_iter()
      .collect()
  }

  // ── Extra endpoints ───────────────────────────────────────────────────────

  /// `GET /api/revisions/next`: the next incomplete checkpoint per topic.
  pub async fn next_due(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Vec<RevisionRecord>, ClientError> {
    let req = self
      .client
      .get(self.url("/revisions/next"))
      .query(&Self::as_of_query(as_of));
    self.fetch_required(req).await
  }
}

impl StudyStore for ApiClient {
  type Error = ClientError;

  // ── Subjects ──────────────────────────────────────────────────────────────

  /// `GET /api/subjects`
  async fn list_subjects(&self) -> Result<Vec<Subject>, ClientError> {
    self.fetch_required(self.client.get(self.url("/subjects"))).await
  }

  /// `GET /api/subjects/{id}`
  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>, ClientError> {
    self.fetch(self.client.get(self.url(&format!("/subjects/{id}")))).await
  }

  /// `POST /api/subjects`
  async fn create_subject(&self, name: String) -> Result<Subject, ClientError> {
    let req = self
      .client
      .post(self.url("/subjects"))
      .json(&json!({ "name": name }));
    self.fetch_required(req).await
  }

  /// `PUT /api/subjects/{id}`
  async fn rename_subject(
    &self,
    id: Uuid,
    name: String,
  ) -> Result<Option<Subject>, ClientError> {
    let req = self
      .client
      .put(self.url(&format!("/subjects/{id}")))
      .json(&json!({ "name": name }));
    self.fetch(req).await
  }

  /// `DELETE /api/subjects/{id}`
  async fn delete_subject(&self, id: Uuid) -> Result<bool, ClientError> {
    let req = self.client.delete(self.url(&format!("/subjects/{id}")));
    Ok(self.send(req).await?.is_some())
  }

  // ── Topics ────────────────────────────────────────────────────────────────

  /// `GET /api/subjects/{id}/topics`
  async fn list_topics(
    &self,
    subject_id: Uuid,
  ) -> Result<Option<Vec<ResolvedTopic>>, ClientError> {
    let url = self.url(&format!("/subjects/{subject_id}/topics"));
    self.fetch(self.client.get(url)).await
  }

  /// `GET /api/topics`
  async fn list_all_topics(&self) -> Result<Vec<ResolvedTopic>, ClientError> {
    self.fetch_required(self.client.get(self.url("/topics"))).await
  }

  /// `GET /api/topics/{id}`
  async fn get_topic(&self, id: Uuid) -> Result<Option<ResolvedTopic>, ClientError> {
    self.fetch(self.client.get(self.url(&format!("/topics/{id}")))).await
  }

  /// `POST /api/topics`
  async fn create_topic(
    &self,
    input: NewTopic,
  ) -> Result<Option<ResolvedTopic>, ClientError> {
    let req = self.client.post(self.url("/topics")).json(&input);
    self.fetch(req).await
  }

  /// `PUT /api/topics/{id}`
  async fn update_topic(
    &self,
    id: Uuid,
    patch: TopicPatch,
  ) -> Result<Option<ResolvedTopic>, ClientError> {
    let req = self
      .client
      .put(self.url(&format!("/topics/{id}")))
      .json(&patch);
    self.fetch(req).await
  }

  /// `DELETE /api/topics/{id}`
  async fn delete_topic(&self, id: Uuid) -> Result<bool, ClientError> {
    let req = self.client.delete(self.url(&format!("/topics/{id}")));
    Ok(self.send(req).await?.is_some())
  }

  // ── Revisions ─────────────────────────────────────────────────────────────

  /// `POST /api/topics/complete-revision`
  async fn complete_revision(
    &self,
    topic_id: Uuid,
    day: DayOffset,
  ) -> Result<Option<ResolvedTopic>, ClientError> {
    let req = self
      .client
      .post(self.url("/topics/complete-revision"))
      .json(&json!({ "topic_id": topic_id, "day_number": day }));
    self.fetch(req).await
  }

  /// `GET /api/revisions/today`
  async fn list_revisions_today(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Vec<RevisionRecord>, ClientError> {
    let req = self
      .client
      .get(self.url("/revisions/today"))
      .query(&Self::as_of_query(as_of));
    self.fetch_required(req).await
  }

  /// `GET /api/revisions/upcoming`
  async fn list_revisions_upcoming(
    &self,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Vec<RevisionRecord>, ClientError> {
    let req = self
      .client
      .get(self.url("/revisions/upcoming"))
      .query(&Self::as_of_query(as_of));
    self.fetch_required(req).await
  }
}
