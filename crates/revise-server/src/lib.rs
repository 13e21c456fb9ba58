//! HTTP server for Revise.
//!
//! Mounts the JSON API from `revise-api` under `/api`, with request tracing,
//! permissive CORS, and optional HTTP Basic auth.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use revise_core::store::StudyStore;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `REVISE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  pub auth_username:      Option<String>,
  pub auth_password_hash: Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8001 }

fn default_store_path() -> PathBuf { PathBuf::from("revise.db") }

impl ServerConfig {
  /// Basic-auth credentials, if configured. Setting only one of the two
  /// fields is an error rather than silently serving without auth.
  pub fn auth(&self) -> Result<Option<AuthConfig>, Error> {
    match (&self.auth_username, &self.auth_password_hash) {
      (Some(username), Some(hash)) => Ok(Some(AuthConfig {
        username:      username.clone(),
        password_hash: hash.clone(),
      })),
      (None, None) => Ok(None),
      (Some(_), None) => {
        Err(Error::IncompleteAuth("auth_username", "auth_password_hash"))
      }
      (None, Some(_)) => {
        Err(Error::IncompleteAuth("auth_password_hash", "auth_username"))
      }
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: S, auth: Option<AuthConfig>) -> Router
where
  S: StudyStore + 'static,
{
  let mut api = revise_api::api_router(store);
  if let Some(auth) = auth {
    api = api.layer(middleware::from_fn_with_state(Arc::new(auth), require_auth));
  }

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

// ─── Integration tests ────────────────────────────────────────────────────────
