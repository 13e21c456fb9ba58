//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  /// `auth_username` and `auth_password_hash` must be set together.
  #[error("incomplete auth config: {0} is set without {1}")]
  IncompleteAuth(&'static str, &'static str),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"revise\""),
        );
        res
      }
      Error::IncompleteAuth(..) => {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
      }
    }
  }
}
