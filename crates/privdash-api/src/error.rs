//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! | Error | Status |
//! |-------|--------|
//! | missing or bad credentials | 401 |
//! | `Validation` | 422 |
//! | `Authorization` | 403 |
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `Serialization`, `Store` | 500 |

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use privdash_core::Error;
use serde_json::json;

/// An error returned by an API handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("authentication required")]
  Unauthenticated,

  #[error(transparent)]
  Domain(#[from] Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthenticated => {
        let body = Json(json!({ "error": self.to_string() }));
        return (
          StatusCode::UNAUTHORIZED,
          [(header::WWW_AUTHENTICATE, r#"Basic realm="privdash""#)],
          body,
        )
          .into_response();
      }
      ApiError::Domain(e) => match e {
        Error::Validation(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
        Error::Authorization(m) => (StatusCode::FORBIDDEN, m.clone()),
        Error::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
        Error::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
        Error::Serialization(_) | Error::Store(_) => {
          tracing::error!(error = %e, "request failed");
          (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
        }
      },
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
