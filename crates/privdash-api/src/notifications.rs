//! Handlers for the caller's notification inbox.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/notifications` | Optional `?unread=true` |
//! | `PATCH`  | `/notifications/{id}` | Body: `{"read":true}` |
//! | `DELETE` | `/notifications/{id}` | 204 |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use privdash_core::{notification::Notification, store::DashboardStore};
use privdash_service::Dashboard;
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::Authenticated, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub unread: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarkBody {
  pub read: bool,
}

/// `GET /notifications[?unread=true]`
pub async fn list<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>, ApiError> {
  Ok(Json(dash.notifications(&principal, params.unread).await?))
}

/// `PATCH /notifications/{id}`
pub async fn mark<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<MarkBody>,
) -> Result<Json<Notification>, ApiError> {
  Ok(Json(dash.mark_notification(&principal, id, body.read).await?))
}

/// `DELETE /notifications/{id}`
pub async fn delete<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  dash.delete_notification(&principal, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
