//! Handlers for privacy notices.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/notices` | Latest notice of each of the caller's applications |
//! | `GET`  | `/notices/{id}` | |
//! | `GET`  | `/apps/{id}/notices` | Every version, newest first |
//! | `POST` | `/apps/{id}/notices` | Body: `{"content":"…"}`; staff only |
//! | `GET`  | `/apps/{id}/notices/latest` | 404 if never published |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use privdash_core::{notice::PrivacyNotice, store::DashboardStore};
use privdash_service::Dashboard;
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::Authenticated, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct PublishBody {
  pub content: String,
}

/// `GET /notices`
pub async fn mine<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
) -> Result<Json<Vec<PrivacyNotice>>, ApiError> {
  Ok(Json(dash.notices_for_me(&principal).await?))
}

/// `GET /notices/{id}`
pub async fn get_one<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<PrivacyNotice>, ApiError> {
  Ok(Json(dash.get_notice(&principal, id).await?))
}

/// `GET /apps/{id}/notices`
pub async fn history<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(app_id): Path<Uuid>,
) -> Result<Json<Vec<PrivacyNotice>>, ApiError> {
  Ok(Json(dash.notice_history(&principal, app_id).await?))
}

/// `POST /apps/{id}/notices`
pub async fn publish<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(app_id): Path<Uuid>,
  Json(body): Json<PublishBody>,
) -> Result<impl IntoResponse, ApiError> {
  let notice = dash.publish_notice(&principal, app_id, &body.content).await?;
  Ok((StatusCode::CREATED, Json(notice)))
}

/// `GET /apps/{id}/notices/latest`
pub async fn latest<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(app_id): Path<Uuid>,
) -> Result<Json<PrivacyNotice>, ApiError> {
  Ok(Json(dash.latest_notice(&principal, app_id).await?))
}
