//! Handlers for the caller's consents.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/consents` | Current state per application and purpose |
//! | `GET`  | `/consents/history` | Optional `?app=<uuid>` |
//! | `POST` | `/consents` | Grant. Body: `{"appId":…,"purpose":"analytics"}` |
//! | `POST` | `/consents/revoke` | Same body; 404 if not granted |
//! | `POST` | `/apps/{id}/consents/revoke-all` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use privdash_core::{
  consent::{Consent, ConsentChange},
  store::DashboardStore,
};
use privdash_service::Dashboard;
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::Authenticated, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentBody {
  pub app_id:  Uuid,
  pub purpose: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub app: Option<Uuid>,
}

/// `GET /consents`
pub async fn list<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
) -> Result<Json<Vec<Consent>>, ApiError> {
  Ok(Json(dash.list_consents(&principal).await?))
}

/// `GET /consents/history[?app=<uuid>]`
pub async fn history<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<ConsentChange>>, ApiError> {
  Ok(Json(dash.consent_history(&principal, params.app).await?))
}

/// `POST /consents`
pub async fn grant<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Json(body): Json<ConsentBody>,
) -> Result<impl IntoResponse, ApiError> {
  let change = dash.grant_consent(&principal, body.app_id, &body.purpose).await?;
  Ok((StatusCode::CREATED, Json(change)))
}

/// `POST /consents/revoke`
pub async fn revoke<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Json(body): Json<ConsentBody>,
) -> Result<impl IntoResponse, ApiError> {
  let change = dash.revoke_consent(&principal, body.app_id, &body.purpose).await?;
  Ok((StatusCode::CREATED, Json(change)))
}

/// `POST /apps/{id}/consents/revoke-all`
pub async fn revoke_all<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(app_id): Path<Uuid>,
) -> Result<Json<Vec<ConsentChange>>, ApiError> {
  Ok(Json(dash.revoke_all_consents(&principal, app_id).await?))
}
