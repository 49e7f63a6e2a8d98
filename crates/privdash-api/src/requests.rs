//! Handlers for `/requests` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/requests` | Optional `?status=pending\|handled` |
//! | `POST` | `/requests` | Body: `{"appId":…,"kind":"access"}` |
//! | `GET`  | `/requests/{id}` | |
//! | `POST` | `/requests/{id}/respond` | Body: `{"response":"…"}`; 409 if handled |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use privdash_core::{
  request::{GdprRequest, RequestStatus},
  store::DashboardStore,
};
use privdash_service::{Dashboard, SubmitRequest};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::Authenticated, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<RequestStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
  pub response: String,
}

/// `GET /requests[?status=<status>]`
pub async fn list<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<GdprRequest>>, ApiError> {
  Ok(Json(dash.list_requests(&principal, params.status).await?))
}

/// `POST /requests`
pub async fn submit<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Json(body): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let request = dash.submit_request(&principal, body).await?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `GET /requests/{id}`
pub async fn get_one<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<GdprRequest>, ApiError> {
  Ok(Json(dash.get_request(&principal, id).await?))
}

/// `POST /requests/{id}/respond`
pub async fn respond<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<RespondBody>,
) -> Result<Json<GdprRequest>, ApiError> {
  Ok(Json(dash.respond_to_request(&principal, id, &body.response).await?))
}
