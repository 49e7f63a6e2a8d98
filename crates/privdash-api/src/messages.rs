//! Handlers for messaging.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/messages` | Body: `{"recipientId":…,"appId":…,"body":"…"}` |
//! | `GET`  | `/conversations` | Grouped by contact, most recent first |
//! | `GET`  | `/conversations/{contact_id}` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use privdash_core::{message::Conversation, store::DashboardStore};
use privdash_service::{Dashboard, SendMessage};
use uuid::Uuid;

use crate::{auth::Authenticated, error::ApiError};

/// `POST /messages`
pub async fn send<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Json(body): Json<SendMessage>,
) -> Result<impl IntoResponse, ApiError> {
  let message = dash.send_message(&principal, body).await?;
  Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /conversations`
pub async fn conversations<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
) -> Result<Json<Vec<Conversation>>, ApiError> {
  Ok(Json(dash.conversations(&principal).await?))
}

/// `GET /conversations/{contact_id}`
pub async fn conversation<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(contact_id): Path<Uuid>,
) -> Result<Json<Conversation>, ApiError> {
  Ok(Json(dash.conversation(&principal, contact_id).await?))
}
