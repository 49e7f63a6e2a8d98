//! `GET /me`: who the caller is and what they may do.

use std::collections::BTreeSet;

use axum::{Json, extract::State};
use privdash_core::{role::Capability, store::DashboardStore, user::UserSummary};
use privdash_service::Dashboard;
use serde::Serialize;

use crate::{auth::Authenticated, error::ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
  pub user:         UserSummary,
  pub capabilities: BTreeSet<Capability>,
}

/// `GET /me`
pub async fn get<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
) -> Result<Json<Me>, ApiError> {
  let user = dash.me(&principal).await?;
  let actor = dash.resolve(&principal).await?;
  Ok(Json(Me { user: user.summary(), capabilities: actor.capabilities }))
}
