//! Handlers for applications, their members and contacts.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/apps` | Applications the caller belongs to |
//! | `GET`  | `/apps/{id}` | 403 if not associated |
//! | `GET`  | `/apps/{id}/members` | Subjects only see staff |
//! | `PUT`  | `/apps/{id}/questionnaire` | Body: `{"answers":[…],"notes":[…]}` |
//! | `GET`  | `/questionnaire` | The baseline questions |
//! | `GET`  | `/contacts` | |
//! | `GET`  | `/contacts/{id}/apps` | Applications shared with a contact |

use axum::{
  Json,
  extract::{Path, State},
};
use privdash_core::{
  application::{AppMembers, Application},
  questionnaire::Questionnaire,
  store::DashboardStore,
  user::UserSummary,
};
use privdash_service::{Dashboard, QuestionnaireAnswers};
use serde::Serialize;
use uuid::Uuid;

use crate::{auth::Authenticated, error::ApiError};

// ─── Applications ─────────────────────────────────────────────────────────────

/// `GET /apps`
pub async fn list<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
) -> Result<Json<Vec<Application>>, ApiError> {
  Ok(Json(dash.applications(&principal).await?))
}

/// `GET /apps/{id}`
pub async fn get_one<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Application>, ApiError> {
  Ok(Json(dash.application(&principal, id).await?))
}

/// `GET /apps/{id}/members`
pub async fn members<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<AppMembers>, ApiError> {
  Ok(Json(dash.members(&principal, id).await?))
}

// ─── Questionnaire ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
  pub index:       usize,
  pub text:        &'static str,
  pub choices:     Vec<&'static str>,
  /// `[question, answer]` that must hold for the question to be shown.
  pub visible_if:  Option<(usize, &'static str)>,
  pub allows_note: bool,
}

/// `GET /questionnaire`
pub async fn questionnaire(_: Authenticated) -> Json<Vec<QuestionView>> {
  let questions = Questionnaire::baseline()
    .questions()
    .iter()
    .enumerate()
    .map(|(index, q)| QuestionView {
      index,
      text: q.text,
      choices: q.green.iter().chain(q.orange).chain(q.red).copied().collect(),
      visible_if: q.visible_if.as_ref().map(|v| (v.question, v.equals)),
      allows_note: q.allows_note,
    })
    .collect();
  Json(questions)
}

/// `PUT /apps/{id}/questionnaire`
pub async fn complete_questionnaire<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<QuestionnaireAnswers>,
) -> Result<Json<Application>, ApiError> {
  Ok(Json(dash.complete_questionnaire(&principal, id, body).await?))
}

// ─── Contacts ─────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn contacts<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
  Ok(Json(dash.contacts(&principal).await?))
}

/// `GET /contacts/{id}/apps`
pub async fn common<S: DashboardStore + 'static>(
  State(dash): State<Dashboard<S>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Application>>, ApiError> {
  Ok(Json(dash.common_applications(&principal, id).await?))
}
