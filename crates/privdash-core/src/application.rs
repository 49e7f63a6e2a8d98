//! Applications and the user–application association relation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{questionnaire::QuestionnaireResult, user::UserSummary};

/// An application whose data processing the dashboard covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
  pub app_id:        Uuid,
  pub name:          String,
  pub description:   Option<String>,
  /// Processing purposes a subject may consent to.
  pub purposes:      Vec<String>,
  /// Most recent questionnaire evaluation, if staff have completed one.
  pub questionnaire: Option<QuestionnaireResult>,
  pub created_at:    DateTime<Utc>,
}

impl Application {
  pub fn declares_purpose(&self, purpose: &str) -> bool {
    self.purposes.iter().any(|p| p == purpose)
  }
}

/// Input to [`crate::store::DashboardStore::add_application`].
#[derive(Debug, Clone)]
pub struct NewApplication {
  pub name:        String,
  pub description: Option<String>,
  pub purposes:    Vec<String>,
}

/// Records that a user uses (Subject) or owns/oversees (Controller, DPO) an
/// application. A pair is recorded at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
  pub user_id:    Uuid,
  pub app_id:     Uuid,
  pub created_at: DateTime<Utc>,
}

/// The users associated with an application, grouped by role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMembers {
  pub subjects:    Vec<UserSummary>,
  pub controllers: Vec<UserSummary>,
  pub dpos:        Vec<UserSummary>,
}
