//! Users: the accounts that act on the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// A provisioned account. The role never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:       Uuid,
  pub username:      String,
  pub display_name:  String,
  pub mail:          Option<String>,
  pub role:          Role,
  /// argon2 PHC string; never leaves the process.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

impl User {
  pub fn summary(&self) -> UserSummary {
    UserSummary {
      user_id:      self.user_id,
      username:     self.username.clone(),
      display_name: self.display_name.clone(),
      mail:         self.mail.clone(),
      role:         self.role,
    }
  }
}

/// Input to [`crate::store::DashboardStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub display_name:  String,
  pub mail:          Option<String>,
  pub role:          Role,
  pub password_hash: String,
}

/// The public face of a user, as shown in contact lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
  pub user_id:      Uuid,
  pub username:     String,
  pub display_name: String,
  pub mail:         Option<String>,
  pub role:         Role,
}
