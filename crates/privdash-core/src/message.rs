//! Point-to-point messages exchanged in the context of an application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
  pub message_id:   Uuid,
  pub sender_id:    Uuid,
  pub recipient_id: Uuid,
  /// The application both parties share.
  pub app_id:       Uuid,
  pub body:         String,
  pub sent_at:      DateTime<Utc>,
}

impl Message {
  pub fn involves(&self, user_id: Uuid) -> bool {
    self.sender_id == user_id || self.recipient_id == user_id
  }

  /// The other party, seen from `user_id`.
  pub fn counterpart(&self, user_id: Uuid) -> Uuid {
    if self.sender_id == user_id { self.recipient_id } else { self.sender_id }
  }
}

/// Input to [`crate::store::DashboardStore::insert_message`].
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub sender_id:    Uuid,
  pub recipient_id: Uuid,
  pub app_id:       Uuid,
  pub body:         String,
}

/// All messages between the caller and one contact, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
  pub contact:  UserSummary,
  pub messages: Vec<Message>,
}
