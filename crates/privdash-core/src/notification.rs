//! Notifications delivered to a user's inbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
  MessageReceived,
  PrivacyNoticeUpdated,
  RequestSubmitted,
  RequestStatusChanged,
  ConsentWithdrawn,
}

/// An event handed to the dispatcher; becomes a [`Notification`] on
/// delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
  pub recipient_id: Uuid,
  pub sender_id:    Option<Uuid>,
  pub kind:         NotificationKind,
  /// The message, notice or request the notification is about.
  pub object_id:    Option<Uuid>,
  pub description:  String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub notification_id: Uuid,
  pub recipient_id:    Uuid,
  pub sender_id:       Option<Uuid>,
  pub kind:            NotificationKind,
  pub object_id:       Option<Uuid>,
  pub description:     String,
  pub created_at:      DateTime<Utc>,
  pub is_read:         bool,
}
