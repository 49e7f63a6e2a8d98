//! Versioned privacy notices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One published version of an application's privacy notice. Publishing
/// never edits an existing version; it appends the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyNotice {
  pub notice_id:    Uuid,
  pub app_id:       Uuid,
  /// Starts at 1 and increases by one per publish.
  pub version:      u32,
  pub content:      String,
  pub published_by: Uuid,
  pub published_at: DateTime<Utc>,
}
