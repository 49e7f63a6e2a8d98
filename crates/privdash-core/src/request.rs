//! GDPR requests and their two-state lifecycle.
//!
//! A request is created `Pending` and moves to `Handled` exactly once. The
//! transition records the response and the responder; it is never reversed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The data-subject right a request exercises.
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
pub enum RequestKind {
  Access,
  Info,
  Erasure,
  Complaint,
  WithdrawConsent,
  DeleteEverything,
  Portability,
}

impl RequestKind {
  /// How the kind reads in notification text.
  pub fn label(self) -> &'static str {
    match self {
      RequestKind::Access => "access",
      RequestKind::Info => "information",
      RequestKind::Erasure => "erasure",
      RequestKind::Complaint => "complaint",
      RequestKind::WithdrawConsent => "consent withdrawal",
      RequestKind::DeleteEverything => "delete-everything",
      RequestKind::Portability => "portability",
    }
  }

  /// The label with its indefinite article: "an access", "a complaint".
  pub fn with_article(self) -> String {
    let label = self.label();
    let article = if label.starts_with(['a', 'e', 'i', 'o', 'u']) { "an" } else { "a" };
    format!("{article} {label}")
  }
}

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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
  Pending,
  Handled,
}

/// A formal request from a subject to the staff of one application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GdprRequest {
  pub request_id:   Uuid,
  pub subject_id:   Uuid,
  pub app_id:       Uuid,
  pub kind:         RequestKind,
  pub status:       RequestStatus,
  /// For `WithdrawConsent`, the purpose being withdrawn.
  pub other:        Option<String>,
  pub details:      Option<String>,
  pub created_at:   DateTime<Utc>,
  pub response:     Option<String>,
  pub responded_by: Option<Uuid>,
  pub handled_at:   Option<DateTime<Utc>>,
}

impl GdprRequest {
  pub fn is_handled(&self) -> bool { self.status == RequestStatus::Handled }
}

/// Input to [`crate::store::DashboardStore::insert_request`].
#[derive(Debug, Clone)]
pub struct NewGdprRequest {
  pub subject_id: Uuid,
  pub app_id:     Uuid,
  pub kind:       RequestKind,
  pub other:      Option<String>,
  pub details:    Option<String>,
}

/// The response recorded when a request is handled.
#[derive(Debug, Clone)]
pub struct RequestResponse {
  pub text:         String,
  pub responded_by: Uuid,
  pub handled_at:   DateTime<Utc>,
}

/// Rows removed by a delete-everything cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErasureReport {
  pub consent_changes: usize,
  pub messages:        usize,
  pub requests:        usize,
  pub notifications:   usize,
}

/// Result of attempting the `Pending → Handled` transition.
#[derive(Debug, Clone)]
pub enum Transition {
  /// This call won the transition.
  Handled {
    request: GdprRequest,
    /// Set when the request was a `DeleteEverything`.
    erased:  Option<ErasureReport>,
  },
  /// The request was already handled; it is returned unchanged.
  AlreadyHandled(GdprRequest),
  Missing,
}

/// Filter for [`crate::store::DashboardStore::list_requests`].
#[derive(Debug, Clone, Default)]
pub struct RequestQuery {
  pub subject_id: Option<Uuid>,
  /// If non-empty, only requests addressed to one of these applications.
  pub app_ids:    Vec<Uuid>,
  pub status:     Option<RequestStatus>,
}
