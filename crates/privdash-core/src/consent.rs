//! Consent ledger types.
//!
//! Consent is never updated in place. Every grant or revocation appends a
//! [`ConsentChange`]; the current state of a (subject, application, purpose)
//! key is the most recent change for that key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one consent: a purpose, for one subject, in one application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentKey {
  pub subject_id: Uuid,
  pub app_id:     Uuid,
  pub purpose:    String,
}

impl ConsentKey {
  pub fn new(subject_id: Uuid, app_id: Uuid, purpose: impl Into<String>) -> Self {
    Self { subject_id, app_id, purpose: purpose.into() }
  }
}

/// One append-only entry in the consent audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentChange {
  pub change_id:   Uuid,
  pub subject_id:  Uuid,
  pub app_id:      Uuid,
  pub purpose:     String,
  pub granted:     bool,
  /// Server-assigned; never changes after creation.
  pub recorded_at: DateTime<Utc>,
}

impl ConsentChange {
  pub fn key(&self) -> ConsentKey {
    ConsentKey::new(self.subject_id, self.app_id, self.purpose.clone())
  }
}

/// The current state of one consent key. Computed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
  pub app_id:     Uuid,
  pub purpose:    String,
  pub granted:    bool,
  /// When the latest change for this key was recorded.
  pub changed_at: DateTime<Utc>,
}

impl From<&ConsentChange> for Consent {
  fn from(c: &ConsentChange) -> Self {
    Self {
      app_id:     c.app_id,
      purpose:    c.purpose.clone(),
      granted:    c.granted,
      changed_at: c.recorded_at,
    }
  }
}
