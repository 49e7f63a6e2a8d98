//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings with microsecond precision,
//! so that lexical order equals chronological order. Enums are stored as
//! their snake_case discriminants. Structured fields are stored as compact
//! JSON. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use privdash_core::{
  application::Application,
  consent::{Consent, ConsentChange},
  message::Message,
  notice::PrivacyNotice,
  notification::Notification,
  request::GdprRequest,
  user::User,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Enum discriminants ───────────────────────────────────────────────────────

/// Parse a strum discriminant read from `column`.
pub fn decode_enum<T: FromStr>(column: &'static str, value: String) -> Result<T> {
  value
    .parse()
    .map_err(|_| Error::Discriminant { column, value })
}

// ─── JSON columns ─────────────────────────────────────────────────────────────

pub fn encode_strings(values: &[String]) -> Result<String> {
  Ok(serde_json::to_string(values)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub display_name:  String,
  pub mail:          Option<String>,
  pub role:          String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub const COLUMNS: &'static str =
    "user_id, username, display_name, mail, role, password_hash, created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      username:      row.get(1)?,
      display_name:  row.get(2)?,
      mail:          row.get(3)?,
      role:          row.get(4)?,
      password_hash: row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      display_name:  self.display_name,
      mail:          self.mail,
      role:          decode_enum("role", self.role)?,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `applications` row.
pub struct RawApplication {
  pub app_id:        String,
  pub name:          String,
  pub description:   Option<String>,
  pub purposes:      String,
  pub questionnaire: Option<String>,
  pub created_at:    String,
}

impl RawApplication {
  pub const COLUMNS: &'static str =
    "app_id, name, description, purposes, questionnaire, created_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      app_id:        row.get(0)?,
      name:          row.get(1)?,
      description:   row.get(2)?,
      purposes:      row.get(3)?,
      questionnaire: row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_application(self) -> Result<Application> {
    Ok(Application {
      app_id:        decode_uuid(&self.app_id)?,
      name:          self.name,
      description:   self.description,
      purposes:      serde_json::from_str(&self.purposes)?,
      questionnaire: self
        .questionnaire
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `consent_changes` row.
pub struct RawConsentChange {
  pub change_id:   String,
  pub subject_id:  String,
  pub app_id:      String,
  pub purpose:     String,
  pub granted:     bool,
  pub recorded_at: String,
}

impl RawConsentChange {
  pub const COLUMNS: &'static str =
    "change_id, subject_id, app_id, purpose, granted, recorded_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      change_id:   row.get(0)?,
      subject_id:  row.get(1)?,
      app_id:      row.get(2)?,
      purpose:     row.get(3)?,
      granted:     row.get(4)?,
      recorded_at: row.get(5)?,
    })
  }

  pub fn into_change(self) -> Result<ConsentChange> {
    Ok(ConsentChange {
      change_id:   decode_uuid(&self.change_id)?,
      subject_id:  decode_uuid(&self.subject_id)?,
      app_id:      decode_uuid(&self.app_id)?,
      purpose:     self.purpose,
      granted:     self.granted,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }

  pub fn into_consent(self) -> Result<Consent> {
    self.into_change().map(|c| Consent::from(&c))
  }
}

/// Raw strings read directly from a `gdpr_requests` row.
pub struct RawRequest {
  pub request_id:   String,
  pub subject_id:   String,
  pub app_id:       String,
  pub kind:         String,
  pub status:       String,
  pub other:        Option<String>,
  pub details:      Option<String>,
  pub created_at:   String,
  pub response:     Option<String>,
  pub responded_by: Option<String>,
  pub handled_at:   Option<String>,
}

impl RawRequest {
  pub const COLUMNS: &'static str = "request_id, subject_id, app_id, kind, status, other, \
     details, created_at, response, responded_by, handled_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      request_id:   row.get(0)?,
      subject_id:   row.get(1)?,
      app_id:       row.get(2)?,
      kind:         row.get(3)?,
      status:       row.get(4)?,
      other:        row.get(5)?,
      details:      row.get(6)?,
      created_at:   row.get(7)?,
      response:     row.get(8)?,
      responded_by: row.get(9)?,
      handled_at:   row.get(10)?,
    })
  }

  pub fn into_request(self) -> Result<GdprRequest> {
    Ok(GdprRequest {
      request_id:   decode_uuid(&self.request_id)?,
      subject_id:   decode_uuid(&self.subject_id)?,
      app_id:       decode_uuid(&self.app_id)?,
      kind:         decode_enum("kind", self.kind)?,
      status:       decode_enum("status", self.status)?,
      other:        self.other,
      details:      self.details,
      created_at:   decode_dt(&self.created_at)?,
      response:     self.response,
      responded_by: decode_opt_uuid(self.responded_by)?,
      handled_at:   decode_opt_dt(self.handled_at)?,
    })
  }
}

/// Raw strings read directly from a `messages` row.
pub struct RawMessage {
  pub message_id:   String,
  pub sender_id:    String,
  pub recipient_id: String,
  pub app_id:       String,
  pub body:         String,
  pub sent_at:      String,
}

impl RawMessage {
  pub const COLUMNS: &'static str =
    "message_id, sender_id, recipient_id, app_id, body, sent_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id:   row.get(0)?,
      sender_id:    row.get(1)?,
      recipient_id: row.get(2)?,
      app_id:       row.get(3)?,
      body:         row.get(4)?,
      sent_at:      row.get(5)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      message_id:   decode_uuid(&self.message_id)?,
      sender_id:    decode_uuid(&self.sender_id)?,
      recipient_id: decode_uuid(&self.recipient_id)?,
      app_id:       decode_uuid(&self.app_id)?,
      body:         self.body,
      sent_at:      decode_dt(&self.sent_at)?,
    })
  }
}

/// Raw strings read directly from a `privacy_notices` row.
pub struct RawNotice {
  pub notice_id:    String,
  pub app_id:       String,
  pub version:      u32,
  pub content:      String,
  pub published_by: String,
  pub published_at: String,
}

impl RawNotice {
  pub const COLUMNS: &'static str =
    "notice_id, app_id, version, content, published_by, published_at";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notice_id:    row.get(0)?,
      app_id:       row.get(1)?,
      version:      row.get(2)?,
      content:      row.get(3)?,
      published_by: row.get(4)?,
      published_at: row.get(5)?,
    })
  }

  pub fn into_notice(self) -> Result<PrivacyNotice> {
    Ok(PrivacyNotice {
      notice_id:    decode_uuid(&self.notice_id)?,
      app_id:       decode_uuid(&self.app_id)?,
      version:      self.version,
      content:      self.content,
      published_by: decode_uuid(&self.published_by)?,
      published_at: decode_dt(&self.published_at)?,
    })
  }
}

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub recipient_id:    String,
  pub sender_id:       Option<String>,
  pub kind:            String,
  pub object_id:       Option<String>,
  pub description:     String,
  pub created_at:      String,
  pub is_read:         bool,
}

impl RawNotification {
  pub const COLUMNS: &'static str = "notification_id, recipient_id, sender_id, kind, \
     object_id, description, created_at, is_read";

  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      recipient_id:    row.get(1)?,
      sender_id:       row.get(2)?,
      kind:            row.get(3)?,
      object_id:       row.get(4)?,
      description:     row.get(5)?,
      created_at:      row.get(6)?,
      is_read:         row.get(7)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      recipient_id:    decode_uuid(&self.recipient_id)?,
      sender_id:       decode_opt_uuid(self.sender_id)?,
      kind:            decode_enum("kind", self.kind)?,
      object_id:       decode_opt_uuid(self.object_id)?,
      description:     self.description,
      created_at:      decode_dt(&self.created_at)?,
      is_read:         self.is_read,
    })
  }
}
