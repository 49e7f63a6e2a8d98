//! [`SqliteStore`]: the SQLite implementation of [`DashboardStore`].

use std::path::Path;

use chrono::Utc;
use privdash_core::{
  application::{Application, Association, NewApplication},
  consent::{Consent, ConsentChange, ConsentKey},
  message::{Message, NewMessage},
  notice::PrivacyNotice,
  notification::{NewNotification, Notification},
  questionnaire::QuestionnaireResult,
  request::{
    ErasureReport, GdprRequest, NewGdprRequest, RequestKind, RequestQuery,
    RequestResponse, RequestStatus, Transition,
  },
  role::Role,
  store::DashboardStore,
  user::{NewUser, User},
};
use rusqlite::{OptionalExtension as _, Row};
use uuid::Uuid;

use crate::{
  encode::{
    RawApplication, RawConsentChange, RawMessage, RawNotice, RawNotification,
    RawRequest, RawUser, decode_dt, encode_dt, encode_strings, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Latest change per (subject, app, purpose) key; `?1` is the subject.
const CURRENT_CONSENTS: &str = "
  SELECT c.change_id, c.subject_id, c.app_id, c.purpose, c.granted, c.recorded_at
  FROM consent_changes c
  WHERE c.subject_id = ?1
    AND c.seq = (
      SELECT MAX(m.seq) FROM consent_changes m
      WHERE m.subject_id = c.subject_id
        AND m.app_id     = c.app_id
        AND m.purpose    = c.purpose
    )";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A dashboard store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Undecoded outcome of [`DashboardStore::handle_request`].
enum RawTransition {
  Handled(RawRequest, Option<ErasureReport>),
  AlreadyHandled(RawRequest),
  Missing,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `sql` and map every row with `from_row`.
  async fn fetch_all<T>(
    &self,
    sql: String,
    params: Vec<String>,
    from_row: fn(&Row<'_>) -> rusqlite::Result<T>,
  ) -> Result<Vec<T>>
  where
    T: Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run `sql` and map the first row, if any, with `from_row`.
  async fn fetch_optional<T>(
    &self,
    sql: String,
    params: Vec<String>,
    from_row: fn(&Row<'_>) -> rusqlite::Result<T>,
  ) -> Result<Option<T>>
  where
    T: Send + 'static,
  {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params_from_iter(params.iter()), from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  /// Run a single write statement and return the number of changed rows.
  async fn execute(&self, sql: &'static str, params: Vec<Option<String>>) -> Result<usize> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params.iter()))?))
      .await?;
    Ok(changed)
  }
}

// ─── DashboardStore impl ─────────────────────────────────────────────────────

impl DashboardStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      display_name:  input.display_name,
      mail:          input.mail,
      role:          input.role,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let inserted = self
      .execute(
        "INSERT INTO users (
           user_id, username, display_name, mail, role, password_hash, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (username) DO NOTHING",
        vec![
          Some(encode_uuid(user.user_id)),
          Some(user.username.clone()),
          Some(user.display_name.clone()),
          user.mail.clone(),
          Some(user.role.as_ref().to_owned()),
          Some(user.password_hash.clone()),
          Some(encode_dt(user.created_at)),
        ],
      )
      .await?;

    Ok((inserted == 1).then_some(user))
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS);
    self
      .fetch_optional(sql, vec![encode_uuid(id)], RawUser::from_row)
      .await?
      .map(RawUser::into_user)
      .transpose()
  }

  async fn find_user(&self, username: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE username = ?1", RawUser::COLUMNS);
    self
      .fetch_optional(sql, vec![username.to_owned()], RawUser::from_row)
      .await?
      .map(RawUser::into_user)
      .transpose()
  }

  async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
    let (sql, params) = match role {
      Some(r) => (
        format!("SELECT {} FROM users WHERE role = ?1 ORDER BY username", RawUser::COLUMNS),
        vec![r.as_ref().to_owned()],
      ),
      None => (
        format!("SELECT {} FROM users ORDER BY username", RawUser::COLUMNS),
        vec![],
      ),
    };
    self
      .fetch_all(sql, params, RawUser::from_row)
      .await?
      .into_iter()
      .map(RawUser::into_user)
      .collect()
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn add_application(&self, input: NewApplication) -> Result<Application> {
    let app = Application {
      app_id:        Uuid::new_v4(),
      name:          input.name,
      description:   input.description,
      purposes:      input.purposes,
      questionnaire: None,
      created_at:    Utc::now(),
    };

    self
      .execute(
        "INSERT INTO applications (app_id, name, description, purposes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        vec![
          Some(encode_uuid(app.app_id)),
          Some(app.name.clone()),
          app.description.clone(),
          Some(encode_strings(&app.purposes)?),
          Some(encode_dt(app.created_at)),
        ],
      )
      .await?;

    Ok(app)
  }

  async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
    let sql = format!(
      "SELECT {} FROM applications WHERE app_id = ?1",
      RawApplication::COLUMNS
    );
    self
      .fetch_optional(sql, vec![encode_uuid(id)], RawApplication::from_row)
      .await?
      .map(RawApplication::into_application)
      .transpose()
  }

  async fn list_applications(&self) -> Result<Vec<Application>> {
    let sql = format!("SELECT {} FROM applications ORDER BY name", RawApplication::COLUMNS);
    self
      .fetch_all(sql, vec![], RawApplication::from_row)
      .await?
      .into_iter()
      .map(RawApplication::into_application)
      .collect()
  }

  async fn associate(&self, user_id: Uuid, app_id: Uuid) -> Result<Association> {
    let user_str = encode_uuid(user_id);
    let app_str  = encode_uuid(app_id);
    let now_str  = encode_dt(Utc::now());

    let created_at: String = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO associations (user_id, app_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_str, app_str, now_str],
        )?;
        Ok(conn.query_row(
          "SELECT created_at FROM associations WHERE user_id = ?1 AND app_id = ?2",
          rusqlite::params![user_str, app_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(Association { user_id, app_id, created_at: decode_dt(&created_at)? })
  }

  async fn is_associated(&self, user_id: Uuid, app_id: Uuid) -> Result<bool> {
    let found = self
      .fetch_optional(
        "SELECT 1 FROM associations WHERE user_id = ?1 AND app_id = ?2".to_owned(),
        vec![encode_uuid(user_id), encode_uuid(app_id)],
        |_| Ok(()),
      )
      .await?;
    Ok(found.is_some())
  }

  async fn applications_of(&self, user_id: Uuid) -> Result<Vec<Application>> {
    let sql = format!(
      "SELECT {} FROM applications
       WHERE app_id IN (SELECT app_id FROM associations WHERE user_id = ?1)
       ORDER BY name",
      RawApplication::COLUMNS
    );
    self
      .fetch_all(sql, vec![encode_uuid(user_id)], RawApplication::from_row)
      .await?
      .into_iter()
      .map(RawApplication::into_application)
      .collect()
  }

  async fn members_of(&self, app_id: Uuid) -> Result<Vec<User>> {
    let sql = format!(
      "SELECT {} FROM users
       WHERE user_id IN (SELECT user_id FROM associations WHERE app_id = ?1)
       ORDER BY username",
      RawUser::COLUMNS
    );
    self
      .fetch_all(sql, vec![encode_uuid(app_id)], RawUser::from_row)
      .await?
      .into_iter()
      .map(RawUser::into_user)
      .collect()
  }

  async fn save_questionnaire(
    &self,
    app_id: Uuid,
    result: QuestionnaireResult,
  ) -> Result<Option<Application>> {
    let changed = self
      .execute(
        "UPDATE applications SET questionnaire = ?2 WHERE app_id = ?1",
        vec![Some(encode_uuid(app_id)), Some(serde_json::to_string(&result)?)],
      )
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_application(app_id).await
  }

  // ── Consent ledger ────────────────────────────────────────────────────────

  async fn grant_consent(&self, key: ConsentKey) -> Result<ConsentChange> {
    let change = ConsentChange {
      change_id:   Uuid::new_v4(),
      subject_id:  key.subject_id,
      app_id:      key.app_id,
      purpose:     key.purpose,
      granted:     true,
      recorded_at: Utc::now(),
    };

    self
      .execute(
        "INSERT INTO consent_changes (
           change_id, subject_id, app_id, purpose, granted, recorded_at
         ) VALUES (?1, ?2, ?3, ?4, 1, ?5)",
        vec![
          Some(encode_uuid(change.change_id)),
          Some(encode_uuid(change.subject_id)),
          Some(encode_uuid(change.app_id)),
          Some(change.purpose.clone()),
          Some(encode_dt(change.recorded_at)),
        ],
      )
      .await?;

    Ok(change)
  }

  async fn revoke_consent(&self, key: ConsentKey) -> Result<Option<ConsentChange>> {
    let revoked = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let subject_str = encode_uuid(key.subject_id);
        let app_str     = encode_uuid(key.app_id);

        let granted: Option<bool> = tx
          .query_row(
            "SELECT granted FROM consent_changes
             WHERE subject_id = ?1 AND app_id = ?2 AND purpose = ?3
             ORDER BY seq DESC LIMIT 1",
            rusqlite::params![subject_str, app_str, key.purpose],
            |r| r.get(0),
          )
          .optional()?;

        if granted != Some(true) {
          return Ok(None);
        }

        let change = ConsentChange {
          change_id:   Uuid::new_v4(),
          subject_id:  key.subject_id,
          app_id:      key.app_id,
          purpose:     key.purpose,
          granted:     false,
          recorded_at: Utc::now(),
        };
        tx.execute(
          "INSERT INTO consent_changes (
             change_id, subject_id, app_id, purpose, granted, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, 0, ?5)",
          rusqlite::params![
            encode_uuid(change.change_id),
            subject_str,
            app_str,
            change.purpose,
            encode_dt(change.recorded_at),
          ],
        )?;
        tx.commit()?;
        Ok(Some(change))
      })
      .await?;
    Ok(revoked)
  }

  async fn revoke_all_consents(
    &self,
    subject_id: Uuid,
    app_id: Uuid,
  ) -> Result<Vec<ConsentChange>> {
    let changes = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let subject_str = encode_uuid(subject_id);
        let app_str     = encode_uuid(app_id);

        let purposes: Vec<String> = {
          let mut stmt = tx.prepare(&format!(
            "{CURRENT_CONSENTS} AND c.app_id = ?2 AND c.granted = 1 ORDER BY c.purpose"
          ))?;
          stmt
            .query_map(rusqlite::params![subject_str, app_str], |r| r.get(3))?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let recorded_at = Utc::now();
        let mut changes = Vec::with_capacity(purposes.len());
        for purpose in purposes {
          let change = ConsentChange {
            change_id: Uuid::new_v4(),
            subject_id,
            app_id,
            purpose,
            granted: false,
            recorded_at,
          };
          tx.execute(
            "INSERT INTO consent_changes (
               change_id, subject_id, app_id, purpose, granted, recorded_at
             ) VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            rusqlite::params![
              encode_uuid(change.change_id),
              subject_str,
              app_str,
              change.purpose,
              encode_dt(recorded_at),
            ],
          )?;
          changes.push(change);
        }
        tx.commit()?;
        Ok(changes)
      })
      .await?;
    Ok(changes)
  }

  async fn current_consents(&self, subject_id: Uuid) -> Result<Vec<Consent>> {
    let sql = format!("{CURRENT_CONSENTS} ORDER BY c.app_id, c.purpose");
    self
      .fetch_all(sql, vec![encode_uuid(subject_id)], RawConsentChange::from_row)
      .await?
      .into_iter()
      .map(RawConsentChange::into_consent)
      .collect()
  }

  async fn consent_history(
    &self,
    subject_id: Uuid,
    app_id: Option<Uuid>,
  ) -> Result<Vec<ConsentChange>> {
    let mut sql = format!(
      "SELECT {} FROM consent_changes WHERE subject_id = ?1",
      RawConsentChange::COLUMNS
    );
    let mut params = vec![encode_uuid(subject_id)];
    if let Some(app_id) = app_id {
      sql.push_str(" AND app_id = ?2");
      params.push(encode_uuid(app_id));
    }
    sql.push_str(" ORDER BY seq");

    self
      .fetch_all(sql, params, RawConsentChange::from_row)
      .await?
      .into_iter()
      .map(RawConsentChange::into_change)
      .collect()
  }

  // ── GDPR requests ─────────────────────────────────────────────────────────

  async fn insert_request(&self, input: NewGdprRequest) -> Result<GdprRequest> {
    let request = GdprRequest {
      request_id:   Uuid::new_v4(),
      subject_id:   input.subject_id,
      app_id:       input.app_id,
      kind:         input.kind,
      status:       RequestStatus::Pending,
      other:        input.other,
      details:      input.details,
      created_at:   Utc::now(),
      response:     None,
      responded_by: None,
      handled_at:   None,
    };

    self
      .execute(
        "INSERT INTO gdpr_requests (
           request_id, subject_id, app_id, kind, status, other, details, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        vec![
          Some(encode_uuid(request.request_id)),
          Some(encode_uuid(request.subject_id)),
          Some(encode_uuid(request.app_id)),
          Some(request.kind.as_ref().to_owned()),
          Some(request.status.as_ref().to_owned()),
          request.other.clone(),
          request.details.clone(),
          Some(encode_dt(request.created_at)),
        ],
      )
      .await?;

    Ok(request)
  }

  async fn get_request(&self, id: Uuid) -> Result<Option<GdprRequest>> {
    let sql = format!(
      "SELECT {} FROM gdpr_requests WHERE request_id = ?1",
      RawRequest::COLUMNS
    );
    self
      .fetch_optional(sql, vec![encode_uuid(id)], RawRequest::from_row)
      .await?
      .map(RawRequest::into_request)
      .transpose()
  }

  async fn list_requests(&self, query: &RequestQuery) -> Result<Vec<GdprRequest>> {
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<String> = vec![];

    if let Some(subject_id) = query.subject_id {
      params.push(encode_uuid(subject_id));
      conds.push(format!("subject_id = ?{}", params.len()));
    }
    if !query.app_ids.is_empty() {
      let mut slots = Vec::with_capacity(query.app_ids.len());
      for app_id in &query.app_ids {
        params.push(encode_uuid(*app_id));
        slots.push(format!("?{}", params.len()));
      }
      conds.push(format!("app_id IN ({})", slots.join(", ")));
    }
    if let Some(status) = query.status {
      params.push(status.as_ref().to_owned());
      conds.push(format!("status = ?{}", params.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    let sql = format!(
      "SELECT {} FROM gdpr_requests {where_clause} ORDER BY created_at DESC, rowid DESC",
      RawRequest::COLUMNS
    );

    self
      .fetch_all(sql, params, RawRequest::from_row)
      .await?
      .into_iter()
      .map(RawRequest::into_request)
      .collect()
  }

  async fn handle_request(
    &self,
    id: Uuid,
    response: RequestResponse,
  ) -> Result<Transition> {
    let id_str        = encode_uuid(id);
    let responder_str = encode_uuid(response.responded_by);
    let at_str        = encode_dt(response.handled_at);
    let erase_kind    = RequestKind::DeleteEverything.as_ref().to_owned();
    let select_sql    = format!(
      "SELECT {} FROM gdpr_requests WHERE request_id = ?1",
      RawRequest::COLUMNS
    );

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let changed = tx.execute(
          "UPDATE gdpr_requests
           SET status = 'handled', response = ?2, responded_by = ?3, handled_at = ?4
           WHERE request_id = ?1 AND status = 'pending'",
          rusqlite::params![id_str, response.text, responder_str, at_str],
        )?;

        let row = tx
          .query_row(&select_sql, rusqlite::params![id_str], RawRequest::from_row)
          .optional()?;
        let Some(row) = row else {
          return Ok(RawTransition::Missing);
        };
        if changed == 0 {
          return Ok(RawTransition::AlreadyHandled(row));
        }

        let erased = if row.kind == erase_kind {
          let subject = row.subject_id.clone();
          Some(ErasureReport {
            consent_changes: tx.execute(
              "DELETE FROM consent_changes WHERE subject_id = ?1",
              rusqlite::params![subject],
            )?,
            messages:        tx.execute(
              "DELETE FROM messages WHERE sender_id = ?1 OR recipient_id = ?1",
              rusqlite::params![subject],
            )?,
            requests:        tx.execute(
              "DELETE FROM gdpr_requests WHERE subject_id = ?1 AND request_id != ?2",
              rusqlite::params![subject, id_str],
            )?,
            notifications:   tx.execute(
              "DELETE FROM notifications WHERE recipient_id = ?1 OR sender_id = ?1",
              rusqlite::params![subject],
            )?,
          })
        } else {
          None
        };

        tx.commit()?;
        Ok(RawTransition::Handled(row, erased))
      })
      .await?;

    Ok(match raw {
      RawTransition::Handled(row, erased) => {
        Transition::Handled { request: row.into_request()?, erased }
      }
      RawTransition::AlreadyHandled(row) => Transition::AlreadyHandled(row.into_request()?),
      RawTransition::Missing => Transition::Missing,
    })
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn insert_message(&self, input: NewMessage) -> Result<Message> {
    let message = Message {
      message_id:   Uuid::new_v4(),
      sender_id:    input.sender_id,
      recipient_id: input.recipient_id,
      app_id:       input.app_id,
      body:         input.body,
      sent_at:      Utc::now(),
    };

    self
      .execute(
        "INSERT INTO messages (message_id, sender_id, recipient_id, app_id, body, sent_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        vec![
          Some(encode_uuid(message.message_id)),
          Some(encode_uuid(message.sender_id)),
          Some(encode_uuid(message.recipient_id)),
          Some(encode_uuid(message.app_id)),
          Some(message.body.clone()),
          Some(encode_dt(message.sent_at)),
        ],
      )
      .await?;

    Ok(message)
  }

  async fn messages_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>> {
    let sql = format!(
      "SELECT {} FROM messages
       WHERE (sender_id = ?1 AND recipient_id = ?2)
          OR (sender_id = ?2 AND recipient_id = ?1)
       ORDER BY sent_at, rowid",
      RawMessage::COLUMNS
    );
    self
      .fetch_all(sql, vec![encode_uuid(a), encode_uuid(b)], RawMessage::from_row)
      .await?
      .into_iter()
      .map(RawMessage::into_message)
      .collect()
  }

  async fn messages_of(&self, user_id: Uuid) -> Result<Vec<Message>> {
    let sql = format!(
      "SELECT {} FROM messages
       WHERE sender_id = ?1 OR recipient_id = ?1
       ORDER BY sent_at, rowid",
      RawMessage::COLUMNS
    );
    self
      .fetch_all(sql, vec![encode_uuid(user_id)], RawMessage::from_row)
      .await?
      .into_iter()
      .map(RawMessage::into_message)
      .collect()
  }

  // ── Privacy notices ───────────────────────────────────────────────────────

  async fn publish_notice(
    &self,
    app_id: Uuid,
    content: String,
    published_by: Uuid,
  ) -> Result<PrivacyNotice> {
    let notice = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let app_str = encode_uuid(app_id);

        let latest: u32 = tx.query_row(
          "SELECT COALESCE(MAX(version), 0) FROM privacy_notices WHERE app_id = ?1",
          rusqlite::params![app_str],
          |r| r.get(0),
        )?;

        let notice = PrivacyNotice {
          notice_id: Uuid::new_v4(),
          app_id,
          version: latest + 1,
          content,
          published_by,
          published_at: Utc::now(),
        };
        tx.execute(
          "INSERT INTO privacy_notices (
             notice_id, app_id, version, content, published_by, published_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            encode_uuid(notice.notice_id),
            app_str,
            notice.version,
            notice.content,
            encode_uuid(published_by),
            encode_dt(notice.published_at),
          ],
        )?;
        tx.commit()?;
        Ok(notice)
      })
      .await?;
    Ok(notice)
  }

  async fn get_notice(&self, id: Uuid) -> Result<Option<PrivacyNotice>> {
    let sql = format!(
      "SELECT {} FROM privacy_notices WHERE notice_id = ?1",
      RawNotice::COLUMNS
    );
    self
      .fetch_optional(sql, vec![encode_uuid(id)], RawNotice::from_row)
      .await?
      .map(RawNotice::into_notice)
      .transpose()
  }

  async fn latest_notice(&self, app_id: Uuid) -> Result<Option<PrivacyNotice>> {
    let sql = format!(
      "SELECT {} FROM privacy_notices WHERE app_id = ?1 ORDER BY version DESC LIMIT 1",
      RawNotice::COLUMNS
    );
    self
      .fetch_optional(sql, vec![encode_uuid(app_id)], RawNotice::from_row)
      .await?
      .map(RawNotice::into_notice)
      .transpose()
  }

  async fn notice_history(&self, app_id: Uuid) -> Result<Vec<PrivacyNotice>> {
    let sql = format!(
      "SELECT {} FROM privacy_notices WHERE app_id = ?1 ORDER BY version DESC",
      RawNotice::COLUMNS
    );
    self
      .fetch_all(sql, vec![encode_uuid(app_id)], RawNotice::from_row)
      .await?
      .into_iter()
      .map(RawNotice::into_notice)
      .collect()
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn insert_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      recipient_id:    input.recipient_id,
      sender_id:       input.sender_id,
      kind:            input.kind,
      object_id:       input.object_id,
      description:     input.description,
      created_at:      Utc::now(),
      is_read:         false,
    };

    self
      .execute(
        "INSERT INTO notifications (
           notification_id, recipient_id, sender_id, kind, object_id,
           description, created_at, is_read
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
        vec![
          Some(encode_uuid(notification.notification_id)),
          Some(encode_uuid(notification.recipient_id)),
          notification.sender_id.map(encode_uuid),
          Some(notification.kind.as_ref().to_owned()),
          notification.object_id.map(encode_uuid),
          Some(notification.description.clone()),
          Some(encode_dt(notification.created_at)),
        ],
      )
      .await?;

    Ok(notification)
  }

  async fn get_notification(&self, id: Uuid) -> Result<Option<Notification>> {
    let sql = format!(
      "SELECT {} FROM notifications WHERE notification_id = ?1",
      RawNotification::COLUMNS
    );
    self
      .fetch_optional(sql, vec![encode_uuid(id)], RawNotification::from_row)
      .await?
      .map(RawNotification::into_notification)
      .transpose()
  }

  async fn list_notifications(
    &self,
    user_id: Uuid,
    unread_only: bool,
  ) -> Result<Vec<Notification>> {
    let filter = if unread_only { " AND is_read = 0" } else { "" };
    let sql = format!(
      "SELECT {} FROM notifications WHERE recipient_id = ?1{filter}
       ORDER BY created_at DESC, rowid DESC",
      RawNotification::COLUMNS
    );
    self
      .fetch_all(sql, vec![encode_uuid(user_id)], RawNotification::from_row)
      .await?
      .into_iter()
      .map(RawNotification::into_notification)
      .collect()
  }

  async fn set_notification_read(
    &self,
    id: Uuid,
    read: bool,
  ) -> Result<Option<Notification>> {
    let changed = self
      .execute(
        "UPDATE notifications SET is_read = ?2 WHERE notification_id = ?1",
        vec![Some(encode_uuid(id)), Some(if read { "1" } else { "0" }.to_owned())],
      )
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_notification(id).await
  }

  async fn delete_notification(&self, id: Uuid) -> Result<bool> {
    let changed = self
      .execute(
        "DELETE FROM notifications WHERE notification_id = ?1",
        vec![Some(encode_uuid(id))],
      )
      .await?;
    Ok(changed > 0)
  }
}
