//! The `DashboardStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `privdash-store-sqlite`). Higher layers (`privdash-service`,
//! `privdash-api`) depend on this abstraction, not on any concrete backend.
//!
//! Domain outcomes that callers must branch on (an inactive consent, an
//! already-handled request) are returned as values. `Self::Error` is reserved
//! for backend faults.

use std::future::Future;

use uuid::Uuid;

use crate::{
  application::{Application, Association, NewApplication},
  consent::{Consent, ConsentChange, ConsentKey},
  message::{Message, NewMessage},
  notice::PrivacyNotice,
  notification::{NewNotification, Notification},
  questionnaire::QuestionnaireResult,
  request::{GdprRequest, NewGdprRequest, RequestQuery, RequestResponse, Transition},
  role::Role,
  user::{NewUser, User},
};

/// Abstraction over a dashboard storage backend.
///
/// Consent changes and privacy notices are append-only. Every method that
/// writes more than one row applies all of its writes or none of them.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DashboardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Returns `None` if the username is already taken.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// List all users, optionally filtered by role.
  fn list_users(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Applications ──────────────────────────────────────────────────────

  fn add_application(
    &self,
    input: NewApplication,
  ) -> impl Future<Output = Result<Application, Self::Error>> + Send + '_;

  fn get_application(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  fn list_applications(
    &self,
  ) -> impl Future<Output = Result<Vec<Application>, Self::Error>> + Send + '_;

  /// Record that `user_id` is associated with `app_id`. Idempotent: an
  /// existing association is returned unchanged.
  fn associate(
    &self,
    user_id: Uuid,
    app_id: Uuid,
  ) -> impl Future<Output = Result<Association, Self::Error>> + Send + '_;

  fn is_associated(
    &self,
    user_id: Uuid,
    app_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Applications `user_id` is associated with, by name.
  fn applications_of(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Application>, Self::Error>> + Send + '_;

  /// Users associated with `app_id`, by username.
  fn members_of(
    &self,
    app_id: Uuid,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Replace the stored questionnaire result. Returns `None` if the
  /// application does not exist.
  fn save_questionnaire(
    &self,
    app_id: Uuid,
    result: QuestionnaireResult,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  // ── Consent ledger ────────────────────────────────────────────────────

  /// Append a granting change for `key`, whatever its current state.
  fn grant_consent(
    &self,
    key: ConsentKey,
  ) -> impl Future<Output = Result<ConsentChange, Self::Error>> + Send + '_;

  /// Append a revoking change for `key` if it is currently granted.
  /// Returns `None`, appending nothing, otherwise.
  fn revoke_consent(
    &self,
    key: ConsentKey,
  ) -> impl Future<Output = Result<Option<ConsentChange>, Self::Error>> + Send + '_;

  /// Revoke every currently granted consent of `subject_id` in `app_id`.
  fn revoke_all_consents(
    &self,
    subject_id: Uuid,
    app_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ConsentChange>, Self::Error>> + Send + '_;

  /// The latest state of every consent key of `subject_id`.
  fn current_consents(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Consent>, Self::Error>> + Send + '_;

  /// The full change log of `subject_id`, oldest first.
  fn consent_history(
    &self,
    subject_id: Uuid,
    app_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<ConsentChange>, Self::Error>> + Send + '_;

  // ── GDPR requests ─────────────────────────────────────────────────────

  /// Persist a new request in `Pending` state.
  fn insert_request(
    &self,
    input: NewGdprRequest,
  ) -> impl Future<Output = Result<GdprRequest, Self::Error>> + Send + '_;

  fn get_request(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<GdprRequest>, Self::Error>> + Send + '_;

  /// Requests matching `query`, newest first.
  fn list_requests<'a>(
    &'a self,
    query: &'a RequestQuery,
  ) -> impl Future<Output = Result<Vec<GdprRequest>, Self::Error>> + Send + 'a;

  /// Atomically move a request from `Pending` to `Handled`.
  ///
  /// Of any number of concurrent calls for the same request, exactly one
  /// observes `Pending` and returns [`Transition::Handled`]. When the request
  /// is a `DeleteEverything`, the subject's consent changes, messages,
  /// notifications and other requests are erased in the same transaction.
  fn handle_request(
    &self,
    id: Uuid,
    response: RequestResponse,
  ) -> impl Future<Output = Result<Transition, Self::Error>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  fn insert_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// Messages exchanged between two users in either direction, oldest first.
  fn messages_between(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Every message sent or received by `user_id`, oldest first.
  fn messages_of(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  // ── Privacy notices ───────────────────────────────────────────────────

  /// Append the next version of `app_id`'s privacy notice.
  fn publish_notice(
    &self,
    app_id: Uuid,
    content: String,
    published_by: Uuid,
  ) -> impl Future<Output = Result<PrivacyNotice, Self::Error>> + Send + '_;

  fn get_notice(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PrivacyNotice>, Self::Error>> + Send + '_;

  fn latest_notice(
    &self,
    app_id: Uuid,
  ) -> impl Future<Output = Result<Option<PrivacyNotice>, Self::Error>> + Send + '_;

  /// Every version of `app_id`'s notice, newest first.
  fn notice_history(
    &self,
    app_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PrivacyNotice>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn insert_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn get_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  /// Notifications for `user_id`, newest first.
  fn list_notifications(
    &self,
    user_id: Uuid,
    unread_only: bool,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  /// Returns `None` if the notification does not exist.
  fn set_notification_read(
    &self,
    id: Uuid,
    read: bool,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  /// Returns `false` if there was nothing to delete.
  fn delete_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
