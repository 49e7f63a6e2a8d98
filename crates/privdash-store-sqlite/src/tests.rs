//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::Utc;
use privdash_core::{
  application::{Application, NewApplication},
  consent::ConsentKey,
  message::NewMessage,
  notification::{NewNotification, NotificationKind},
  request::{
    NewGdprRequest, RequestKind, RequestQuery, RequestResponse, RequestStatus,
    Transition,
  },
  role::Role,
  store::DashboardStore,
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, username: &str, role: Role) -> User {
  s.add_user(NewUser {
    username:      username.into(),
    display_name:  username.into(),
    mail:          None,
    role,
    password_hash: "not-a-real-hash".into(),
  })
  .await
  .unwrap()
  .unwrap()
}

async fn app(s: &SqliteStore, name: &str) -> Application {
  s.add_application(NewApplication {
    name:        name.into(),
    description: None,
    purposes:    vec!["analytics".into(), "marketing".into()],
  })
  .await
  .unwrap()
}

fn request(subject: &User, app: &Application, kind: RequestKind) -> NewGdprRequest {
  NewGdprRequest {
    subject_id: subject.user_id,
    app_id:     app.app_id,
    kind,
    other:      None,
    details:    None,
  }
}

fn response(by: &User, text: &str) -> RequestResponse {
  RequestResponse {
    text:         text.into(),
    responded_by: by.user_id,
    handled_at:   Utc::now(),
  }
}

// ─── Users & applications ────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_find_user() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;

  let by_id = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(by_id.username, "alice");
  assert_eq!(by_id.role, Role::Subject);

  let by_name = s.find_user("alice").await.unwrap().unwrap();
  assert_eq!(by_name.user_id, alice.user_id);
  assert_eq!(by_name.password_hash, "not-a-real-hash");

  assert!(s.find_user("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  user(&s, "alice", Role::Subject).await;
  let taken = s
    .add_user(NewUser {
      username:      "alice".into(),
      display_name:  "Alice again".into(),
      mail:          None,
      role:          Role::Dpo,
      password_hash: String::new(),
    })
    .await
    .unwrap();
  assert!(taken.is_none());
  assert_eq!(s.find_user("alice").await.unwrap().unwrap().role, Role::Subject);
}

#[tokio::test]
async fn list_users_filtered_by_role() {
  let s = store().await;
  user(&s, "alice", Role::Subject).await;
  user(&s, "bob", Role::Controller).await;
  user(&s, "carol", Role::Dpo).await;

  assert_eq!(s.list_users(None).await.unwrap().len(), 3);
  let dpos = s.list_users(Some(Role::Dpo)).await.unwrap();
  assert_eq!(dpos.len(), 1);
  assert_eq!(dpos[0].username, "carol");
}

#[tokio::test]
async fn association_is_idempotent() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;
  let x = app(&s, "X").await;

  assert!(!s.is_associated(alice.user_id, x.app_id).await.unwrap());
  let first = s.associate(alice.user_id, x.app_id).await.unwrap();
  let second = s.associate(alice.user_id, x.app_id).await.unwrap();
  assert_eq!(first.created_at, second.created_at);
  assert!(s.is_associated(alice.user_id, x.app_id).await.unwrap());

  let apps = s.applications_of(alice.user_id).await.unwrap();
  assert_eq!(apps.len(), 1);
  assert_eq!(apps[0].purposes, vec!["analytics", "marketing"]);

  let members = s.members_of(x.app_id).await.unwrap();
  assert_eq!(members.len(), 1);
}

// ─── Consent ledger ──────────────────────────────────────────────────────────

#[tokio::test]
async fn regrant_updates_timestamp_only() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;
  let x = app(&s, "X").await;
  let key = ConsentKey::new(alice.user_id, x.app_id, "analytics");

  s.grant_consent(key.clone()).await.unwrap();
  let before = s.current_consents(alice.user_id).await.unwrap();
  s.grant_consent(key).await.unwrap();
  let after = s.current_consents(alice.user_id).await.unwrap();

  assert_eq!(before.len(), 1);
  assert_eq!(after.len(), 1);
  assert!(after[0].granted);
  assert_eq!(before[0].purpose, after[0].purpose);
  assert!(after[0].changed_at >= before[0].changed_at);

  // Both grants are in the audit trail.
  let history = s.consent_history(alice.user_id, None).await.unwrap();
  assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn revoke_requires_active_consent() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;
  let x = app(&s, "X").await;
  let key = ConsentKey::new(alice.user_id, x.app_id, "marketing");

  assert!(s.revoke_consent(key.clone()).await.unwrap().is_none());

  s.grant_consent(key.clone()).await.unwrap();
  let change = s.revoke_consent(key.clone()).await.unwrap().unwrap();
  assert!(!change.granted);

  // Already revoked: nothing appended.
  assert!(s.revoke_consent(key).await.unwrap().is_none());

  let current = s.current_consents(alice.user_id).await.unwrap();
  assert_eq!(current.len(), 1);
  assert!(!current[0].granted);

  let history = s.consent_history(alice.user_id, Some(x.app_id)).await.unwrap();
  let states: Vec<bool> = history.iter().map(|c| c.granted).collect();
  assert_eq!(states, vec![true, false]);
}

#[tokio::test]
async fn revoke_all_only_touches_granted_keys_of_one_app() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;
  let x = app(&s, "X").await;
  let y = app(&s, "Y").await;

  s.grant_consent(ConsentKey::new(alice.user_id, x.app_id, "analytics")).await.unwrap();
  s.grant_consent(ConsentKey::new(alice.user_id, x.app_id, "marketing")).await.unwrap();
  s.grant_consent(ConsentKey::new(alice.user_id, y.app_id, "analytics")).await.unwrap();

  let changes = s.revoke_all_consents(alice.user_id, x.app_id).await.unwrap();
  assert_eq!(changes.len(), 2);

  let current = s.current_consents(alice.user_id).await.unwrap();
  let granted: Vec<_> = current.iter().filter(|c| c.granted).collect();
  assert_eq!(granted.len(), 1);
  assert_eq!(granted[0].app_id, y.app_id);

  assert!(s.revoke_all_consents(alice.user_id, x.app_id).await.unwrap().is_empty());
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn handle_request_transitions_once() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;
  let bob = user(&s, "bob", Role::Controller).await;
  let x = app(&s, "X").await;

  let req = s.insert_request(request(&alice, &x, RequestKind::Access)).await.unwrap();
  assert_eq!(req.status, RequestStatus::Pending);

  let first = s.handle_request(req.request_id, response(&bob, "here is your data")).await.unwrap();
  let Transition::Handled { request: handled, erased } = first else {
    panic!("expected the first call to win");
  };
  assert!(erased.is_none());
  assert_eq!(handled.status, RequestStatus::Handled);
  assert_eq!(handled.responded_by, Some(bob.user_id));

  let second = s.handle_request(req.request_id, response(&bob, "again")).await.unwrap();
  let Transition::AlreadyHandled(unchanged) = second else {
    panic!("expected AlreadyHandled");
  };
  assert_eq!(unchanged.response.as_deref(), Some("here is your data"));
}

#[tokio::test]
async fn handle_unknown_request_is_missing() {
  let s = store().await;
  let bob = user(&s, "bob", Role::Controller).await;
  let outcome = s.handle_request(Uuid::new_v4(), response(&bob, "?")).await.unwrap();
  assert!(matches!(outcome, Transition::Missing));
}

#[tokio::test]
async fn concurrent_handles_have_one_winner() {
  let s = Arc::new(store().await);
  let alice = user(&s, "alice", Role::Subject).await;
  let bob = user(&s, "bob", Role::Controller).await;
  let x = app(&s, "X").await;
  let req = s.insert_request(request(&alice, &x, RequestKind::Info)).await.unwrap();
  let id = req.request_id;

  let mut tasks = Vec::new();
  for i in 0..8 {
    let s = Arc::clone(&s);
    let r = response(&bob, &format!("answer {i}"));
    tasks.push(tokio::spawn(async move { s.handle_request(id, r).await }));
  }

  let mut winners = 0;
  for task in tasks {
    if let Transition::Handled { .. } = task.await.unwrap().unwrap() {
      winners += 1;
    }
  }
  assert_eq!(winners, 1);
}

#[tokio::test]
async fn delete_everything_cascades_but_keeps_itself() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;
  let bob = user(&s, "bob", Role::Controller).await;
  let dave = user(&s, "dave", Role::Subject).await;
  let x = app(&s, "X").await;

  s.grant_consent(ConsentKey::new(alice.user_id, x.app_id, "analytics")).await.unwrap();
  s.grant_consent(ConsentKey::new(dave.user_id, x.app_id, "analytics")).await.unwrap();
  s.insert_message(NewMessage {
    sender_id:    alice.user_id,
    recipient_id: bob.user_id,
    app_id:       x.app_id,
    body:         "hello".into(),
  })
  .await
  .unwrap();
  s.insert_message(NewMessage {
    sender_id:    bob.user_id,
    recipient_id: dave.user_id,
    app_id:       x.app_id,
    body:         "unrelated".into(),
  })
  .await
  .unwrap();
  s.insert_notification(NewNotification {
    recipient_id: alice.user_id,
    sender_id:    Some(bob.user_id),
    kind:         NotificationKind::MessageReceived,
    object_id:    None,
    description:  "ping".into(),
  })
  .await
  .unwrap();
  s.insert_notification(NewNotification {
    recipient_id: bob.user_id,
    sender_id:    Some(alice.user_id),
    kind:         NotificationKind::RequestSubmitted,
    object_id:    None,
    description:  "alice submitted an access request for X".into(),
  })
  .await
  .unwrap();
  s.insert_notification(NewNotification {
    recipient_id: bob.user_id,
    sender_id:    Some(dave.user_id),
    kind:         NotificationKind::MessageReceived,
    object_id:    None,
    description:  "new message from dave about X".into(),
  })
  .await
  .unwrap();
  let earlier = s.insert_request(request(&alice, &x, RequestKind::Access)).await.unwrap();
  let wipe = s
    .insert_request(request(&alice, &x, RequestKind::DeleteEverything))
    .await
    .unwrap();

  let outcome = s.handle_request(wipe.request_id, response(&bob, "done")).await.unwrap();
  let Transition::Handled { erased: Some(report), .. } = outcome else {
    panic!("expected an erasure report");
  };
  assert_eq!(report.consent_changes, 1);
  assert_eq!(report.messages, 1);
  assert_eq!(report.requests, 1);
  assert_eq!(report.notifications, 2);

  assert!(s.current_consents(alice.user_id).await.unwrap().is_empty());
  assert!(s.messages_of(alice.user_id).await.unwrap().is_empty());
  assert!(s.get_request(earlier.request_id).await.unwrap().is_none());

  let kept = s.get_request(wipe.request_id).await.unwrap().unwrap();
  assert_eq!(kept.status, RequestStatus::Handled);

  // Other subjects are untouched.
  assert_eq!(s.current_consents(dave.user_id).await.unwrap().len(), 1);
  assert_eq!(s.messages_of(dave.user_id).await.unwrap().len(), 1);

  // Staff keep what other subjects sent them, nothing that names alice.
  let bob_inbox = s.list_notifications(bob.user_id, false).await.unwrap();
  assert_eq!(bob_inbox.len(), 1);
  assert_eq!(bob_inbox[0].sender_id, Some(dave.user_id));
}

#[tokio::test]
async fn list_requests_filters() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;
  let dave = user(&s, "dave", Role::Subject).await;
  let bob = user(&s, "bob", Role::Controller).await;
  let x = app(&s, "X").await;
  let y = app(&s, "Y").await;

  let a1 = s.insert_request(request(&alice, &x, RequestKind::Access)).await.unwrap();
  s.insert_request(request(&alice, &y, RequestKind::Erasure)).await.unwrap();
  s.insert_request(request(&dave, &x, RequestKind::Complaint)).await.unwrap();
  s.handle_request(a1.request_id, response(&bob, "ok")).await.unwrap();

  let alices = s
    .list_requests(&RequestQuery { subject_id: Some(alice.user_id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(alices.len(), 2);

  let for_x = s
    .list_requests(&RequestQuery { app_ids: vec![x.app_id], ..Default::default() })
    .await
    .unwrap();
  assert_eq!(for_x.len(), 2);

  let pending_x = s
    .list_requests(&RequestQuery {
      app_ids: vec![x.app_id, y.app_id],
      status: Some(RequestStatus::Pending),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(pending_x.len(), 2);
  assert!(pending_x.iter().all(|r| r.status == RequestStatus::Pending));
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn messages_between_is_symmetric_and_ordered() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;
  let bob = user(&s, "bob", Role::Controller).await;
  let x = app(&s, "X").await;

  for (from, to, body) in [(&alice, &bob, "one"), (&bob, &alice, "two"), (&alice, &bob, "three")] {
    s.insert_message(NewMessage {
      sender_id:    from.user_id,
      recipient_id: to.user_id,
      app_id:       x.app_id,
      body:         body.into(),
    })
    .await
    .unwrap();
  }

  let ab = s.messages_between(alice.user_id, bob.user_id).await.unwrap();
  let ba = s.messages_between(bob.user_id, alice.user_id).await.unwrap();
  let bodies: Vec<&str> = ab.iter().map(|m| m.body.as_str()).collect();
  assert_eq!(bodies, vec!["one", "two", "three"]);
  assert_eq!(ab.len(), ba.len());
}

// ─── Privacy notices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn publish_appends_versions() {
  let s = store().await;
  let bob = user(&s, "bob", Role::Controller).await;
  let x = app(&s, "X").await;

  assert!(s.latest_notice(x.app_id).await.unwrap().is_none());

  let v1 = s.publish_notice(x.app_id, "first".into(), bob.user_id).await.unwrap();
  let v2 = s.publish_notice(x.app_id, "second".into(), bob.user_id).await.unwrap();
  assert_eq!(v1.version, 1);
  assert_eq!(v2.version, 2);

  let latest = s.latest_notice(x.app_id).await.unwrap().unwrap();
  assert_eq!(latest.content, "second");

  let history = s.notice_history(x.app_id).await.unwrap();
  let versions: Vec<u32> = history.iter().map(|n| n.version).collect();
  assert_eq!(versions, vec![2, 1]);

  let old = s.get_notice(v1.notice_id).await.unwrap().unwrap();
  assert_eq!(old.content, "first");
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notification_read_state_and_delete() {
  let s = store().await;
  let alice = user(&s, "alice", Role::Subject).await;

  let n = s
    .insert_notification(NewNotification {
      recipient_id: alice.user_id,
      sender_id:    None,
      kind:         NotificationKind::PrivacyNoticeUpdated,
      object_id:    None,
      description:  "notice updated".into(),
    })
    .await
    .unwrap();
  assert!(!n.is_read);

  assert_eq!(s.list_notifications(alice.user_id, true).await.unwrap().len(), 1);

  let read = s.set_notification_read(n.notification_id, true).await.unwrap().unwrap();
  assert!(read.is_read);
  assert!(s.list_notifications(alice.user_id, true).await.unwrap().is_empty());
  assert_eq!(s.list_notifications(alice.user_id, false).await.unwrap().len(), 1);

  assert!(s.set_notification_read(Uuid::new_v4(), true).await.unwrap().is_none());

  assert!(s.delete_notification(n.notification_id).await.unwrap());
  assert!(!s.delete_notification(n.notification_id).await.unwrap());
}
