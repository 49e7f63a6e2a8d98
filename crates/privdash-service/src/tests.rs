//! Dashboard operations against an in-memory SQLite store.

use std::sync::Arc;

use privdash_core::{
  Entity, Error,
  application::{Application, NewApplication},
  notification::{NewNotification, NotificationKind},
  questionnaire::Vote,
  request::{RequestKind, RequestStatus},
  role::{Principal, Role},
  store::DashboardStore,
  user::{NewUser, User},
};
use privdash_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{
  Dashboard, DispatchConfig, DispatchWorker, Dispatcher, NewAccount, NotificationSink,
  QuestionnaireAnswers, SendMessage, SubmitRequest,
};

// ─── Fixture ──────────────────────────────────────────────────────────────────

/// alice and dave are subjects of `x`, bob controls it, carol is a DPO of
/// nothing.
struct World {
  dash:   Dashboard<SqliteStore>,
  worker: DispatchWorker,
  store:  Arc<SqliteStore>,
  alice:  User,
  bob:    User,
  carol:  User,
  dave:   User,
  x:      Application,
}

impl World {
  /// Stop the dispatcher once its queue is drained and hand back the store.
  async fn settle(self) -> Arc<SqliteStore> {
    let World { dash, worker, store, .. } = self;
    drop(dash);
    worker.join().await;
    store
  }
}

fn config() -> DispatchConfig {
  DispatchConfig { queue_capacity: 64, max_attempts: 2, retry_backoff_ms: 1 }
}

async fn user(store: &SqliteStore, username: &str, role: Role) -> User {
  store
    .add_user(NewUser {
      username:      username.into(),
      display_name:  username.into(),
      mail:          None,
      role,
      password_hash: "unused".into(),
    })
    .await
    .unwrap()
    .unwrap()
}

async fn app(store: &SqliteStore, name: &str) -> Application {
  store
    .add_application(NewApplication {
      name:        name.into(),
      description: None,
      purposes:    vec!["analytics".into(), "marketing".into()],
    })
    .await
    .unwrap()
}

async fn world() -> World {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let alice = user(&store, "alice", Role::Subject).await;
  let bob = user(&store, "bob", Role::Controller).await;
  let carol = user(&store, "carol", Role::Dpo).await;
  let dave = user(&store, "dave", Role::Subject).await;
  let x = app(&store, "X").await;
  for u in [&alice, &bob, &dave] {
    store.associate(u.user_id, x.app_id).await.unwrap();
  }

  let (dash, worker) = Dashboard::with_store_sink(Arc::clone(&store), config());
  World { dash, worker, store, alice, bob, carol, dave, x }
}

fn p(user: &User) -> Principal { Principal::new(user.user_id) }

fn submission(app: &Application, kind: RequestKind) -> SubmitRequest {
  SubmitRequest { app_id: app.app_id, kind, other: None, details: None }
}

fn message(to: &User, app: &Application, body: &str) -> SendMessage {
  SendMessage { recipient_id: to.user_id, app_id: app.app_id, body: body.into() }
}

// ─── Identity ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_unknown_principal_is_unauthorized() {
  let w = world().await;
  let err = w.dash.resolve(&Principal::new(Uuid::new_v4())).await.unwrap_err();
  assert!(matches!(err, Error::Authorization(_)));
  assert_eq!(w.dash.resolve_role(&p(&w.carol)).await.unwrap(), Role::Dpo);
}

#[tokio::test]
async fn authenticate_checks_password() {
  let w = world().await;
  let erin = w
    .dash
    .provision_user(NewAccount {
      username:     "erin".into(),
      display_name: String::new(),
      mail:         None,
      role:         Role::Subject,
      password:     "s3cret".into(),
    })
    .await
    .unwrap();
  assert_eq!(erin.display_name, "erin");

  let principal = w.dash.authenticate("erin", "s3cret").await.unwrap();
  assert_eq!(principal.user_id, erin.user_id);

  assert!(matches!(
    w.dash.authenticate("erin", "wrong").await,
    Err(Error::Authorization(_))
  ));
  assert!(matches!(
    w.dash.authenticate("nobody", "s3cret").await,
    Err(Error::Authorization(_))
  ));
}

#[tokio::test]
async fn provision_rejects_taken_username() {
  let w = world().await;
  let err = w
    .dash
    .provision_user(NewAccount {
      username:     "alice".into(),
      display_name: "Alice".into(),
      mail:         None,
      role:         Role::Subject,
      password:     "pw".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn concurrent_provisioning_of_one_username_conflicts_once() {
  let w = world().await;
  let account = || NewAccount {
    username:     "erin".into(),
    display_name: "Erin".into(),
    mail:         None,
    role:         Role::Subject,
    password:     "pw".into(),
  };

  let (a, b) = tokio::join!(w.dash.provision_user(account()), w.dash.provision_user(account()));
  let conflicts = [&a, &b].iter().filter(|r| matches!(r, Err(Error::Conflict(_)))).count();
  assert_eq!(conflicts, 1, "{a:?} / {b:?}");
  assert!(a.is_ok() || b.is_ok());
}

// ─── Consent ledger ──────────────────────────────────────────────────────────

#[tokio::test]
async fn grant_twice_keeps_one_current_consent() {
  let w = world().await;
  let first = w.dash.grant_consent(&p(&w.alice), w.x.app_id, "analytics").await.unwrap();
  let second = w.dash.grant_consent(&p(&w.alice), w.x.app_id, "analytics").await.unwrap();
  assert!(second.recorded_at >= first.recorded_at);

  let current = w.dash.list_consents(&p(&w.alice)).await.unwrap();
  assert_eq!(current.len(), 1);
  assert!(current[0].granted);
  assert_eq!(current[0].purpose, "analytics");

  let history = w.dash.consent_history(&p(&w.alice), Some(w.x.app_id)).await.unwrap();
  assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn consent_requires_declared_purpose_and_association() {
  let w = world().await;
  let err = w.dash.grant_consent(&p(&w.alice), w.x.app_id, "profiling").await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let y = app(&w.store, "Y").await;
  let err = w.dash.grant_consent(&p(&w.alice), y.app_id, "analytics").await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let err = w.dash.grant_consent(&p(&w.bob), w.x.app_id, "analytics").await.unwrap_err();
  assert!(matches!(err, Error::Authorization(_)));
}

#[tokio::test]
async fn revoke_without_active_consent_is_not_found() {
  let w = world().await;
  let err = w.dash.revoke_consent(&p(&w.alice), w.x.app_id, "marketing").await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: Entity::Consent, .. }));

  w.dash.grant_consent(&p(&w.alice), w.x.app_id, "marketing").await.unwrap();
  let change = w.dash.revoke_consent(&p(&w.alice), w.x.app_id, "marketing").await.unwrap();
  assert!(!change.granted);

  let err = w.dash.revoke_consent(&p(&w.alice), w.x.app_id, "marketing").await.unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn revoke_all_only_touches_granted() {
  let w = world().await;
  w.dash.grant_consent(&p(&w.alice), w.x.app_id, "analytics").await.unwrap();
  w.dash.grant_consent(&p(&w.alice), w.x.app_id, "marketing").await.unwrap();
  w.dash.revoke_consent(&p(&w.alice), w.x.app_id, "marketing").await.unwrap();

  let revoked = w.dash.revoke_all_consents(&p(&w.alice), w.x.app_id).await.unwrap();
  assert_eq!(revoked.len(), 1);
  assert_eq!(revoked[0].purpose, "analytics");

  let again = w.dash.revoke_all_consents(&p(&w.alice), w.x.app_id).await.unwrap();
  assert!(again.is_empty());
}

#[tokio::test]
async fn withdrawing_consent_tells_the_staff() {
  let w = world().await;
  let (alice_id, bob_id, carol_id, dave_id) =
    (w.alice.user_id, w.bob.user_id, w.carol.user_id, w.dave.user_id);

  w.dash.grant_consent(&p(&w.alice), w.x.app_id, "analytics").await.unwrap();
  w.dash.grant_consent(&p(&w.alice), w.x.app_id, "marketing").await.unwrap();
  let change = w.dash.revoke_consent(&p(&w.alice), w.x.app_id, "analytics").await.unwrap();
  w.dash.revoke_all_consents(&p(&w.alice), w.x.app_id).await.unwrap();
  // Nothing left to revoke, nothing to announce.
  w.dash.revoke_all_consents(&p(&w.alice), w.x.app_id).await.unwrap();

  let store = w.settle().await;

  let bob_inbox = store.list_notifications(bob_id, false).await.unwrap();
  assert_eq!(bob_inbox.len(), 2);
  assert!(bob_inbox.iter().all(|n| n.kind == NotificationKind::ConsentWithdrawn));
  assert!(bob_inbox.iter().all(|n| n.sender_id == Some(alice_id)));

  let analytics = bob_inbox
    .iter()
    .find(|n| n.description == "alice withdrew consent for analytics in X")
    .unwrap();
  assert_eq!(analytics.object_id, Some(change.change_id));
  assert!(
    bob_inbox.iter().any(|n| n.description == "alice withdrew consent for marketing in X")
  );

  assert!(store.list_notifications(dave_id, false).await.unwrap().is_empty());
  assert!(store.list_notifications(carol_id, false).await.unwrap().is_empty());
}

// ─── Request workflow ────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_to_unassociated_application_is_validation_error() {
  let w = world().await;
  let y = app(&w.store, "Y").await;

  for target in [y.app_id, Uuid::new_v4()] {
    let input = SubmitRequest { app_id: target, kind: RequestKind::Access, other: None, details: None };
    let err = w.dash.submit_request(&p(&w.alice), input).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");
  }
}

#[tokio::test]
async fn withdraw_consent_names_a_declared_purpose() {
  let w = world().await;
  let mut input = submission(&w.x, RequestKind::WithdrawConsent);
  let err = w.dash.submit_request(&p(&w.alice), input.clone()).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  input.other = Some("profiling".into());
  let err = w.dash.submit_request(&p(&w.alice), input.clone()).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  input.other = Some(" analytics ".into());
  let request = w.dash.submit_request(&p(&w.alice), input).await.unwrap();
  assert_eq!(request.other.as_deref(), Some("analytics"));
}

#[tokio::test]
async fn access_request_is_handled_and_subject_notified() {
  let w = world().await;
  let alice_id = w.alice.user_id;
  let bob_id = w.bob.user_id;

  let request = w
    .dash
    .submit_request(&p(&w.alice), submission(&w.x, RequestKind::Access))
    .await
    .unwrap();
  assert_eq!(request.status, RequestStatus::Pending);

  let handled = w
    .dash
    .respond_to_request(&p(&w.bob), request.request_id, "here is your data")
    .await
    .unwrap();
  assert_eq!(handled.status, RequestStatus::Handled);
  assert_eq!(handled.response.as_deref(), Some("here is your data"));
  assert_eq!(handled.responded_by, Some(bob_id));

  let store = w.settle().await;

  let alice_inbox = store.list_notifications(alice_id, false).await.unwrap();
  assert_eq!(alice_inbox.len(), 1);
  assert_eq!(alice_inbox[0].kind, NotificationKind::RequestStatusChanged);
  assert_eq!(alice_inbox[0].object_id, Some(request.request_id));
  assert_eq!(alice_inbox[0].description, "your access request was handled");

  let bob_inbox = store.list_notifications(bob_id, false).await.unwrap();
  assert_eq!(bob_inbox.len(), 1);
  assert_eq!(bob_inbox[0].kind, NotificationKind::RequestSubmitted);
  assert_eq!(bob_inbox[0].sender_id, Some(alice_id));
  assert_eq!(bob_inbox[0].description, "alice submitted an access request for X");
}

#[tokio::test]
async fn unassociated_dpo_cannot_respond() {
  let w = world().await;
  let request = w
    .dash
    .submit_request(&p(&w.alice), submission(&w.x, RequestKind::Info))
    .await
    .unwrap();

  let err = w
    .dash
    .respond_to_request(&p(&w.carol), request.request_id, "done")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Authorization(_)));

  let err = w
    .dash
    .respond_to_request(&p(&w.alice), request.request_id, "done")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Authorization(_)));

  let stored = w.dash.get_request(&p(&w.alice), request.request_id).await.unwrap();
  assert_eq!(stored.status, RequestStatus::Pending);
}

#[tokio::test]
async fn second_response_conflicts_and_keeps_the_first() {
  let w = world().await;
  let request = w
    .dash
    .submit_request(&p(&w.alice), submission(&w.x, RequestKind::Complaint))
    .await
    .unwrap();

  w.dash.respond_to_request(&p(&w.bob), request.request_id, "first").await.unwrap();
  let err = w
    .dash
    .respond_to_request(&p(&w.bob), request.request_id, "second")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  let stored = w.dash.get_request(&p(&w.bob), request.request_id).await.unwrap();
  assert_eq!(stored.response.as_deref(), Some("first"));
}

#[tokio::test]
async fn respond_to_unknown_request_is_not_found() {
  let w = world().await;
  let err = w
    .dash
    .respond_to_request(&p(&w.bob), Uuid::new_v4(), "?")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: Entity::Request, .. }));
}

#[tokio::test]
async fn concurrent_responses_have_one_winner() {
  let w = world().await;
  let request = w
    .dash
    .submit_request(&p(&w.alice), submission(&w.x, RequestKind::Erasure))
    .await
    .unwrap();
  let id = request.request_id;
  let bob = p(&w.bob);

  let mut handles = Vec::new();
  for i in 0..4 {
    let dash = w.dash.clone();
    handles.push(tokio::spawn(async move {
      dash.respond_to_request(&bob, id, &format!("response {i}")).await
    }));
  }

  let mut won = 0;
  let mut conflicts = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => won += 1,
      Err(Error::Conflict(_)) => conflicts += 1,
      Err(e) => panic!("unexpected error: {e}"),
    }
  }
  assert_eq!(won, 1);
  assert_eq!(conflicts, 3);
}

#[tokio::test]
async fn delete_everything_erases_subject_data() {
  let w = world().await;
  let alice = p(&w.alice);

  w.dash.grant_consent(&alice, w.x.app_id, "analytics").await.unwrap();
  w.dash.send_message(&alice, message(&w.bob, &w.x, "hello")).await.unwrap();
  w.dash.send_message(&p(&w.bob), message(&w.alice, &w.x, "hi alice")).await.unwrap();
  w.dash.send_message(&p(&w.bob), message(&w.dave, &w.x, "hi dave")).await.unwrap();
  w.dash.submit_request(&alice, submission(&w.x, RequestKind::Access)).await.unwrap();
  let erase = w
    .dash
    .submit_request(&alice, submission(&w.x, RequestKind::DeleteEverything))
    .await
    .unwrap();

  w.dash.respond_to_request(&p(&w.bob), erase.request_id, "erased").await.unwrap();

  assert!(w.dash.list_consents(&alice).await.unwrap().is_empty());
  assert!(w.dash.consent_history(&alice, None).await.unwrap().is_empty());
  assert!(w.dash.conversations(&alice).await.unwrap().is_empty());

  let remaining = w.dash.list_requests(&alice, None).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].request_id, erase.request_id);
  assert!(remaining[0].is_handled());

  let kept = w.dash.get_request(&alice, erase.request_id).await.unwrap();
  assert_eq!(kept.kind, RequestKind::DeleteEverything);

  // Other users' conversations are untouched.
  let dave_chat = w.dash.conversation(&p(&w.dave), w.bob.user_id).await.unwrap();
  assert_eq!(dave_chat.messages.len(), 1);
}

#[tokio::test]
async fn request_listing_is_scoped() {
  let w = world().await;
  let y = app(&w.store, "Y").await;
  w.store.associate(w.dave.user_id, y.app_id).await.unwrap();

  w.dash.submit_request(&p(&w.alice), submission(&w.x, RequestKind::Access)).await.unwrap();
  w.dash.submit_request(&p(&w.dave), submission(&w.x, RequestKind::Info)).await.unwrap();
  w.dash.submit_request(&p(&w.dave), submission(&y, RequestKind::Info)).await.unwrap();

  assert_eq!(w.dash.list_requests(&p(&w.alice), None).await.unwrap().len(), 1);
  assert_eq!(w.dash.list_requests(&p(&w.dave), None).await.unwrap().len(), 2);
  assert_eq!(w.dash.list_requests(&p(&w.bob), None).await.unwrap().len(), 2);
  assert!(w.dash.list_requests(&p(&w.carol), None).await.unwrap().is_empty());
  assert!(
    w.dash
      .list_requests(&p(&w.bob), Some(RequestStatus::Handled))
      .await
      .unwrap()
      .is_empty()
  );

  let alices = w.dash.list_requests(&p(&w.alice), None).await.unwrap();
  let err = w.dash.get_request(&p(&w.dave), alices[0].request_id).await.unwrap_err();
  assert!(matches!(err, Error::Authorization(_)));
}

// ─── Messaging ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn message_rules() {
  let w = world().await;
  let alice = p(&w.alice);

  let err = w.dash.send_message(&alice, message(&w.dave, &w.x, "hey")).await.unwrap_err();
  assert!(matches!(err, Error::Authorization(_)));

  let err = w.dash.send_message(&alice, message(&w.alice, &w.x, "me")).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let err = w.dash.send_message(&alice, message(&w.bob, &w.x, "   ")).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let input = SendMessage { recipient_id: Uuid::new_v4(), app_id: w.x.app_id, body: "?".into() };
  let err = w.dash.send_message(&alice, input).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: Entity::User, .. }));

  let err = w.dash.send_message(&alice, message(&w.carol, &w.x, "hi")).await.unwrap_err();
  assert!(matches!(err, Error::Authorization(_)));
}

#[tokio::test]
async fn conversations_group_by_contact() {
  let w = world().await;
  let bob = p(&w.bob);

  w.dash.send_message(&bob, message(&w.alice, &w.x, "one")).await.unwrap();
  w.dash.send_message(&p(&w.alice), message(&w.bob, &w.x, "two")).await.unwrap();
  w.dash.send_message(&bob, message(&w.dave, &w.x, "three")).await.unwrap();

  let conversations = w.dash.conversations(&bob).await.unwrap();
  assert_eq!(conversations.len(), 2);
  assert_eq!(conversations[0].contact.username, "dave");
  assert_eq!(conversations[1].contact.username, "alice");
  let bodies: Vec<_> = conversations[1].messages.iter().map(|m| m.body.as_str()).collect();
  assert_eq!(bodies, ["one", "two"]);

  let alice_id = w.alice.user_id;
  let store = w.settle().await;
  let inbox = store.list_notifications(alice_id, true).await.unwrap();
  assert_eq!(inbox.len(), 1);
  assert_eq!(inbox[0].kind, NotificationKind::MessageReceived);
}

// ─── Privacy notices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn publish_versions_and_notify_subjects() {
  let w = world().await;
  let bob = p(&w.bob);

  let v1 = w.dash.publish_notice(&bob, w.x.app_id, "first").await.unwrap();
  let v2 = w.dash.publish_notice(&bob, w.x.app_id, "second").await.unwrap();
  assert_eq!((v1.version, v2.version), (1, 2));

  let latest = w.dash.latest_notice(&p(&w.alice), w.x.app_id).await.unwrap();
  assert_eq!(latest.notice_id, v2.notice_id);
  let history = w.dash.notice_history(&p(&w.alice), w.x.app_id).await.unwrap();
  assert_eq!(history.iter().map(|n| n.version).collect::<Vec<_>>(), [2, 1]);
  assert_eq!(w.dash.get_notice(&p(&w.dave), v1.notice_id).await.unwrap().content, "first");
  assert_eq!(w.dash.notices_for_me(&p(&w.alice)).await.unwrap().len(), 1);

  assert!(matches!(
    w.dash.publish_notice(&p(&w.alice), w.x.app_id, "mine").await,
    Err(Error::Authorization(_))
  ));
  assert!(matches!(
    w.dash.publish_notice(&p(&w.carol), w.x.app_id, "theirs").await,
    Err(Error::Authorization(_))
  ));
  assert!(matches!(
    w.dash.publish_notice(&bob, w.x.app_id, "  ").await,
    Err(Error::Validation(_))
  ));
  assert!(matches!(
    w.dash.latest_notice(&p(&w.carol), w.x.app_id).await,
    Err(Error::Authorization(_))
  ));

  let (alice_id, bob_id, dave_id) = (w.alice.user_id, w.bob.user_id, w.dave.user_id);
  let store = w.settle().await;
  for subject in [alice_id, dave_id] {
    let inbox = store.list_notifications(subject, false).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().all(|n| n.kind == NotificationKind::PrivacyNoticeUpdated));
  }
  assert!(store.list_notifications(bob_id, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn latest_notice_missing_is_not_found() {
  let w = world().await;
  let err = w.dash.latest_notice(&p(&w.alice), w.x.app_id).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: Entity::PrivacyNotice, .. }));
  assert!(w.dash.notices_for_me(&p(&w.alice)).await.unwrap().is_empty());
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn subjects_only_see_staff() {
  let w = world().await;

  let alice_contacts = w.dash.contacts(&p(&w.alice)).await.unwrap();
  let names: Vec<_> = alice_contacts.iter().map(|u| u.username.as_str()).collect();
  assert_eq!(names, ["bob"]);

  let bob_contacts = w.dash.contacts(&p(&w.bob)).await.unwrap();
  let names: Vec<_> = bob_contacts.iter().map(|u| u.username.as_str()).collect();
  assert_eq!(names, ["alice", "dave"]);

  let members = w.dash.members(&p(&w.alice), w.x.app_id).await.unwrap();
  assert!(members.subjects.is_empty());
  assert_eq!(members.controllers.len(), 1);

  let members = w.dash.members(&p(&w.bob), w.x.app_id).await.unwrap();
  assert_eq!(members.subjects.len(), 2);

  assert!(matches!(
    w.dash.application(&p(&w.carol), w.x.app_id).await,
    Err(Error::Authorization(_))
  ));
}

#[tokio::test]
async fn common_applications_intersect() {
  let w = world().await;
  let y = app(&w.store, "Y").await;
  w.dash.associate(w.bob.user_id, y.app_id).await.unwrap();
  w.dash.associate(w.carol.user_id, y.app_id).await.unwrap();

  let shared = w.dash.common_applications(&p(&w.bob), w.carol.user_id).await.unwrap();
  assert_eq!(shared.len(), 1);
  assert_eq!(shared[0].app_id, y.app_id);

  let shared = w.dash.common_applications(&p(&w.alice), w.carol.user_id).await.unwrap();
  assert!(shared.is_empty());

  assert!(matches!(
    w.dash.associate(Uuid::new_v4(), y.app_id).await,
    Err(Error::NotFound { entity: Entity::User, .. })
  ));
}

#[tokio::test]
async fn questionnaire_result_is_stored() {
  let w = world().await;
  // Questions 2 and 4 stay hidden, so their answers are not scored.
  let answers = [Some("yes"), Some("no"), None, Some("no"), None, Some("yes"), Some("yes")]
    .into_iter()
    .chain([Some("yes"), Some("not_applicable")])
    .map(|a| a.map(str::to_owned))
    .collect();
  let input = QuestionnaireAnswers {
    answers,
    notes: vec![None, Some("ignored".into()), None, None, None, None, None, Some("runbook".into())],
  };

  let updated = w
    .dash
    .complete_questionnaire(&p(&w.bob), w.x.app_id, input.clone())
    .await
    .unwrap();
  let result = updated.questionnaire.unwrap();
  assert_eq!(result.evaluation.vote, Vote::Green);
  assert_eq!(result.evaluated_by, w.bob.user_id);
  assert_eq!(result.answers.len(), 9);
  assert_eq!(result.notes[1], None);
  assert_eq!(result.notes[7].as_deref(), Some("runbook"));

  assert!(matches!(
    w.dash.complete_questionnaire(&p(&w.alice), w.x.app_id, input).await,
    Err(Error::Authorization(_))
  ));
}

// ─── Inbox ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn inbox_belongs_to_recipient() {
  let w = world().await;
  let notification = w
    .store
    .insert_notification(NewNotification {
      recipient_id: w.alice.user_id,
      sender_id:    None,
      kind:         NotificationKind::MessageReceived,
      object_id:    None,
      description:  "ping".into(),
    })
    .await
    .unwrap();
  let id = notification.notification_id;

  assert!(matches!(
    w.dash.mark_notification(&p(&w.bob), id, true).await,
    Err(Error::Authorization(_))
  ));
  assert!(matches!(
    w.dash.delete_notification(&p(&w.bob), id).await,
    Err(Error::Authorization(_))
  ));

  let read = w.dash.mark_notification(&p(&w.alice), id, true).await.unwrap();
  assert!(read.is_read);
  assert!(w.dash.notifications(&p(&w.alice), true).await.unwrap().is_empty());

  w.dash.delete_notification(&p(&w.alice), id).await.unwrap();
  assert!(matches!(
    w.dash.delete_notification(&p(&w.alice), id).await,
    Err(Error::NotFound { entity: Entity::Notification, .. })
  ));
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Down;

impl std::fmt::Display for Down {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("down") }
}

impl std::error::Error for Down {}

struct FailingSink;

impl NotificationSink for FailingSink {
  type Error = Down;

  async fn deliver(&self, _: NewNotification) -> Result<(), Down> { Err(Down) }
}

#[tokio::test]
async fn failing_sink_never_fails_the_operation() {
  let w = world().await;
  let (dispatcher, worker) = Dispatcher::spawn(FailingSink, config());
  let dash = Dashboard::new(Arc::clone(&w.store), dispatcher);

  let request = dash
    .submit_request(&p(&w.alice), submission(&w.x, RequestKind::Portability))
    .await
    .unwrap();
  dash.respond_to_request(&p(&w.bob), request.request_id, "export attached").await.unwrap();
  dash.send_message(&p(&w.bob), message(&w.alice, &w.x, "sent")).await.unwrap();

  drop(dash);
  worker.join().await;
  assert!(w.store.list_notifications(w.alice.user_id, false).await.unwrap().is_empty());
}
