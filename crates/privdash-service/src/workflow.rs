//! GDPR request workflow.
//!
//! `pending → handled`, once. The transition itself, and for
//! `deleteEverything` the erasure that goes with it, is a single store
//! transaction; this module only decides who may trigger it.

use chrono::Utc;
use privdash_core::{
  Entity, Error, Result,
  notification::NotificationKind,
  request::{
    GdprRequest, NewGdprRequest, RequestKind, RequestQuery, RequestResponse, RequestStatus,
    Transition,
  },
  role::{Capability, Principal},
  store::DashboardStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Dashboard, dispatch::NotificationPayload};

/// A subject's request as submitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
  pub app_id:  Uuid,
  pub kind:    RequestKind,
  /// The purpose to withdraw, for `withdrawConsent`.
  #[serde(default)]
  pub other:   Option<String>,
  #[serde(default)]
  pub details: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

impl<S: DashboardStore> Dashboard<S> {
  /// File a new request in `pending` state and notify the application's
  /// staff.
  pub async fn submit_request(
    &self,
    principal: &Principal,
    input: SubmitRequest,
  ) -> Result<GdprRequest> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::SubmitRequests)?;
    let app = self.subject_app(&actor, input.app_id).await?;

    let other = non_blank(input.other);
    if input.kind == RequestKind::WithdrawConsent {
      match other.as_deref() {
        Some(purpose) if app.declares_purpose(purpose) => {}
        Some(purpose) => {
          return Err(Error::validation(format!(
            "application {} does not declare purpose {purpose:?}",
            app.name
          )));
        }
        None => return Err(Error::validation("withdrawConsent requires a purpose")),
      }
    }

    let request = self
      .store
      .insert_request(NewGdprRequest {
        subject_id: actor.user_id,
        app_id: app.app_id,
        kind: input.kind,
        other,
        details: non_blank(input.details),
      })
      .await
      .map_err(Error::store)?;

    tracing::info!(
      request = %request.request_id,
      subject = %actor.user_id,
      app = %app.app_id,
      kind = %request.kind,
      "gdpr request submitted"
    );

    self
      .notify_staff(app.app_id, NotificationKind::RequestSubmitted, NotificationPayload {
        sender_id:   Some(actor.user_id),
        object_id:   Some(request.request_id),
        description: format!(
          "{} submitted {} request for {}",
          actor.username,
          request.kind.with_article(),
          app.name
        ),
      })
      .await?;

    Ok(request)
  }

  /// Answer a pending request, moving it to `handled`.
  ///
  /// Checks run in order: capability, existence, association, state. A
  /// request that is already handled is an [`Error::Conflict`] and its
  /// stored response is left untouched.
  pub async fn respond_to_request(
    &self,
    principal: &Principal,
    request_id: Uuid,
    text: &str,
  ) -> Result<GdprRequest> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::RespondToRequests)?;

    let request = self
      .store
      .get_request(request_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Request, request_id))?;

    if !self.is_associated(actor.user_id, request.app_id).await? {
      return Err(Error::unauthorized(format!(
        "{} is not associated with the request's application",
        actor.username
      )));
    }

    let response = RequestResponse {
      text:         text.trim().to_owned(),
      responded_by: actor.user_id,
      handled_at:   Utc::now(),
    };

    match self.store.handle_request(request_id, response).await.map_err(Error::store)? {
      Transition::Handled { request, erased } => {
        tracing::info!(
          request = %request_id,
          responder = %actor.user_id,
          kind = %request.kind,
          "gdpr request handled"
        );
        if let Some(report) = erased {
          tracing::info!(
            subject = %request.subject_id,
            consent_changes = report.consent_changes,
            messages = report.messages,
            requests = report.requests,
            notifications = report.notifications,
            "subject data erased"
          );
        }

        self.dispatcher.notify(
          request.subject_id,
          NotificationKind::RequestStatusChanged,
          NotificationPayload {
            sender_id:   Some(actor.user_id),
            object_id:   Some(request.request_id),
            description: format!("your {} request was handled", request.kind.label()),
          },
        );
        Ok(request)
      }
      Transition::AlreadyHandled(_) => {
        Err(Error::Conflict(format!("request {request_id} is already handled")))
      }
      Transition::Missing => Err(Error::not_found(Entity::Request, request_id)),
    }
  }

  /// A single request, visible to its subject and the staff of its
  /// application.
  pub async fn get_request(&self, principal: &Principal, request_id: Uuid) -> Result<GdprRequest> {
    let actor = self.resolve(principal).await?;
    let request = self
      .store
      .get_request(request_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Request, request_id))?;

    let visible = request.subject_id == actor.user_id
      || (actor.can(Capability::RespondToRequests)
        && self.is_associated(actor.user_id, request.app_id).await?);

    if visible {
      Ok(request)
    } else {
      Err(Error::unauthorized("request belongs to another subject"))
    }
  }

  /// Subjects see their own requests; staff see the requests addressed to
  /// their applications. Newest first.
  pub async fn list_requests(
    &self,
    principal: &Principal,
    status: Option<RequestStatus>,
  ) -> Result<Vec<GdprRequest>> {
    let actor = self.resolve(principal).await?;

    let query = if actor.can(Capability::SubmitRequests) {
      RequestQuery { subject_id: Some(actor.user_id), app_ids: Vec::new(), status }
    } else {
      actor.require(Capability::RespondToRequests)?;
      let app_ids: Vec<Uuid> = self
        .store
        .applications_of(actor.user_id)
        .await
        .map_err(Error::store)?
        .into_iter()
        .map(|app| app.app_id)
        .collect();
      // An empty filter would mean every application.
      if app_ids.is_empty() {
        return Ok(Vec::new());
      }
      RequestQuery { subject_id: None, app_ids, status }
    };

    self.store.list_requests(&query).await.map_err(Error::store)
  }

  /// Queue `payload` for every Controller and DPO of `app_id`.
  pub(crate) async fn notify_staff(
    &self,
    app_id: Uuid,
    kind: NotificationKind,
    payload: NotificationPayload,
  ) -> Result<()> {
    let members = self.store.members_of(app_id).await.map_err(Error::store)?;
    for member in members.iter().filter(|u| u.role.is_staff()) {
      self.dispatcher.notify(member.user_id, kind, payload.clone());
    }
    Ok(())
  }
}
