//! Consent ledger operations.

use privdash_core::{
  Entity, Error, Result,
  application::Application,
  consent::{Consent, ConsentChange, ConsentKey},
  notification::NotificationKind,
  role::{Actor, Capability, Principal},
  store::DashboardStore,
};
use uuid::Uuid;

use crate::{Dashboard, dispatch::NotificationPayload};

impl<S: DashboardStore> Dashboard<S> {
  /// Grant consent for `purpose`. Re-granting refreshes the timestamp.
  pub async fn grant_consent(
    &self,
    principal: &Principal,
    app_id: Uuid,
    purpose: &str,
  ) -> Result<ConsentChange> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ManageConsents)?;
    let app = self.subject_app(&actor, app_id).await?;
    require_declared(&app, purpose)?;

    let change = self
      .store
      .grant_consent(ConsentKey::new(actor.user_id, app_id, purpose))
      .await
      .map_err(Error::store)?;

    tracing::info!(subject = %actor.user_id, app = %app_id, purpose, "consent granted");
    Ok(change)
  }

  /// Revoke an active consent and tell the application's staff. Fails with
  /// [`Error::NotFound`] if the consent is not currently granted.
  pub async fn revoke_consent(
    &self,
    principal: &Principal,
    app_id: Uuid,
    purpose: &str,
  ) -> Result<ConsentChange> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ManageConsents)?;
    let app = self.subject_app(&actor, app_id).await?;
    require_declared(&app, purpose)?;

    let change = self
      .store
      .revoke_consent(ConsentKey::new(actor.user_id, app_id, purpose))
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound {
        entity: Entity::Consent,
        id:     format!("{app_id}/{purpose}"),
      })?;

    tracing::info!(subject = %actor.user_id, app = %app_id, purpose, "consent revoked");
    self.announce_withdrawal(&actor, &app, std::slice::from_ref(&change)).await?;
    Ok(change)
  }

  /// Revoke every active consent the principal holds for `app_id`.
  pub async fn revoke_all_consents(
    &self,
    principal: &Principal,
    app_id: Uuid,
  ) -> Result<Vec<ConsentChange>> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ManageConsents)?;
    let app = self.subject_app(&actor, app_id).await?;

    let changes = self
      .store
      .revoke_all_consents(actor.user_id, app_id)
      .await
      .map_err(Error::store)?;

    tracing::info!(subject = %actor.user_id, app = %app_id, revoked = changes.len(), "consents revoked");
    self.announce_withdrawal(&actor, &app, &changes).await?;
    Ok(changes)
  }

  /// The current state of every consent key the principal has touched.
  pub async fn list_consents(&self, principal: &Principal) -> Result<Vec<Consent>> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ManageConsents)?;
    self.store.current_consents(actor.user_id).await.map_err(Error::store)
  }

  /// The principal's full change log, oldest first.
  pub async fn consent_history(
    &self,
    principal: &Principal,
    app_id: Option<Uuid>,
  ) -> Result<Vec<ConsentChange>> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ManageConsents)?;
    self.store.consent_history(actor.user_id, app_id).await.map_err(Error::store)
  }

  /// One staff notification per withdrawal, naming every purpose revoked.
  async fn announce_withdrawal(
    &self,
    actor: &Actor,
    app: &Application,
    changes: &[ConsentChange],
  ) -> Result<()> {
    let Some(first) = changes.first() else {
      return Ok(());
    };
    let purposes: Vec<&str> = changes.iter().map(|c| c.purpose.as_str()).collect();

    self
      .notify_staff(app.app_id, NotificationKind::ConsentWithdrawn, NotificationPayload {
        sender_id:   Some(actor.user_id),
        object_id:   Some(first.change_id),
        description: format!(
          "{} withdrew consent for {} in {}",
          actor.username,
          purposes.join(", "),
          app.name
        ),
      })
      .await
  }

  /// Load `app_id` and fail with [`Error::Validation`] unless the subject
  /// is associated with it.
  pub(crate) async fn subject_app(&self, actor: &Actor, app_id: Uuid) -> Result<Application> {
    if !self.is_associated(actor.user_id, app_id).await? {
      return Err(Error::validation(format!("not associated with application {app_id}")));
    }
    self.app(app_id).await
  }
}

fn require_declared(app: &Application, purpose: &str) -> Result<()> {
  if app.declares_purpose(purpose) {
    Ok(())
  } else {
    Err(Error::validation(format!(
      "application {} does not declare purpose {purpose:?}",
      app.name
    )))
  }
}
