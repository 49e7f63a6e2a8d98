//! Versioned privacy notices.

use privdash_core::{
  Entity, Error, Result,
  notice::PrivacyNotice,
  notification::NotificationKind,
  role::{Capability, Principal},
  store::DashboardStore,
};
use uuid::Uuid;

use crate::{Dashboard, dispatch::NotificationPayload};

impl<S: DashboardStore> Dashboard<S> {
  /// Append the next version of `app_id`'s notice and tell its subjects.
  pub async fn publish_notice(
    &self,
    principal: &Principal,
    app_id: Uuid,
    content: &str,
  ) -> Result<PrivacyNotice> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::PublishPrivacyNotices)?;
    let app = self.associated_app(&actor, app_id).await?;

    let content = content.trim();
    if content.is_empty() {
      return Err(Error::validation("privacy notice is empty"));
    }

    let notice = self
      .store
      .publish_notice(app_id, content.to_owned(), actor.user_id)
      .await
      .map_err(Error::store)?;

    tracing::info!(app = %app_id, version = notice.version, "privacy notice published");

    let members = self.store.members_of(app_id).await.map_err(Error::store)?;
    for subject in members.iter().filter(|u| !u.role.is_staff()) {
      self.dispatcher.notify(
        subject.user_id,
        NotificationKind::PrivacyNoticeUpdated,
        NotificationPayload {
          sender_id:   Some(actor.user_id),
          object_id:   Some(notice.notice_id),
          description: format!("{} published version {} of its privacy notice", app.name, notice.version),
        },
      );
    }

    Ok(notice)
  }

  pub async fn latest_notice(&self, principal: &Principal, app_id: Uuid) -> Result<PrivacyNotice> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ReadPrivacyNotices)?;
    self.associated_app(&actor, app_id).await?;

    self
      .store
      .latest_notice(app_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound {
        entity: Entity::PrivacyNotice,
        id:     format!("latest for {app_id}"),
      })
  }

  /// Every version, newest first.
  pub async fn notice_history(
    &self,
    principal: &Principal,
    app_id: Uuid,
  ) -> Result<Vec<PrivacyNotice>> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ReadPrivacyNotices)?;
    self.associated_app(&actor, app_id).await?;
    self.store.notice_history(app_id).await.map_err(Error::store)
  }

  pub async fn get_notice(&self, principal: &Principal, notice_id: Uuid) -> Result<PrivacyNotice> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ReadPrivacyNotices)?;

    let notice = self
      .store
      .get_notice(notice_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::PrivacyNotice, notice_id))?;

    self.associated_app(&actor, notice.app_id).await?;
    Ok(notice)
  }

  /// The latest notice of each application the principal belongs to.
  /// Applications without a notice are skipped.
  pub async fn notices_for_me(&self, principal: &Principal) -> Result<Vec<PrivacyNotice>> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ReadPrivacyNotices)?;

    let apps = self.store.applications_of(actor.user_id).await.map_err(Error::store)?;
    let mut notices = Vec::with_capacity(apps.len());
    for app in apps {
      if let Some(notice) = self.store.latest_notice(app.app_id).await.map_err(Error::store)? {
        notices.push(notice);
      }
    }
    Ok(notices)
  }
}
