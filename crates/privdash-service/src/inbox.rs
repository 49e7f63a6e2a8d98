//! The per-user notification inbox.

use privdash_core::{
  Entity, Error, Result,
  notification::Notification,
  role::{Actor, Capability, Principal},
  store::DashboardStore,
};
use uuid::Uuid;

use crate::Dashboard;

impl<S: DashboardStore> Dashboard<S> {
  /// Newest first.
  pub async fn notifications(
    &self,
    principal: &Principal,
    unread_only: bool,
  ) -> Result<Vec<Notification>> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ReadNotifications)?;
    self.store.list_notifications(actor.user_id, unread_only).await.map_err(Error::store)
  }

  pub async fn mark_notification(
    &self,
    principal: &Principal,
    notification_id: Uuid,
    read: bool,
  ) -> Result<Notification> {
    let actor = self.resolve(principal).await?;
    self.owned_notification(&actor, notification_id).await?;

    self
      .store
      .set_notification_read(notification_id, read)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Notification, notification_id))
  }

  pub async fn delete_notification(&self, principal: &Principal, notification_id: Uuid) -> Result<()> {
    let actor = self.resolve(principal).await?;
    self.owned_notification(&actor, notification_id).await?;

    if self.store.delete_notification(notification_id).await.map_err(Error::store)? {
      Ok(())
    } else {
      Err(Error::not_found(Entity::Notification, notification_id))
    }
  }

  async fn owned_notification(&self, actor: &Actor, id: Uuid) -> Result<Notification> {
    actor.require(Capability::ReadNotifications)?;
    let notification = self
      .store
      .get_notification(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Notification, id))?;

    if notification.recipient_id != actor.user_id {
      return Err(Error::unauthorized("notification belongs to another user"));
    }
    Ok(notification)
  }
}
