//! Messaging relay between subjects and application staff.

use std::collections::HashMap;

use privdash_core::{
  Error, Result,
  message::{Conversation, Message, NewMessage},
  notification::NotificationKind,
  role::{Capability, Principal},
  store::DashboardStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Dashboard, dispatch::NotificationPayload};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
  pub recipient_id: Uuid,
  pub app_id:       Uuid,
  pub body:         String,
}

impl<S: DashboardStore> Dashboard<S> {
  /// Store one message and notify its recipient.
  ///
  /// Both parties must be associated with `app_id`, and at least one of
  /// them must be staff.
  pub async fn send_message(&self, principal: &Principal, input: SendMessage) -> Result<Message> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ExchangeMessages)?;

    let body = input.body.trim();
    if body.is_empty() {
      return Err(Error::validation("message body is empty"));
    }
    if input.recipient_id == actor.user_id {
      return Err(Error::validation("cannot send a message to yourself"));
    }

    let recipient = self.user(input.recipient_id).await?;
    if !actor.role.is_staff() && !recipient.role.is_staff() {
      return Err(Error::unauthorized("subjects cannot message other subjects"));
    }

    let app = self.app(input.app_id).await?;
    let sender_in = self.is_associated(actor.user_id, app.app_id).await?;
    let recipient_in = self.is_associated(recipient.user_id, app.app_id).await?;
    if !(sender_in && recipient_in) {
      return Err(Error::unauthorized(format!(
        "{} and {} do not share application {}",
        actor.username, recipient.username, app.name
      )));
    }

    let message = self
      .store
      .insert_message(NewMessage {
        sender_id:    actor.user_id,
        recipient_id: recipient.user_id,
        app_id:       app.app_id,
        body:         body.to_owned(),
      })
      .await
      .map_err(Error::store)?;

    tracing::debug!(message = %message.message_id, app = %app.app_id, "message sent");

    self.dispatcher.notify(recipient.user_id, NotificationKind::MessageReceived, NotificationPayload {
      sender_id:   Some(actor.user_id),
      object_id:   Some(message.message_id),
      description: format!("new message from {} about {}", actor.username, app.name),
    });

    Ok(message)
  }

  /// Every message between the principal and `contact_id`, oldest first.
  pub async fn conversation(&self, principal: &Principal, contact_id: Uuid) -> Result<Conversation> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ExchangeMessages)?;
    let contact = self.user(contact_id).await?;

    let messages = self
      .store
      .messages_between(actor.user_id, contact_id)
      .await
      .map_err(Error::store)?;

    Ok(Conversation { contact: contact.summary(), messages })
  }

  /// The principal's messages grouped by contact, most recently active
  /// contact first.
  pub async fn conversations(&self, principal: &Principal) -> Result<Vec<Conversation>> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ExchangeMessages)?;

    let mut grouped: HashMap<Uuid, Vec<Message>> = HashMap::new();
    for message in self.store.messages_of(actor.user_id).await.map_err(Error::store)? {
      grouped.entry(message.counterpart(actor.user_id)).or_default().push(message);
    }

    let mut conversations = Vec::with_capacity(grouped.len());
    for (contact_id, messages) in grouped {
      if let Some(contact) = self.store.get_user(contact_id).await.map_err(Error::store)? {
        conversations.push(Conversation { contact: contact.summary(), messages });
      }
    }

    conversations.sort_by_key(|c| std::cmp::Reverse(c.messages.last().map(|m| m.sent_at)));
    Ok(conversations)
  }
}
