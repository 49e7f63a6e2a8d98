//! Roles, capabilities and the resolved acting identity.
//!
//! Role-specific behaviour is expressed through capability sets, never by
//! matching on the role at call sites. Controller and DPO are kept as
//! distinct roles even though they currently grant the same capabilities.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Role ────────────────────────────────────────────────────────────────────

/// The single, immutable role of a user.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Subject,
  Controller,
  Dpo,
}

impl Role {
  /// Controllers and DPOs; the roles that own or oversee applications.
  pub fn is_staff(self) -> bool {
    matches!(self, Self::Controller | Self::Dpo)
  }

  /// The capabilities granted by this role.
  pub fn capabilities(self) -> &'static [Capability] {
    use Capability::*;
    match self {
      Self::Subject => &[
        ManageConsents,
        SubmitRequests,
        ExchangeMessages,
        ReadPrivacyNotices,
        ReadNotifications,
        ViewContacts,
      ],
      Self::Controller | Self::Dpo => &[
        RespondToRequests,
        ExchangeMessages,
        ReadPrivacyNotices,
        PublishPrivacyNotices,
        CompleteQuestionnaire,
        ReadNotifications,
        ViewContacts,
      ],
    }
  }
}

// ─── Capability ──────────────────────────────────────────────────────────────

/// An action class a role may perform.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
  ManageConsents,
  SubmitRequests,
  RespondToRequests,
  ExchangeMessages,
  ReadPrivacyNotices,
  PublishPrivacyNotices,
  CompleteQuestionnaire,
  ReadNotifications,
  ViewContacts,
}

/// The capability set for `role`.
pub fn capabilities_for(role: Role) -> BTreeSet<Capability> {
  role.capabilities().iter().copied().collect()
}

// ─── Principal / Actor ───────────────────────────────────────────────────────

/// An authenticated identity, before its role has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
  pub user_id: Uuid,
}

impl Principal {
  pub fn new(user_id: Uuid) -> Self { Self { user_id } }
}

/// A principal with its role and capabilities resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
  pub user_id:      Uuid,
  pub username:     String,
  pub role:         Role,
  pub capabilities: BTreeSet<Capability>,
}

impl Actor {
  pub fn new(user_id: Uuid, username: String, role: Role) -> Self {
    Self { user_id, username, role, capabilities: capabilities_for(role) }
  }

  pub fn can(&self, capability: Capability) -> bool {
    self.capabilities.contains(&capability)
  }

  /// Fail with [`Error::Authorization`] unless the actor holds `capability`.
  pub fn require(&self, capability: Capability) -> Result<()> {
    if self.can(capability) {
      Ok(())
    } else {
      Err(Error::unauthorized(format!(
        "role {} lacks capability {capability}",
        self.role
      )))
    }
  }
}
