//! Error taxonomy shared by every privdash crate.
//!
//! The four domain variants are reported synchronously to the caller of the
//! operation that raised them. `Store` wraps backend faults, which carry no
//! domain meaning.

use thiserror::Error;
use uuid::Uuid;

/// The kind of entity a [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Entity {
  User,
  Application,
  Consent,
  Request,
  Message,
  PrivacyNotice,
  Notification,
}

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed input, or input that references an unassociated application.
  #[error("validation failed: {0}")]
  Validation(String),

  /// The acting principal lacks the role, capability or association needed.
  #[error("not authorized: {0}")]
  Authorization(String),

  #[error("{entity} not found: {id}")]
  NotFound { entity: Entity, id: String },

  /// An invalid state transition, e.g. handling a request twice.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn unauthorized(msg: impl Into<String>) -> Self {
    Self::Authorization(msg.into())
  }

  pub fn not_found(entity: Entity, id: Uuid) -> Self {
    Self::NotFound { entity, id: id.to_string() }
  }

  /// Box a backend error. Used as `.map_err(Error::store)`.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
