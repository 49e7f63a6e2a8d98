//! The privacy dashboard's operations.
//!
//! [`Dashboard`] is generic over any [`DashboardStore`] and is the only
//! integration surface the HTTP layer uses. Every principal-facing operation
//! starts by resolving the principal to an [`Actor`](privdash_core::role::Actor)
//! through [`Dashboard::resolve`]; capability and association checks follow
//! from there.
//!
//! Operations are grouped by component, one `impl` block per module:
//!
//! | module | component |
//! |--------|-----------|
//! | [`identity`] | role resolver, authentication |
//! | [`ledger`] | consent ledger |
//! | [`workflow`] | GDPR request state machine |
//! | [`relay`] | messaging |
//! | [`notices`] | privacy notice registry |
//! | [`directory`] | provisioning, applications, contacts, questionnaire |
//! | [`inbox`] | stored notifications |
//! | [`dispatch`] | asynchronous notification delivery |

pub mod directory;
pub mod dispatch;
pub mod identity;
pub mod inbox;
pub mod ledger;
pub mod notices;
pub mod relay;
pub mod workflow;

use std::sync::Arc;

use privdash_core::store::DashboardStore;

pub use directory::{NewAccount, QuestionnaireAnswers};
pub use dispatch::{
  DispatchConfig, DispatchWorker, Dispatcher, NotificationPayload, NotificationSink, StoreSink,
};
pub use identity::hash_password;
pub use relay::SendMessage;
pub use workflow::SubmitRequest;
pub use privdash_core::{Error, Result};

/// Shared handle to the dashboard. Cloning is cheap.
pub struct Dashboard<S> {
  store:      Arc<S>,
  dispatcher: Dispatcher,
}

impl<S> Clone for Dashboard<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), dispatcher: self.dispatcher.clone() }
  }
}

impl<S: DashboardStore> Dashboard<S> {
  pub fn new(store: Arc<S>, dispatcher: Dispatcher) -> Self {
    Self { store, dispatcher }
  }

  /// Build a dashboard whose notifications are delivered into `store`'s
  /// inbox by a background worker.
  pub fn with_store_sink(store: Arc<S>, config: DispatchConfig) -> (Self, DispatchWorker)
  where
    S: 'static,
  {
    let (dispatcher, worker) =
      Dispatcher::spawn(StoreSink::new(Arc::clone(&store)), config);
    (Self::new(store, dispatcher), worker)
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn dispatcher(&self) -> &Dispatcher { &self.dispatcher }
}

#[cfg(test)]
mod tests;
