//! Fire-and-forget notification delivery.
//!
//! Operations hand events to a [`Dispatcher`], which enqueues them on a
//! bounded channel and returns immediately. A [`DispatchWorker`] task drains
//! the queue into a [`NotificationSink`]. A full queue or a sink that keeps
//! failing loses the event; both are logged and never reported back to the
//! operation that raised it.

use std::{future::Future, sync::Arc, time::Duration};

use privdash_core::{
  notification::{NewNotification, NotificationKind},
  store::DashboardStore,
};
use serde::Deserialize;
use tokio::{
  sync::mpsc::{self, error::TrySendError},
  task::JoinHandle,
};
use uuid::Uuid;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
  /// Events buffered before new ones are dropped.
  pub queue_capacity:   usize,
  /// Delivery attempts per event, including the first.
  pub max_attempts:     u32,
  /// Pause between attempts.
  pub retry_backoff_ms: u64,
}

impl Default for DispatchConfig {
  fn default() -> Self {
    Self { queue_capacity: 256, max_attempts: 3, retry_backoff_ms: 200 }
  }
}

// ─── Sink ─────────────────────────────────────────────────────────────────────

/// The transport a notification is finally handed to.
pub trait NotificationSink: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  fn deliver(
    &self,
    notification: NewNotification,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Delivers notifications into the store's per-user inbox.
pub struct StoreSink<S> {
  store: Arc<S>,
}

impl<S> StoreSink<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }
}

impl<S> NotificationSink for StoreSink<S>
where
  S: DashboardStore + 'static,
{
  type Error = S::Error;

  async fn deliver(&self, notification: NewNotification) -> Result<(), S::Error> {
    self.store.insert_notification(notification).await.map(|_| ())
  }
}

// ─── Dispatcher ───────────────────────────────────────────────────────────────

/// What a notification says, apart from who receives it and why.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
  pub sender_id:   Option<Uuid>,
  pub object_id:   Option<Uuid>,
  pub description: String,
}

/// Enqueuing handle. Cloning is cheap; the worker stops once every clone is
/// dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct Dispatcher {
  tx: mpsc::Sender<NewNotification>,
}

impl Dispatcher {
  /// Start a worker delivering into `sink`.
  pub fn spawn<K: NotificationSink>(sink: K, config: DispatchConfig) -> (Self, DispatchWorker) {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let handle = tokio::spawn(run(sink, rx, config));
    (Self { tx }, DispatchWorker { handle })
  }

  /// Enqueue a notification for `recipient_id`. Never blocks and never fails.
  pub fn notify(&self, recipient_id: Uuid, kind: NotificationKind, payload: NotificationPayload) {
    let event = NewNotification {
      recipient_id,
      sender_id: payload.sender_id,
      kind,
      object_id: payload.object_id,
      description: payload.description,
    };

    match self.tx.try_send(event) {
      Ok(()) => {}
      Err(TrySendError::Full(event)) => tracing::warn!(
        recipient = %event.recipient_id,
        kind = %event.kind,
        "notification queue full, dropping event"
      ),
      Err(TrySendError::Closed(event)) => tracing::warn!(
        recipient = %event.recipient_id,
        kind = %event.kind,
        "notification worker stopped, dropping event"
      ),
    }
  }
}

/// Handle to the background delivery task.
pub struct DispatchWorker {
  handle: JoinHandle<()>,
}

impl DispatchWorker {
  /// Wait for the worker to drain its queue. Returns once every
  /// [`Dispatcher`] clone has been dropped.
  pub async fn join(self) {
    if let Err(e) = self.handle.await {
      tracing::error!(error = %e, "notification worker panicked");
    }
  }
}

async fn run<K: NotificationSink>(
  sink: K,
  mut rx: mpsc::Receiver<NewNotification>,
  config: DispatchConfig,
) {
  while let Some(event) = rx.recv().await {
    deliver_with_retry(&sink, event, &config).await;
  }
  tracing::debug!("notification worker stopped");
}

async fn deliver_with_retry<K: NotificationSink>(
  sink: &K,
  event: NewNotification,
  config: &DispatchConfig,
) {
  let attempts = config.max_attempts.max(1);
  let backoff = Duration::from_millis(config.retry_backoff_ms);

  for attempt in 1..=attempts {
    match sink.deliver(event.clone()).await {
      Ok(()) => {
        tracing::debug!(recipient = %event.recipient_id, kind = %event.kind, "notification delivered");
        return;
      }
      Err(e) => {
        tracing::warn!(
          recipient = %event.recipient_id,
          kind = %event.kind,
          attempt,
          error = %e,
          "notification delivery failed"
        );
        if attempt < attempts {
          tokio::time::sleep(backoff).await;
        }
      }
    }
  }

  tracing::warn!(
    recipient = %event.recipient_id,
    kind = %event.kind,
    "giving up on notification after {attempts} attempts"
  );
}
