//! JSON REST API for the privacy dashboard.
//!
//! Exposes an axum [`Router`] backed by a [`Dashboard`] over any
//! [`DashboardStore`]. Every route authenticates with HTTP Basic against the
//! user table. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", privdash_api::api_router(dashboard.clone()))
//! ```

pub mod apps;
pub mod auth;
pub mod consents;
pub mod error;
pub mod me;
pub mod messages;
pub mod notices;
pub mod notifications;
pub mod requests;

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use privdash_core::store::DashboardStore;
use privdash_service::Dashboard;

pub use auth::Authenticated;
pub use error::ApiError;

/// Build a fully-materialised API router for `dashboard`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(dashboard: Dashboard<S>) -> Router<()>
where
  S: DashboardStore + 'static,
{
  Router::new()
    .route("/me", get(me::get::<S>))
    // Applications & contacts
    .route("/apps", get(apps::list::<S>))
    .route("/apps/{id}", get(apps::get_one::<S>))
    .route("/apps/{id}/members", get(apps::members::<S>))
    .route("/apps/{id}/questionnaire", put(apps::complete_questionnaire::<S>))
    .route("/apps/{id}/consents/revoke-all", post(consents::revoke_all::<S>))
    .route("/apps/{id}/notices", get(notices::history::<S>).post(notices::publish::<S>))
    .route("/apps/{id}/notices/latest", get(notices::latest::<S>))
    .route("/questionnaire", get(apps::questionnaire))
    .route("/contacts", get(apps::contacts::<S>))
    .route("/contacts/{id}/apps", get(apps::common::<S>))
    // Consents
    .route("/consents", get(consents::list::<S>).post(consents::grant::<S>))
    .route("/consents/history", get(consents::history::<S>))
    .route("/consents/revoke", post(consents::revoke::<S>))
    // Requests
    .route("/requests", get(requests::list::<S>).post(requests::submit::<S>))
    .route("/requests/{id}", get(requests::get_one::<S>))
    .route("/requests/{id}/respond", post(requests::respond::<S>))
    // Messages
    .route("/messages", post(messages::send::<S>))
    .route("/conversations", get(messages::conversations::<S>))
    .route("/conversations/{id}", get(messages::conversation::<S>))
    // Notices
    .route("/notices", get(notices::mine::<S>))
    .route("/notices/{id}", get(notices::get_one::<S>))
    // Notifications
    .route("/notifications", get(notifications::list::<S>))
    .route(
      "/notifications/{id}",
      patch(notifications::mark::<S>).delete(notifications::delete::<S>),
    )
    .with_state(dashboard)
}
