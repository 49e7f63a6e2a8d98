//! Server assembly for the privacy dashboard: configuration, demo data and
//! the top-level router.

use std::path::PathBuf;

use axum::Router;
use privdash_core::{
  application::NewApplication,
  role::Role,
  store::DashboardStore,
};
use privdash_service::{Dashboard, DispatchConfig, Error, NewAccount, Result};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PRIVDASH_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Create the demo users and application when the store has no users.
  pub seed_demo:  bool,
  pub dispatch:   DispatchConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("privdash.db"),
      seed_demo:  false,
      dispatch:   DispatchConfig::default(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API mounted under `/api`, with request tracing.
pub fn router<S>(dashboard: Dashboard<S>) -> Router
where
  S: DashboardStore + 'static,
{
  Router::new()
    .nest("/api", privdash_api::api_router(dashboard))
    .layer(TraceLayer::new_for_http())
}

// ─── Demo data ────────────────────────────────────────────────────────────────

/// Usernames of the demo accounts. Each password equals the username.
pub const DEMO_USERS: [(&str, Role); 3] = [
  ("UserSubject", Role::Subject),
  ("UserController", Role::Controller),
  ("UserDPO", Role::Dpo),
];

/// Populate an empty store with one application and one user per role, all
/// associated with it. Returns `false` without writing if any user exists.
pub async fn seed_demo<S: DashboardStore>(dashboard: &Dashboard<S>) -> Result<bool> {
  let existing = dashboard.store().list_users(None).await.map_err(Error::store)?;
  if !existing.is_empty() {
    tracing::debug!(users = existing.len(), "store not empty, skipping demo data");
    return Ok(false);
  }

  let app = dashboard
    .provision_application(NewApplication {
      name:        "Demo Shop".into(),
      description: Some("Online shop used to try the dashboard".into()),
      purposes:    vec!["analytics".into(), "marketing".into(), "newsletter".into()],
    })
    .await?;

  for (username, role) in DEMO_USERS {
    let user = dashboard
      .provision_user(NewAccount {
        username:     username.into(),
        display_name: username.into(),
        mail:         Some(format!("{}@privdash.test", username.to_lowercase())),
        role,
        password:     username.into(),
      })
      .await?;
    dashboard.associate(user.user_id, app.app_id).await?;
  }

  tracing::info!(app = %app.app_id, "demo data seeded");
  Ok(true)
}
