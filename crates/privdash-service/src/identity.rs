//! Authentication and role resolution: the single authorization choke point.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use privdash_core::{
  Entity, Error, Result,
  application::Application,
  role::{Actor, Principal, Role},
  store::DashboardStore,
  user::User,
};
use rand_core::OsRng;
use uuid::Uuid;

use crate::Dashboard;

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::validation(format!("cannot hash password: {e}")))
}

fn invalid_credentials() -> Error { Error::unauthorized("invalid credentials") }

impl<S: DashboardStore> Dashboard<S> {
  /// Verify a username/password pair against the stored argon2 hash.
  ///
  /// Every failure, including an unknown username, is the same
  /// [`Error::Authorization`].
  pub async fn authenticate(&self, username: &str, password: &str) -> Result<Principal> {
    let user = self
      .store
      .find_user(username)
      .await
      .map_err(Error::store)?
      .ok_or_else(invalid_credentials)?;

    let parsed = PasswordHash::new(&user.password_hash).map_err(|_| invalid_credentials())?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .map_err(|_| {
        tracing::debug!(username, "password mismatch");
        invalid_credentials()
      })?;

    Ok(Principal::new(user.user_id))
  }

  /// Resolve a principal to its role and capability set.
  pub async fn resolve(&self, principal: &Principal) -> Result<Actor> {
    let user = self
      .store
      .get_user(principal.user_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::unauthorized("principal has no assigned role"))?;
    Ok(Actor::new(user.user_id, user.username, user.role))
  }

  pub async fn resolve_role(&self, principal: &Principal) -> Result<Role> {
    self.resolve(principal).await.map(|actor| actor.role)
  }

  /// The user record behind `principal`, for display.
  pub async fn me(&self, principal: &Principal) -> Result<User> {
    self
      .store
      .get_user(principal.user_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::unauthorized("principal has no assigned role"))
  }

  // ─── Shared lookups ─────────────────────────────────────────────────────────

  pub(crate) async fn user(&self, id: Uuid) -> Result<User> {
    self
      .store
      .get_user(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::User, id))
  }

  pub(crate) async fn app(&self, id: Uuid) -> Result<Application> {
    self
      .store
      .get_application(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Application, id))
  }

  pub(crate) async fn is_associated(&self, user_id: Uuid, app_id: Uuid) -> Result<bool> {
    self.store.is_associated(user_id, app_id).await.map_err(Error::store)
  }

  /// Load `app_id` and fail with [`Error::Authorization`] unless `actor`
  /// is associated with it.
  pub(crate) async fn associated_app(&self, actor: &Actor, app_id: Uuid) -> Result<Application> {
    let app = self.app(app_id).await?;
    if !self.is_associated(actor.user_id, app_id).await? {
      return Err(Error::unauthorized(format!(
        "{} is not associated with application {}",
        actor.username, app.name
      )));
    }
    Ok(app)
  }
}
