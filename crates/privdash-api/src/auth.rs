//! HTTP Basic-auth extractor.
//!
//! Credentials are checked against the user table on every request; there is
//! no session.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use privdash_core::{Error, role::Principal, store::DashboardStore};
use privdash_service::Dashboard;

use crate::error::ApiError;

/// The authenticated principal of a request.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Principal);

/// Split a `Basic` authorization header into username and password.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let encoded = value.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded.trim()).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (username, password) = creds.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

impl<S> FromRequestParts<Dashboard<S>> for Authenticated
where
  S: DashboardStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    dashboard: &Dashboard<S>,
  ) -> Result<Self, Self::Rejection> {
    let (username, password) =
      basic_credentials(&parts.headers).ok_or(ApiError::Unauthenticated)?;

    match dashboard.authenticate(&username, &password).await {
      Ok(principal) => Ok(Authenticated(principal)),
      Err(Error::Authorization(_)) => Err(ApiError::Unauthenticated),
      Err(e) => Err(e.into()),
    }
  }
}
