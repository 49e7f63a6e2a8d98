//! Users, applications and who can see whom.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use privdash_core::{
  Entity, Error, Result,
  application::{AppMembers, Application, Association, NewApplication},
  questionnaire::{Questionnaire, QuestionnaireResult},
  role::{Capability, Principal, Role},
  store::DashboardStore,
  user::{NewUser, User, UserSummary},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Dashboard, identity::hash_password};

/// A user to create, with a plain-text password.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username:     String,
  pub display_name: String,
  pub mail:         Option<String>,
  pub role:         Role,
  pub password:     String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireAnswers {
  pub answers: Vec<Option<String>>,
  #[serde(default)]
  pub notes:   Vec<Option<String>>,
}

impl<S: DashboardStore> Dashboard<S> {
  // ─── Provisioning ───────────────────────────────────────────────────────────

  pub async fn provision_user(&self, account: NewAccount) -> Result<User> {
    let username = account.username.trim();
    if username.is_empty() || username.contains(':') {
      return Err(Error::validation("username must be non-empty and contain no ':'"));
    }
    if account.password.is_empty() {
      return Err(Error::validation("password is empty"));
    }
    let taken = || Error::Conflict(format!("username {username} is taken"));
    if self.store.find_user(username).await.map_err(Error::store)?.is_some() {
      return Err(taken());
    }

    let display_name = match account.display_name.trim() {
      "" => username.to_owned(),
      name => name.to_owned(),
    };

    let user = self
      .store
      .add_user(NewUser {
        username: username.to_owned(),
        display_name,
        mail: account.mail,
        role: account.role,
        password_hash: hash_password(&account.password)?,
      })
      .await
      .map_err(Error::store)?
      .ok_or_else(taken)?;

    tracing::info!(user = %user.user_id, username = %user.username, role = %user.role, "user provisioned");
    Ok(user)
  }

  pub async fn provision_application(&self, input: NewApplication) -> Result<Application> {
    let name = input.name.trim();
    if name.is_empty() {
      return Err(Error::validation("application name is empty"));
    }

    let mut purposes: Vec<String> = Vec::with_capacity(input.purposes.len());
    for purpose in input.purposes.iter().map(|p| p.trim()) {
      if purpose.is_empty() {
        return Err(Error::validation("purpose is empty"));
      }
      if !purposes.iter().any(|p| p == purpose) {
        purposes.push(purpose.to_owned());
      }
    }

    let app = self
      .store
      .add_application(NewApplication { name: name.to_owned(), description: input.description, purposes })
      .await
      .map_err(Error::store)?;

    tracing::info!(app = %app.app_id, name = %app.name, "application provisioned");
    Ok(app)
  }

  /// Link a user to an application. Idempotent.
  pub async fn associate(&self, user_id: Uuid, app_id: Uuid) -> Result<Association> {
    self.user(user_id).await?;
    self.app(app_id).await?;
    self.store.associate(user_id, app_id).await.map_err(Error::store)
  }

  // ─── Principal-facing ───────────────────────────────────────────────────────

  /// The applications the principal is associated with.
  pub async fn applications(&self, principal: &Principal) -> Result<Vec<Application>> {
    let actor = self.resolve(principal).await?;
    self.store.applications_of(actor.user_id).await.map_err(Error::store)
  }

  pub async fn application(&self, principal: &Principal, app_id: Uuid) -> Result<Application> {
    let actor = self.resolve(principal).await?;
    self.associated_app(&actor, app_id).await
  }

  /// Members of `app_id` grouped by role. Subjects only see staff.
  pub async fn members(&self, principal: &Principal, app_id: Uuid) -> Result<AppMembers> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ViewContacts)?;
    self.associated_app(&actor, app_id).await?;

    let mut members = AppMembers::default();
    for user in self.store.members_of(app_id).await.map_err(Error::store)? {
      match user.role {
        Role::Subject if actor.role.is_staff() => members.subjects.push(user.summary()),
        Role::Subject => {}
        Role::Controller => members.controllers.push(user.summary()),
        Role::Dpo => members.dpos.push(user.summary()),
      }
    }
    Ok(members)
  }

  /// Everyone who shares an application with the principal, by username.
  /// Subjects only see staff.
  pub async fn contacts(&self, principal: &Principal) -> Result<Vec<UserSummary>> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ViewContacts)?;

    let mut contacts = BTreeMap::new();
    for app in self.store.applications_of(actor.user_id).await.map_err(Error::store)? {
      for user in self.store.members_of(app.app_id).await.map_err(Error::store)? {
        if user.user_id == actor.user_id || !(actor.role.is_staff() || user.role.is_staff()) {
          continue;
        }
        contacts.entry(user.username.clone()).or_insert_with(|| user.summary());
      }
    }
    Ok(contacts.into_values().collect())
  }

  /// Applications both the principal and `other_id` are associated with.
  pub async fn common_applications(
    &self,
    principal: &Principal,
    other_id: Uuid,
  ) -> Result<Vec<Application>> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::ViewContacts)?;
    self.user(other_id).await?;

    let theirs: HashSet<Uuid> = self
      .store
      .applications_of(other_id)
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|app| app.app_id)
      .collect();

    let mine = self.store.applications_of(actor.user_id).await.map_err(Error::store)?;
    Ok(mine.into_iter().filter(|app| theirs.contains(&app.app_id)).collect())
  }

  /// Score the baseline GDPR questionnaire and store the result on the
  /// application, replacing any earlier one.
  pub async fn complete_questionnaire(
    &self,
    principal: &Principal,
    app_id: Uuid,
    input: QuestionnaireAnswers,
  ) -> Result<Application> {
    let actor = self.resolve(principal).await?;
    actor.require(Capability::CompleteQuestionnaire)?;
    self.associated_app(&actor, app_id).await?;

    let questionnaire = Questionnaire::baseline();
    let evaluation = questionnaire.evaluate(&input.answers)?;
    let mut answers = input.answers;
    answers.resize(questionnaire.len(), None);

    let result = QuestionnaireResult {
      evaluation,
      answers,
      notes: questionnaire.normalize_notes(input.notes),
      evaluated_by: actor.user_id,
      evaluated_at: Utc::now(),
    };

    let app = self
      .store
      .save_questionnaire(app_id, result)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(Entity::Application, app_id))?;

    tracing::info!(app = %app_id, vote = ?evaluation.vote, "questionnaire completed");
    Ok(app)
  }
}
