//! Role and department synchronization.
//!
//! Each call runs to completion inside the request that triggered it:
//! authenticate the caller, look the target up, fetch from Discord, compare
//! with the stored value, and write only when something changed. Failures
//! never escape as errors; they come back as a [`SyncResult`] with
//! `success = false` and a message the dashboard can show as-is.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::database::{ChangeSource, Database, Session, UserRecord};
use crate::error::{ErrorContext, Result, RoleSyncError};
use crate::permissions::{can_manage_user, has_admin_permission};
use crate::resolver::RoleResolver;
use crate::roles::{Department, Role};

pub const MSG_SYNC_ROLE_FAILED: &str = "Failed to sync role";
pub const MSG_ROLE_UP_TO_DATE: &str = "Role is already up to date";
pub const MSG_DEPARTMENT_UP_TO_DATE: &str = "Department is already up to date";
pub const MSG_NO_DEPARTMENTS: &str = "No department roles found";

/// Outcome of a sync or admin change, returned to the caller for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub message: String,
    pub changed: bool,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
    /// Departments to choose from when the sync needs a selection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Department>,
}

impl SyncResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            changed: false,
            previous_value: None,
            new_value: None,
            candidates: Vec::new(),
        }
    }

    pub fn unchanged(message: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        Self {
            success: true,
            message: message.into(),
            changed: false,
            previous_value: Some(value.clone()),
            new_value: Some(value),
            candidates: Vec::new(),
        }
    }

    pub fn changed(message: impl Into<String>, previous: impl ToString, new: impl ToString) -> Self {
        Self {
            success: true,
            message: message.into(),
            changed: true,
            previous_value: Some(previous.to_string()),
            new_value: Some(new.to_string()),
            candidates: Vec::new(),
        }
    }

    fn from_error(error: &RoleSyncError) -> Self {
        let mut result = Self::failure(error.user_message());
        if let RoleSyncError::AmbiguousDepartment(candidates) = error {
            result.candidates = candidates.clone();
        }
        result
    }

    /// Whether the caller must re-invoke with an explicit department.
    pub fn needs_selection(&self) -> bool {
        !self.success && !self.candidates.is_empty()
    }
}

/// Target of a sync, after the caller has been authorized.
struct SyncTarget {
    caller_id: i64,
    user: UserRecord,
    discord_id: String,
}

pub struct SyncOrchestrator {
    db: Arc<Database>,
    resolver: Arc<RoleResolver>,
}

impl SyncOrchestrator {
    pub fn new(db: Arc<Database>, resolver: Arc<RoleResolver>) -> Self {
        Self { db, resolver }
    }

    /// Re-derive a user's role from the main guild and store it if it changed.
    pub async fn sync_role(&self, caller: Option<&Session>, user_id: i64) -> SyncResult {
        match self.try_sync_role(caller, user_id).await {
            Ok(result) => result,
            Err(e) => {
                e.log_with_context(&ErrorContext::new("sync_role").with_user_id(user_id));
                match e {
                    RoleSyncError::NoRolesFound => SyncResult::failure(MSG_SYNC_ROLE_FAILED),
                    other => SyncResult::from_error(&other),
                }
            }
        }
    }

    /// Re-derive a user's department and store it if it changed.
    ///
    /// Requires the whitelist marker in the community guild. When several
    /// departments apply, `selection` must name one of them; without it the
    /// result lists the candidates and nothing is written.
    pub async fn sync_department(
        &self,
        caller: Option<&Session>,
        user_id: i64,
        selection: Option<Department>,
    ) -> SyncResult {
        match self.try_sync_department(caller, user_id, selection).await {
            Ok(result) => result,
            Err(e) => {
                e.log_with_context(&ErrorContext::new("sync_department").with_user_id(user_id));
                match e {
                    RoleSyncError::NoRolesFound => SyncResult::failure(MSG_NO_DEPARTMENTS),
                    other => SyncResult::from_error(&other),
                }
            }
        }
    }

    /// Explicitly set a user's role (admin action).
    pub async fn set_role(&self, caller: Option<&Session>, user_id: i64, role: Role) -> SyncResult {
        match self.try_set_role(caller, user_id, role).await {
            Ok(result) => result,
            Err(e) => {
                e.log_with_context(&ErrorContext::new("set_role").with_user_id(user_id));
                SyncResult::from_error(&e)
            }
        }
    }

    async fn try_sync_role(&self, caller: Option<&Session>, user_id: i64) -> Result<SyncResult> {
        let target = self.authorize_sync(caller, user_id).await?;

        let resolved = self
            .resolver
            .resolve_user_role(&target.discord_id)
            .await
            .ok_or(RoleSyncError::NoRolesFound)?;

        let current = target.user.role;
        if resolved == current {
            return Ok(SyncResult::unchanged(MSG_ROLE_UP_TO_DATE, current));
        }

        self.db
            .update_role(
                target.user.id,
                current,
                resolved,
                Some(target.caller_id),
                ChangeSource::Sync,
            )
            .await?;

        tracing::info!(
            user_id = target.user.id,
            previous = %current,
            new = %resolved,
            "Role synchronized"
        );
        Ok(SyncResult::changed(
            format!("Role updated to {}", resolved.display_name()),
            current,
            resolved,
        ))
    }

    async fn try_sync_department(
        &self,
        caller: Option<&Session>,
        user_id: i64,
        selection: Option<Department>,
    ) -> Result<SyncResult> {
        let target = self.authorize_sync(caller, user_id).await?;

        if !self.resolver.is_whitelisted(&target.discord_id).await? {
            return Err(RoleSyncError::NotWhitelisted);
        }

        let departments = self.resolver.resolve_departments(&target.discord_id).await;
        let resolved = choose_department(&departments, selection)?;

        let current = target.user.department;
        if resolved == current {
            return Ok(SyncResult::unchanged(MSG_DEPARTMENT_UP_TO_DATE, current));
        }

        self.db
            .update_department(
                target.user.id,
                current,
                resolved,
                Some(target.caller_id),
                ChangeSource::Sync,
            )
            .await?;

        tracing::info!(
            user_id = target.user.id,
            previous = %current,
            new = %resolved,
            "Department synchronized"
        );
        Ok(SyncResult::changed(
            format!("Department updated to {}", resolved),
            current,
            resolved,
        ))
    }

    async fn try_set_role(
        &self,
        caller: Option<&Session>,
        user_id: i64,
        role: Role,
    ) -> Result<SyncResult> {
        let actor = self.caller_record(caller).await?;
        if actor.id == user_id {
            return Err(RoleSyncError::Forbidden(
                "admins cannot change their own role".to_string(),
            ));
        }

        let target = self
            .db
            .get_user(user_id)
            .await?
            .ok_or(RoleSyncError::UserNotFound(user_id))?;

        if !can_manage_user(actor.role, target.role) || !can_manage_user(actor.role, role) {
            return Err(RoleSyncError::Forbidden(format!(
                "{} cannot assign {} to a user holding {}",
                actor.role, role, target.role
            )));
        }

        if target.role == role {
            return Ok(SyncResult::unchanged(MSG_ROLE_UP_TO_DATE, role));
        }

        self.db
            .update_role(
                target.id,
                target.role,
                role,
                Some(actor.id),
                ChangeSource::Admin,
            )
            .await?;

        tracing::info!(
            user_id = target.id,
            actor_id = actor.id,
            previous = %target.role,
            new = %role,
            "Role set by admin"
        );
        Ok(SyncResult::changed(
            format!("Role updated to {}", role.display_name()),
            target.role,
            role,
        ))
    }

    async fn caller_record(&self, caller: Option<&Session>) -> Result<UserRecord> {
        let session = caller.ok_or(RoleSyncError::NotAuthenticated)?;
        self.db
            .get_user(session.user_id)
            .await?
            .ok_or(RoleSyncError::NotAuthenticated)
    }

    /// Users may sync themselves; syncing someone else needs admin rights.
    async fn authorize_sync(&self, caller: Option<&Session>, user_id: i64) -> Result<SyncTarget> {
        let actor = self.caller_record(caller).await?;

        let user = if actor.id == user_id {
            actor.clone()
        } else {
            if !has_admin_permission(actor.role) {
                return Err(RoleSyncError::Forbidden(
                    "only admins may sync other users".to_string(),
                ));
            }
            self.db
                .get_user(user_id)
                .await?
                .ok_or(RoleSyncError::UserNotFound(user_id))?
        };

        let discord_id = user
            .discord_id
            .clone()
            .ok_or(RoleSyncError::NoExternalIdentity)?;

        Ok(SyncTarget {
            caller_id: actor.id,
            user,
            discord_id,
        })
    }
}

/// Pick the department to store from the resolved candidates.
fn choose_department(
    departments: &[Department],
    selection: Option<Department>,
) -> Result<Department> {
    match (departments, selection) {
        ([], _) => Err(RoleSyncError::NoRolesFound),
        (_, Some(selected)) if departments.contains(&selected) => Ok(selected),
        (_, Some(selected)) => Err(RoleSyncError::InvalidSelection(selected)),
        ([only], None) => Ok(*only),
        (_, None) => Err(RoleSyncError::AmbiguousDepartment(departments.to_vec())),
    }
}
