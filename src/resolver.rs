//! Resolution of Discord membership into internal roles and departments.
//!
//! Three guilds are consulted:
//! - the main guild, whose roles map to a [`Role`];
//! - the department guild, whose roles map to [`Department`]s;
//! - the community guild, which only needs to carry the whitelist marker role.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fetcher::RoleFetcher;
use crate::mapping::MappingTables;
use crate::roles::{Department, ExternalRoleId, Role};

/// Guild and marker-role ids the resolver works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildIds {
    pub main_guild: String,
    pub department_guild: String,
    pub whitelist_guild: String,
    pub whitelist_role: ExternalRoleId,
}

/// Live view of a member, for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProfile {
    pub role: Option<Role>,
    pub departments: Vec<Department>,
}

pub struct RoleResolver {
    fetcher: Arc<RoleFetcher>,
    tables: MappingTables,
    guilds: GuildIds,
}

impl RoleResolver {
    pub fn new(fetcher: Arc<RoleFetcher>, tables: MappingTables, guilds: GuildIds) -> Self {
        Self {
            fetcher,
            tables,
            guilds,
        }
    }

    /// Resolve the internal role for a Discord user.
    ///
    /// Returns `None` when no roles could be fetched, so callers can tell
    /// "could not determine" apart from a resolved `Applicant`.
    pub async fn resolve_user_role(&self, discord_id: &str) -> Option<Role> {
        let roles = self
            .fetcher
            .fetch_roles(&self.guilds.main_guild, discord_id)
            .await;
        if roles.is_empty() {
            return None;
        }

        let held: HashSet<ExternalRoleId> = roles.into_iter().collect();
        let role = self.tables.roles.resolve(&held);
        tracing::debug!(discord_id, role = %role, "Resolved Discord role");
        Some(role)
    }

    /// Departments the user holds markers for, in the order Discord listed them.
    pub async fn resolve_departments(&self, discord_id: &str) -> Vec<Department> {
        let roles = self
            .fetcher
            .fetch_roles(&self.guilds.department_guild, discord_id)
            .await;
        self.tables.departments.resolve_all(&roles)
    }

    /// Whether the user carries the whitelist marker in the community guild.
    ///
    /// Unlike the resolvers above this surfaces fetch failures, so an outage
    /// is not reported as "not whitelisted".
    pub async fn is_whitelisted(&self, discord_id: &str) -> Result<bool> {
        let roles = self
            .fetcher
            .try_fetch_roles(&self.guilds.whitelist_guild, discord_id)
            .await?;
        Ok(roles.contains(&self.guilds.whitelist_role))
    }

    /// Role and departments together; the two lookups run concurrently.
    pub async fn resolve_profile(&self, discord_id: &str) -> ResolvedProfile {
        let (role, departments) = futures::join!(
            self.resolve_user_role(discord_id),
            self.resolve_departments(discord_id)
        );
        ResolvedProfile { role, departments }
    }
}
