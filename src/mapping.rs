//! Discord role id to internal role/department mapping tables.
//!
//! Both tables are priority lists: the first matching entry wins. The role
//! table is ordered most-privileged first, so a member holding both a Staff
//! and a Senior Staff role resolves to Senior Staff.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoleSyncError};
use crate::roles::{Department, ExternalRoleId, Role};

/// Ordered `(Discord role id, Role)` pairs for the main guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMappingTable {
    entries: Vec<(ExternalRoleId, Role)>,
}

impl RoleMappingTable {
    pub fn new(entries: Vec<(ExternalRoleId, Role)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(ExternalRoleId, Role)] {
        &self.entries
    }

    /// Resolve a set of held role ids to a single role.
    ///
    /// Returns the role of the first entry whose id is held, or
    /// `Role::Applicant` when nothing matches.
    pub fn resolve(&self, held: &HashSet<ExternalRoleId>) -> Role {
        self.entries
            .iter()
            .find(|(id, _)| held.contains(id))
            .map(|(_, role)| *role)
            .unwrap_or_default()
    }
}

/// Ordered `(Discord role id, Department)` pairs for the department guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentMappingTable {
    entries: Vec<(ExternalRoleId, Department)>,
}

impl DepartmentMappingTable {
    pub fn new(entries: Vec<(ExternalRoleId, Department)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(ExternalRoleId, Department)] {
        &self.entries
    }

    /// Map held role ids to departments in the order the ids were received.
    ///
    /// Unmapped ids are skipped; a department reached through several ids
    /// appears once, at its first position.
    pub fn resolve_all(&self, held: &[ExternalRoleId]) -> Vec<Department> {
        let mut departments = Vec::new();
        for id in held {
            let mapped = self
                .entries
                .iter()
                .find(|(entry_id, _)| entry_id == id)
                .map(|(_, dept)| *dept);
            if let Some(dept) = mapped {
                if !departments.contains(&dept) {
                    departments.push(dept);
                }
            }
        }
        departments
    }
}

/// Both tables, as loaded at startup.
#[derive(Debug, Clone)]
pub struct MappingTables {
    pub roles: RoleMappingTable,
    pub departments: DepartmentMappingTable,
}

impl Default for MappingTables {
    fn default() -> Self {
        Self {
            roles: default_role_table(),
            departments: default_department_table(),
        }
    }
}

impl MappingTables {
    /// Load tables from a JSON mapping file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| RoleSyncError::Config(format!("Failed to read mapping file: {}", e)))?;
        Self::from_json(&content)
    }

    /// Parse tables from JSON. Role and department names are validated here.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: MappingFile = serde_json::from_str(content)
            .map_err(|e| RoleSyncError::Config(format!("Failed to parse mapping file: {}", e)))?;

        let roles = file
            .roles
            .into_iter()
            .map(|entry| -> Result<(ExternalRoleId, Role)> {
                Ok((ExternalRoleId::new(entry.id), entry.role.parse()?))
            })
            .collect::<Result<Vec<_>>>()?;

        let departments = file
            .departments
            .into_iter()
            .map(|entry| -> Result<(ExternalRoleId, Department)> {
                Ok((ExternalRoleId::new(entry.id), entry.department.parse()?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            roles: RoleMappingTable::new(roles),
            departments: DepartmentMappingTable::new(departments),
        })
    }
}

/// On-disk mapping file shape. Names stay strings until validated.
#[derive(Debug, Default, Serialize, Deserialize)]
struct MappingFile {
    #[serde(default)]
    roles: Vec<RoleEntry>,
    #[serde(default)]
    departments: Vec<DepartmentEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RoleEntry {
    id: String,
    role: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DepartmentEntry {
    id: String,
    department: String,
}

/// Main guild role ids, most privileged first.
pub fn default_role_table() -> RoleMappingTable {
    RoleMappingTable::new(
        [
            ("1160657330359304293", Role::Webmaster),
            ("1160657330359304292", Role::HeadAdmin),
            ("1160657330359304291", Role::SeniorAdmin),
            ("1160657330359304290", Role::SpecialAdvisor),
            ("1160657330338340984", Role::Moderator),
            ("1160657330338340983", Role::Admin),
            ("1160657330338340982", Role::SeniorStaff),
            ("1160657330338340981", Role::Staff),
            ("1160657330338340980", Role::StaffInTraining),
            ("1160657330321547363", Role::Member),
        ]
        .into_iter()
        .map(|(id, role)| (ExternalRoleId::new(id), role))
        .collect(),
    )
}

/// Department guild role ids.
pub fn default_department_table() -> DepartmentMappingTable {
    DepartmentMappingTable::new(
        [
            ("1226371587443048478", Department::Bsfr),
            ("1226371587443048477", Department::Rnr),
            ("1226371587443048476", Department::RnrAdministration),
            ("1226371587426140211", Department::Bso),
            ("1226371587426140210", Department::Mpd),
            ("1226371587426140209", Department::Fhp),
            ("1226371587409367070", Department::Comms),
            ("1226371587409367069", Department::Fwc),
            ("1226371587409367068", Department::Civ),
            ("1226371587392589854", Department::Dev),
        ]
        .into_iter()
        .map(|(id, dept)| (ExternalRoleId::new(id), dept))
        .collect(),
    )
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_table() -> impl Strategy<Value = RoleMappingTable> {
        prop::collection::vec(
            ("[0-9]{3,6}", prop::sample::select(Role::ALL.to_vec())),
            0..12,
        )
        .prop_map(|pairs| {
            RoleMappingTable::new(
                pairs
                    .into_iter()
                    .map(|(id, role)| (ExternalRoleId::new(id), role))
                    .collect(),
            )
        })
    }

    fn arb_held() -> impl Strategy<Value = HashSet<ExternalRoleId>> {
        prop::collection::hash_set("[0-9]{3,6}".prop_map(ExternalRoleId::new), 0..12)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The resolved role is always the first table entry held, or
        /// Applicant when no entry is held, regardless of set size.
        #[test]
        fn prop_resolve_is_first_held_entry(table in arb_table(), held in arb_held()) {
            let expected = table
                .entries()
                .iter()
                .find(|(id, _)| held.contains(id))
                .map(|(_, role)| *role)
                .unwrap_or(Role::Applicant);

            prop_assert_eq!(table.resolve(&held), expected);
        }

        /// Resolution is deterministic.
        #[test]
        fn prop_resolve_deterministic(table in arb_table(), held in arb_held()) {
            prop_assert_eq!(table.resolve(&held), table.resolve(&held));
        }

        /// Adding ids that are not in the table never changes the result.
        #[test]
        fn prop_unmapped_ids_ignored(
            table in arb_table(),
            held in arb_held(),
            extra in prop::collection::vec("[a-z]{4,8}", 0..5),
        ) {
            let mut grown = held.clone();
            grown.extend(extra.into_iter().map(ExternalRoleId::new));
            prop_assert_eq!(table.resolve(&held), table.resolve(&grown));
        }
    }
}
