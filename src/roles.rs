//! Closed role and department types.
//!
//! Every string that names a role or department (database rows, mapping
//! files, HTTP bodies) is converted here exactly once. Unknown names are
//! rejected instead of falling through to a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoleSyncError;

/// Internal authorization level of a forum user.
///
/// Variants are declared in privilege order, so the derived `Ord` compares
/// by privilege: `Applicant` is the lowest and `Webmaster` the highest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Applicant,
    Member,
    StaffInTraining,
    Staff,
    SeniorStaff,
    Admin,
    Moderator,
    SpecialAdvisor,
    SeniorAdmin,
    HeadAdmin,
    Webmaster,
}

impl Role {
    /// Every role, lowest privilege first.
    pub const ALL: [Role; 11] = [
        Role::Applicant,
        Role::Member,
        Role::StaffInTraining,
        Role::Staff,
        Role::SeniorStaff,
        Role::Admin,
        Role::Moderator,
        Role::SpecialAdvisor,
        Role::SeniorAdmin,
        Role::HeadAdmin,
        Role::Webmaster,
    ];

    /// Canonical stored name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "APPLICANT",
            Role::Member => "MEMBER",
            Role::StaffInTraining => "STAFF_IN_TRAINING",
            Role::Staff => "STAFF",
            Role::SeniorStaff => "SENIOR_STAFF",
            Role::Admin => "ADMIN",
            Role::Moderator => "MODERATOR",
            Role::SpecialAdvisor => "SPECIAL_ADVISOR",
            Role::SeniorAdmin => "SENIOR_ADMIN",
            Role::HeadAdmin => "HEAD_ADMIN",
            Role::Webmaster => "WEBMASTER",
        }
    }

    /// Human-readable label for messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Applicant => "Applicant",
            Role::Member => "Member",
            Role::StaffInTraining => "Staff in Training",
            Role::Staff => "Staff",
            Role::SeniorStaff => "Senior Staff",
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
            Role::SpecialAdvisor => "Special Advisor",
            Role::SeniorAdmin => "Senior Admin",
            Role::HeadAdmin => "Head Admin",
            Role::Webmaster => "Webmaster",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| RoleSyncError::UnknownRole(s.to_string()))
    }
}

/// Organizational unit a user belongs to, derived from the department guild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    Bsfr,
    Rnr,
    RnrAdministration,
    Bso,
    Mpd,
    Fhp,
    Comms,
    Fwc,
    Civ,
    Dev,
    #[default]
    #[serde(rename = "N_A")]
    NA,
}

impl Department {
    pub const ALL: [Department; 11] = [
        Department::Bsfr,
        Department::Rnr,
        Department::RnrAdministration,
        Department::Bso,
        Department::Mpd,
        Department::Fhp,
        Department::Comms,
        Department::Fwc,
        Department::Civ,
        Department::Dev,
        Department::NA,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Bsfr => "BSFR",
            Department::Rnr => "RNR",
            Department::RnrAdministration => "RNR_ADMINISTRATION",
            Department::Bso => "BSO",
            Department::Mpd => "MPD",
            Department::Fhp => "FHP",
            Department::Comms => "COMMS",
            Department::Fwc => "FWC",
            Department::Civ => "CIV",
            Department::Dev => "DEV",
            Department::NA => "N_A",
        }
    }

    /// Whether this is an actual department rather than the unassigned marker.
    pub fn is_assigned(&self) -> bool {
        *self != Department::NA
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = RoleSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Department::ALL
            .iter()
            .copied()
            .find(|dept| dept.as_str() == normalized)
            .ok_or_else(|| RoleSyncError::UnknownDepartment(s.to_string()))
    }
}

/// Opaque Discord role snowflake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalRoleId(String);

impl ExternalRoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalRoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExternalRoleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ExternalRoleId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}
