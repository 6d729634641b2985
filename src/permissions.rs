//! Permission predicates over resolved roles and departments.
//!
//! Everything here is pure and synchronous: callers resolve the role and
//! department first, then ask these functions what the user may do.

use serde::{Deserialize, Serialize};

use crate::roles::{Department, Role};

/// Staff panel access: Staff in Training and everything above it.
pub fn has_staff_permission(role: Role) -> bool {
    matches!(
        role,
        Role::StaffInTraining
            | Role::Staff
            | Role::SeniorStaff
            | Role::Admin
            | Role::Moderator
            | Role::SpecialAdvisor
            | Role::SeniorAdmin
            | Role::HeadAdmin
            | Role::Webmaster
    )
}

/// Admin panel access.
pub fn has_admin_permission(role: Role) -> bool {
    matches!(
        role,
        Role::Admin
            | Role::Moderator
            | Role::SpecialAdvisor
            | Role::SeniorAdmin
            | Role::HeadAdmin
            | Role::Webmaster
    )
}

/// Authority to override department-level decisions.
pub fn can_override(role: Role) -> bool {
    matches!(role, Role::SeniorAdmin | Role::HeadAdmin | Role::Webmaster)
}

/// Forum categories with posting restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForumCategory {
    Announcements,
    RnrAdministration,
    StaffLounge,
    DepartmentApplications,
    Development,
    General,
}

impl ForumCategory {
    /// Map a stored category id to its posting rule.
    pub fn from_id(category_id: i64) -> Self {
        match category_id {
            1 => ForumCategory::Announcements,
            2 => ForumCategory::RnrAdministration,
            3 => ForumCategory::StaffLounge,
            4 => ForumCategory::DepartmentApplications,
            5 => ForumCategory::Development,
            _ => ForumCategory::General,
        }
    }

    pub fn allows(&self, role: Role, department: Department) -> bool {
        match self {
            ForumCategory::Announcements => has_admin_permission(role),
            ForumCategory::RnrAdministration => {
                department == Department::RnrAdministration || can_override(role)
            }
            ForumCategory::StaffLounge => has_staff_permission(role),
            ForumCategory::DepartmentApplications => true,
            ForumCategory::Development => department == Department::Dev || can_override(role),
            ForumCategory::General => role >= Role::Member,
        }
    }
}

pub fn can_post_in_category(category_id: i64, role: Role, department: Department) -> bool {
    ForumCategory::from_id(category_id).allows(role, department)
}

/// Whether a reviewer may act on a department application.
///
/// Admins review every department; other staff only their own.
pub fn can_review_applications(
    role: Role,
    reviewer_department: Department,
    application_department: Department,
) -> bool {
    if has_admin_permission(role) {
        return true;
    }
    has_staff_permission(role)
        && reviewer_department.is_assigned()
        && reviewer_department == application_department
}

/// Whether `actor` may change the role of a user currently holding `target`,
/// or grant `target` to someone.
///
/// Admins act strictly below their own rank; override holders may also act
/// at their own rank. Nobody acts above it.
pub fn can_manage_user(actor: Role, target: Role) -> bool {
    if can_override(actor) {
        return actor >= target;
    }
    has_admin_permission(actor) && actor > target
}

/// Snapshot of predicate results for one user, as served to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSummary {
    pub role: Role,
    pub department: Department,
    pub staff_panel: bool,
    pub admin_panel: bool,
    pub can_override: bool,
    pub postable_categories: Vec<i64>,
}

impl PermissionSummary {
    pub fn for_user(role: Role, department: Department) -> Self {
        Self {
            role,
            department,
            staff_panel: has_staff_permission(role),
            admin_panel: has_admin_permission(role),
            can_override: can_override(role),
            postable_categories: (1..=6)
                .filter(|id| can_post_in_category(*id, role, department))
                .collect(),
        }
    }
}
