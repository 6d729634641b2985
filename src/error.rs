//! Error types for role and department synchronization.
//!
//! All errors are explicitly typed using thiserror. No panics in production code.

use thiserror::Error;

use crate::roles::Department;

/// Central error type for all role-sync operations.
#[derive(Debug, Error)]
pub enum RoleSyncError {
    /// Caller has no valid session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Target user has no Discord account linked.
    #[error("No external identity linked")]
    NoExternalIdentity,

    /// Discord could not be reached or answered with something unusable.
    #[error("External service unavailable: {0}")]
    ExternalServiceUnavailable(String),

    /// Discord asked us to slow down.
    #[error("Rate limited, retry after {retry_after_ms}ms")]
    ExternalServiceRateLimited {
        /// Milliseconds to wait before retry.
        retry_after_ms: u64,
    },

    /// The member lookup returned no roles at all.
    #[error("No roles found")]
    NoRolesFound,

    /// User lacks the whitelist marker role in the community guild.
    #[error("User is not whitelisted")]
    NotWhitelisted,

    /// Several departments apply and the caller must pick one.
    #[error("Ambiguous department: {0:?}")]
    AmbiguousDepartment(Vec<Department>),

    /// The department picked by the caller is not among the candidates.
    #[error("Department {0} is not one of the user's departments")]
    InvalidSelection(Department),

    /// Writing the resolved value failed.
    #[error("Failed to persist change: {0}")]
    PersistFailed(String),

    /// No forum user with this id.
    #[error("User {0} not found")]
    UserNotFound(i64),

    /// Caller is authenticated but lacks the required permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A role name outside the closed set.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A department name outside the closed set.
    #[error("Unknown department: {0}")]
    UnknownDepartment(String),

    /// Configuration error (missing env vars, invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl RoleSyncError {
    /// Log error with full context using tracing.
    pub fn log_with_context(&self, context: &ErrorContext) {
        match self {
            // Critical errors that require immediate attention
            Self::Database(_) | Self::PersistFailed(_) => {
                tracing::error!(
                    error = %self,
                    request_id = %context.request_id,
                    user_id = ?context.user_id,
                    operation = %context.operation,
                    "Critical error occurred"
                );
            }
            Self::ExternalServiceRateLimited { retry_after_ms } => {
                tracing::warn!(
                    error = %self,
                    request_id = %context.request_id,
                    user_id = ?context.user_id,
                    operation = %context.operation,
                    retry_after_ms = retry_after_ms,
                    "Rate limited"
                );
            }
            Self::ExternalServiceUnavailable(_) => {
                tracing::error!(
                    error = %self,
                    request_id = %context.request_id,
                    user_id = ?context.user_id,
                    operation = %context.operation,
                    "External API error"
                );
            }
            Self::Config(_) => {
                tracing::error!(
                    error = %self,
                    request_id = %context.request_id,
                    operation = %context.operation,
                    "Configuration error"
                );
            }
            // Expected outcomes of a sync attempt
            Self::NotAuthenticated
            | Self::NoExternalIdentity
            | Self::NoRolesFound
            | Self::NotWhitelisted
            | Self::AmbiguousDepartment(_)
            | Self::InvalidSelection(_)
            | Self::UserNotFound(_)
            | Self::Forbidden(_)
            | Self::UnknownRole(_)
            | Self::UnknownDepartment(_) => {
                tracing::info!(
                    error = %self,
                    request_id = %context.request_id,
                    user_id = ?context.user_id,
                    operation = %context.operation,
                    "Request refused"
                );
            }
        }
    }

    /// Get user-friendly error message (hides internal details).
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "Not authenticated",
            Self::NoExternalIdentity => "No Discord account linked",
            Self::ExternalServiceUnavailable(_) => "Discord service temporarily unavailable",
            Self::ExternalServiceRateLimited { .. } => "Too many requests, please try again later",
            Self::NoRolesFound => "No Discord roles found",
            Self::NotWhitelisted => "You are not whitelisted in the community server",
            Self::AmbiguousDepartment(_) => "Multiple departments found; please select one",
            Self::InvalidSelection(_) => "Selected department is not one of your Discord departments",
            Self::PersistFailed(_) | Self::Database(_) => "Database service temporarily unavailable",
            Self::UserNotFound(_) => "User not found",
            Self::Forbidden(_) => "You do not have permission to do that",
            Self::UnknownRole(_) => "Unknown role",
            Self::UnknownDepartment(_) => "Unknown department",
            Self::Config(_) => "Service configuration error",
        }
    }
}

/// Context information for error logging.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Unique request identifier for correlation
    pub request_id: String,
    /// Forum user id if available
    pub user_id: Option<i64>,
    /// Operation being performed
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Result type alias for role-sync operations.
pub type Result<T> = std::result::Result<T, RoleSyncError>;
