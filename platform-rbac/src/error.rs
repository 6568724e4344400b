//! Error types for registry validation
//!
//! Only the registry's validation entry points and declaration-time pattern
//! checks produce these errors. Checker queries never fail: an unknown scope
//! or role simply grants nothing.

use thiserror::Error;

/// Authorization catalog error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// Scope type has not been declared
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Role is not declared within an otherwise valid scope type
    #[error("Invalid role '{role}' for scope '{scope_type}'")]
    InvalidRole {
        /// Role name that failed validation.
        role: String,
        /// Scope type the role was looked up in.
        scope_type: String,
    },

    /// Permission or permission pattern is malformed
    #[error("Invalid permission '{permission}': {reason}")]
    InvalidPermission {
        /// The rejected permission string.
        permission: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for authorization catalog operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

impl AuthzError {
    pub(crate) fn invalid_role(role: impl Into<String>, scope_type: impl Into<String>) -> Self {
        AuthzError::InvalidRole {
            role: role.into(),
            scope_type: scope_type.into(),
        }
    }

    pub(crate) fn invalid_permission(
        permission: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        AuthzError::InvalidPermission {
            permission: permission.into(),
            reason: reason.into(),
        }
    }

    /// Get HTTP status code for this error.
    ///
    /// Unknown scopes and roles are 400; a malformed permission pattern is
    /// 422.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthzError::InvalidScope(_) | AuthzError::InvalidRole { .. } => 400,
            AuthzError::InvalidPermission { .. } => 422,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthzError::InvalidScope(_) => "INVALID_SCOPE",
            AuthzError::InvalidRole { .. } => "INVALID_ROLE",
            AuthzError::InvalidPermission { .. } => "INVALID_PERMISSION",
        }
    }
}
