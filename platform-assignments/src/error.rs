//! Error types for assignment storage and workflow
//!
//! Store errors carry an explicit kind so callers can decide whether a
//! failure is worth retrying without inspecting error text.

use platform_rbac::{AuthzError, Scope};
use thiserror::Error;

/// Assignment store error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No matching assignment exists
    #[error("Assignment not found: {0}")]
    NotFound(String),

    /// The assignment already exists
    #[error("Assignment already exists: {0}")]
    Duplicate(String),

    /// Backend temporarily unavailable (connection dropped, pool exhausted, ...)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Operation did not complete in time
    #[error("Store operation timed out")]
    Timeout,

    /// Any other backend failure
    #[error("Store error: {0}")]
    Internal(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Check if retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout)
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => 404,
            StoreError::Duplicate(_) => 409,
            StoreError::Unavailable(_) => 503,
            StoreError::Timeout => 504,
            StoreError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "ASSIGNMENT_NOT_FOUND",
            StoreError::Duplicate(_) => "ASSIGNMENT_EXISTS",
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
            StoreError::Timeout => "STORE_TIMEOUT",
            StoreError::Internal(_) => "STORE_ERROR",
        }
    }
}

/// Role assignment workflow error types.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Scope type or role failed registry validation
    #[error(transparent)]
    Authz(#[from] AuthzError),

    /// Storage failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The acting user may not perform the change
    #[error("Forbidden: {actor_id} may not {action} role '{role}' at {scope}")]
    Forbidden {
        /// User attempting the change.
        actor_id: String,
        /// `assign` or `revoke`.
        action: &'static str,
        /// Role being changed.
        role: String,
        /// Scope of the change.
        scope: Scope,
    },
}

/// Result type for workflow operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

impl ManagerError {
    /// Check if this error should be logged at error level.
    ///
    /// Validation failures and refusals are expected outcomes.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ManagerError::Store(
                StoreError::Unavailable(_) | StoreError::Timeout | StoreError::Internal(_)
            )
        )
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ManagerError::Authz(e) => e.status_code(),
            ManagerError::Store(e) => e.status_code(),
            ManagerError::Forbidden { .. } => 403,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ManagerError::Authz(e) => e.error_code(),
            ManagerError::Store(e) => e.error_code(),
            ManagerError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}
