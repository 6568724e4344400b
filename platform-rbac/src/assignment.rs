//! Role assignment facts
//!
//! A role assignment binds a user to a role at a scope. The engine does not
//! own assignments; they are loaded elsewhere and handed over as a list.

use serde::{Deserialize, Serialize};

use crate::scope::{Scope, ScopeId};

/// A user holding a role at a scope.
///
/// The serialized form is flat, with the wildcard scope id written as `"*"`:
///
/// ```
/// use platform_rbac::{RoleAssignment, ScopeId};
///
/// let assignment: RoleAssignment = serde_json::from_str(
///     r#"{"user_id":"u1","role":"admin","scope_type":"project","scope_id":"*"}"#,
/// ).unwrap();
/// assert_eq!(assignment.scope_id, ScopeId::Any);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// User holding the role
    pub user_id: String,

    /// Role name, as declared in the scope type
    pub role: String,

    /// Scope type name
    pub scope_type: String,

    /// Scope instance, or every instance
    pub scope_id: ScopeId,
}

impl RoleAssignment {
    /// Creates a new role assignment.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_rbac::RoleAssignment;
    ///
    /// let assignment = RoleAssignment::new("u1", "member", "organization", "org_1");
    /// assert_eq!(assignment.scope().to_string(), "organization:org_1");
    /// ```
    pub fn new(
        user_id: impl Into<String>,
        role: impl Into<String>,
        scope_type: impl Into<String>,
        scope_id: impl Into<ScopeId>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
            scope_type: scope_type.into(),
            scope_id: scope_id.into(),
        }
    }

    /// Creates an assignment at a [`Scope`].
    pub fn at(user_id: impl Into<String>, role: impl Into<String>, scope: Scope) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
            scope_type: scope.scope_type,
            scope_id: scope.scope_id,
        }
    }

    /// The scope this assignment applies to.
    pub fn scope(&self) -> Scope {
        Scope::new(self.scope_type.clone(), self.scope_id.clone())
    }

    /// Check if this assignment covers every instance of its scope type.
    pub fn is_wildcard(&self) -> bool {
        self.scope_id.is_any()
    }
}
