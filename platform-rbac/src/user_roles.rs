//! Indexed role assignments for one user
//!
//! [`UserRoles`] is built once from a snapshot of a user's assignments and
//! never changes afterwards. Changing a user's roles means loading a fresh
//! snapshot and building a new value.

use std::collections::HashMap;

use crate::assignment::RoleAssignment;
use crate::checker::RoleLookup;
use crate::scope::ANY_SCOPE_ID;

/// One user's role assignments, indexed by scope.
///
/// Lookups are `scope type -> scope id -> roles`, with wildcard assignments
/// stored under the `*` id, so both the exact and the wildcard bucket are a
/// pair of hash lookups away.
///
/// # Examples
///
/// ```
/// use platform_rbac::{RoleAssignment, ScopeId, UserRoles};
///
/// let roles = UserRoles::new("u1", vec![
///     RoleAssignment::new("u1", "member", "project", "p1"),
///     RoleAssignment::new("u1", "viewer", "project", ScopeId::Any),
/// ]);
///
/// assert_eq!(roles.get_roles("project", "p1"), vec!["member", "viewer"]);
/// assert_eq!(roles.get_roles("project", "p2"), vec!["viewer"]);
/// assert!(roles.get_roles("organization", "o1").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct UserRoles {
    user_id: String,
    assignments: Vec<RoleAssignment>,
    index: HashMap<String, HashMap<String, Vec<String>>>,
}

impl UserRoles {
    /// Index a user's assignments.
    ///
    /// Every supplied assignment is kept and indexed, including one recorded
    /// under a different user id (logged as a warning). Assignments with an
    /// empty role name are kept but grant no role. Within one scope key a
    /// role is kept once, in first-seen order.
    pub fn new<I>(user_id: impl Into<String>, assignments: I) -> Self
    where
        I: IntoIterator<Item = RoleAssignment>,
    {
        let user_id = user_id.into();
        let mut kept = Vec::new();
        let mut index: HashMap<String, HashMap<String, Vec<String>>> = HashMap::new();

        for assignment in assignments {
            if assignment.user_id != user_id {
                tracing::warn!(
                    expected = %user_id,
                    found = %assignment.user_id,
                    role = %assignment.role,
                    "Role assignment recorded for another user"
                );
            }

            if !assignment.role.is_empty() {
                let roles = index
                    .entry(assignment.scope_type.clone())
                    .or_default()
                    .entry(assignment.scope_id.as_str().to_string())
                    .or_default();
                if !roles.contains(&assignment.role) {
                    roles.push(assignment.role.clone());
                }
            }

            kept.push(assignment);
        }

        Self {
            user_id,
            assignments: kept,
            index,
        }
    }

    /// The user these assignments belong to.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// All assignments, in the order they were supplied.
    pub fn assignments(&self) -> &[RoleAssignment] {
        &self.assignments
    }

    /// Check if the user has no assignments at all.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Roles held at a scope.
    ///
    /// Returns the roles assigned at exactly `(scope_type, scope_id)`
    /// followed by the roles assigned at `(scope_type, *)`. A role present in
    /// both buckets appears twice. An empty scope type matches nothing.
    ///
    /// Querying with `scope_id == "*"` returns the wildcard bucket once, not
    /// twice: the exact bucket and the wildcard bucket are the same key.
    pub fn get_roles(&self, scope_type: &str, scope_id: &str) -> Vec<&str> {
        if scope_type.is_empty() {
            return Vec::new();
        }

        let Some(by_id) = self.index.get(scope_type) else {
            return Vec::new();
        };

        let exact = if scope_id == ANY_SCOPE_ID {
            None
        } else {
            by_id.get(scope_id)
        };
        let wildcard = by_id.get(ANY_SCOPE_ID);

        exact
            .into_iter()
            .chain(wildcard)
            .flat_map(|roles| roles.iter().map(String::as_str))
            .collect()
    }

    /// Check if the user holds `role` at a scope (directly or via `*`).
    pub fn has_role(&self, role: &str, scope_type: &str, scope_id: &str) -> bool {
        if role.is_empty() {
            return false;
        }
        self.get_roles(scope_type, scope_id).contains(&role)
    }
}

impl RoleLookup for UserRoles {
    fn roles_of(&self, user_id: &str, scope_type: &str, scope_id: &str) -> Vec<String> {
        if user_id != self.user_id {
            return Vec::new();
        }
        self.get_roles(scope_type, scope_id)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
