//! # Checker
//!
//! The per-request authorization façade. A [`Checker`] borrows one user's
//! [`UserRoles`] and the shared [`Registry`] and answers role, permission and
//! assignability questions about that user.
//!
//! Every query is total: an undeclared scope type, an unknown role or a
//! malformed permission resolves to "no access" rather than an error.

use std::collections::HashSet;

use crate::permissions::{matches_any, WILDCARD};
use crate::registry::Registry;
use crate::scope::ScopeId;
use crate::user_roles::UserRoles;

/// Read access to other users' roles, supplied by the assignment store.
///
/// The checker only ever sees its own user's assignments. Questions about a
/// third party (for example, whether that person currently holds the role
/// being revoked) go through this trait.
pub trait RoleLookup {
    /// Roles `user_id` holds at the scope, including wildcard assignments.
    fn roles_of(&self, user_id: &str, scope_type: &str, scope_id: &str) -> Vec<String>;
}

/// Authorization decisions for one user.
///
/// # Example
///
/// ```
/// use platform_rbac::{Checker, Registry, RoleAssignment, UserRoles};
///
/// let mut builder = Registry::builder();
/// builder
///     .define_scope("organization")
///     .role("admin")
///     .permissions(["members.*"])
///     .can_assign(["member"])
///     .role("member")
///     .permissions(["documents.read"]);
/// let registry = builder.build().unwrap();
///
/// let roles = UserRoles::new("u1", vec![
///     RoleAssignment::new("u1", "admin", "organization", "org_1"),
/// ]);
/// let checker = Checker::new(&roles, &registry);
///
/// assert!(checker.has_permission("members.invite", "organization", "org_1"));
/// assert!(!checker.has_permission("documents.read", "organization", "org_1"));
/// assert!(checker.can_assign_role("member", "organization", "org_1"));
/// assert!(checker.get_permissions("organization", "org_2").is_none());
/// ```
pub struct Checker<'a> {
    user_roles: &'a UserRoles,
    registry: &'a Registry,
    lookup: Option<&'a dyn RoleLookup>,
}

impl std::fmt::Debug for Checker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("user_id", &self.user_id())
            .field("has_lookup", &self.lookup.is_some())
            .finish()
    }
}

impl<'a> Checker<'a> {
    /// Create a checker for the user behind `user_roles`.
    pub fn new(user_roles: &'a UserRoles, registry: &'a Registry) -> Self {
        Self {
            user_roles,
            registry,
            lookup: None,
        }
    }

    /// Attach a lookup used for questions about other users.
    pub fn with_lookup(mut self, lookup: &'a dyn RoleLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// The user this checker decides for.
    pub fn user_id(&self) -> &str {
        self.user_roles.user_id()
    }

    /// Check if the user has no role assignments.
    pub fn is_empty(&self) -> bool {
        self.user_roles.is_empty()
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Check if the user holds `role` at the scope.
    pub fn can(&self, role: &str, scope_type: &str, scope_id: &str) -> bool {
        self.user_roles.has_role(role, scope_type, scope_id)
    }

    /// Check if the user holds at least one of `roles`. False for an empty list.
    pub fn has_any_role(&self, roles: &[&str], scope_type: &str, scope_id: &str) -> bool {
        roles.iter().any(|role| self.can(role, scope_type, scope_id))
    }

    /// Check if the user holds every one of `roles`. True for an empty list.
    pub fn has_all_roles(&self, roles: &[&str], scope_type: &str, scope_id: &str) -> bool {
        roles.iter().all(|role| self.can(role, scope_type, scope_id))
    }

    // ------------------------------------------------------------------
    // Permissions
    // ------------------------------------------------------------------

    /// Check if any role held at the scope grants `permission`.
    pub fn has_permission(&self, permission: &str, scope_type: &str, scope_id: &str) -> bool {
        let allowed = match self.permission_union(scope_type, scope_id) {
            Some(patterns) => matches_any(patterns, permission),
            None => false,
        };

        tracing::trace!(
            user_id = %self.user_id(),
            permission = %permission,
            scope_type = %scope_type,
            scope_id = %scope_id,
            allowed,
            "Permission check"
        );

        allowed
    }

    /// Check if at least one of `permissions` is granted. False for an empty list.
    pub fn has_any_permission(
        &self,
        permissions: &[&str],
        scope_type: &str,
        scope_id: &str,
    ) -> bool {
        let Some(patterns) = self.permission_union(scope_type, scope_id) else {
            return false;
        };
        permissions
            .iter()
            .any(|permission| matches_any(&patterns, permission))
    }

    /// Check if every one of `permissions` is granted. True for an empty list.
    pub fn has_all_permissions(
        &self,
        permissions: &[&str],
        scope_type: &str,
        scope_id: &str,
    ) -> bool {
        if permissions.is_empty() {
            return true;
        }
        let Some(patterns) = self.permission_union(scope_type, scope_id) else {
            return false;
        };
        permissions
            .iter()
            .all(|permission| matches_any(&patterns, permission))
    }

    /// Permission patterns granted at the scope, without duplicates.
    ///
    /// Returns `None` when the user holds no role at the scope, and
    /// `Some` (possibly empty) when they hold at least one. Order is
    /// unspecified.
    pub fn get_permissions(&self, scope_type: &str, scope_id: &str) -> Option<HashSet<String>> {
        self.permission_union(scope_type, scope_id)
            .map(|patterns| patterns.into_iter().map(str::to_string).collect())
    }

    // ------------------------------------------------------------------
    // Assignability
    // ------------------------------------------------------------------

    /// Check if any role held at the scope may assign `target_role`.
    pub fn can_assign_role(&self, target_role: &str, scope_type: &str, scope_id: &str) -> bool {
        self.user_roles
            .get_roles(scope_type, scope_id)
            .into_iter()
            .any(|held| self.registry.can_role_assign(held, target_role, scope_type))
    }

    /// Roles this user may assign at the scope, without duplicates.
    ///
    /// `*` grants expand to every role declared in the scope type. Returns
    /// `None` when the user holds no role at the scope.
    pub fn get_assignable_roles(
        &self,
        scope_type: &str,
        scope_id: &str,
    ) -> Option<HashSet<String>> {
        let held = self.user_roles.get_roles(scope_type, scope_id);
        if held.is_empty() {
            return None;
        }

        let mut assignable = HashSet::new();
        for role in held {
            for target in self.registry.get_assignable(role, scope_type) {
                if target == WILDCARD {
                    assignable.extend(
                        self.registry
                            .role_names(scope_type)
                            .into_iter()
                            .map(str::to_string),
                    );
                } else {
                    assignable.insert(target.clone());
                }
            }
        }

        Some(assignable)
    }

    /// Check if this user may take `role` away from `target_user_id` at the scope.
    ///
    /// Requires a [`RoleLookup`]: the target must currently hold the role
    /// according to the lookup, and this user must be able to assign it.
    /// Without a lookup the answer is always `false`.
    pub fn can_revoke_role(
        &self,
        target_user_id: &str,
        role: &str,
        scope_type: &str,
        scope_id: &str,
    ) -> bool {
        let Some(lookup) = self.lookup else {
            return false;
        };

        let target_holds = lookup
            .roles_of(target_user_id, scope_type, scope_id)
            .iter()
            .any(|held| held == role);

        target_holds && self.can_assign_role(role, scope_type, scope_id)
    }

    // ------------------------------------------------------------------
    // Cross-scope queries
    // ------------------------------------------------------------------

    /// Check if the user holds `role` at any instance of `scope_type`.
    pub fn has_role_in_any_scope(&self, role: &str, scope_type: &str) -> bool {
        if role.is_empty() || scope_type.is_empty() {
            return false;
        }
        self.user_roles
            .assignments()
            .iter()
            .any(|a| a.scope_type == scope_type && a.role == role)
    }

    /// Scope ids of `scope_type` where the user was assigned `role`.
    pub fn get_scopes_with_role(&self, role: &str, scope_type: &str) -> Vec<ScopeId> {
        if role.is_empty() || scope_type.is_empty() {
            return Vec::new();
        }
        self.user_roles
            .assignments()
            .iter()
            .filter(|a| a.scope_type == scope_type && a.role == role)
            .map(|a| a.scope_id.clone())
            .collect()
    }

    /// Distinct scope ids of `scope_type` where the user holds any role.
    pub fn get_scopes_with_any_role(&self, scope_type: &str) -> Vec<ScopeId> {
        if scope_type.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        self.user_roles
            .assignments()
            .iter()
            .filter(|a| a.scope_type == scope_type && !a.role.is_empty())
            .filter(|a| seen.insert(&a.scope_id))
            .map(|a| a.scope_id.clone())
            .collect()
    }

    /// Union of the patterns granted by every role held at the scope.
    fn permission_union(&self, scope_type: &str, scope_id: &str) -> Option<HashSet<&'a str>> {
        let held = self.user_roles.get_roles(scope_type, scope_id);
        if held.is_empty() {
            return None;
        }

        Some(
            held.into_iter()
                .flat_map(|role| self.registry.get_permissions(role, scope_type))
                .map(String::as_str)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::RoleAssignment;

    fn registry() -> Registry {
        let mut builder = Registry::builder();
        builder
            .define_scope("organization")
            .role("owner")
            .permissions(["*"])
            .can_assign(["*"])
            .role("admin")
            .permissions(["members.*", "settings.read"])
            .can_assign(["member", "viewer"])
            .role("member")
            .permissions(["documents.read", "documents.create"])
            .role("viewer")
            .permissions(["documents.read"])
            .define_scope("project")
            .role("editor")
            .permissions(["files.*"])
            .role("reviewer")
            .permissions(["comments.*", "files.read"])
            .role("empty");
        builder.build().unwrap()
    }

    fn user(assignments: &[(&str, &str, &str)]) -> UserRoles {
        UserRoles::new(
            "u1",
            assignments
                .iter()
                .map(|(role, scope_type, scope_id)| {
                    RoleAssignment::new("u1", *role, *scope_type, *scope_id)
                })
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_role_checks() {
        let registry = registry();
        let roles = user(&[("admin", "organization", "o1"), ("member", "organization", "o1")]);
        let checker = Checker::new(&roles, &registry);

        assert!(checker.can("admin", "organization", "o1"));
        assert!(!checker.can("owner", "organization", "o1"));
        assert!(checker.has_any_role(&["owner", "member"], "organization", "o1"));
        assert!(!checker.has_any_role(&["owner", "viewer"], "organization", "o1"));
        assert!(checker.has_all_roles(&["admin", "member"], "organization", "o1"));
        assert!(!checker.has_all_roles(&["admin", "owner"], "organization", "o1"));
    }

    #[test]
    fn test_vacuous_role_lists() {
        let registry = registry();
        let roles = user(&[]);
        let checker = Checker::new(&roles, &registry);

        assert!(checker.has_all_roles(&[], "organization", "o1"));
        assert!(!checker.has_any_role(&[], "organization", "o1"));
        assert!(checker.has_all_permissions(&[], "organization", "o1"));
        assert!(!checker.has_any_permission(&[], "organization", "o1"));
    }

    #[test]
    fn test_permission_union_across_roles() {
        let registry = registry();
        let roles = user(&[("editor", "project", "p1"), ("reviewer", "project", "p1")]);
        let checker = Checker::new(&roles, &registry);

        assert!(checker.has_permission("files.delete", "project", "p1"));
        assert!(checker.has_permission("comments.create", "project", "p1"));
        assert!(!checker.has_permission("settings.write", "project", "p1"));
        assert!(checker.has_all_permissions(&["files.read", "comments.read"], "project", "p1"));
        assert!(!checker.has_all_permissions(&["files.read", "settings.write"], "project", "p1"));
        assert!(checker.has_any_permission(&["settings.write", "comments.read"], "project", "p1"));
    }

    #[test]
    fn test_get_permissions_deduplicates() {
        let registry = registry();
        let roles = user(&[("member", "organization", "o1"), ("viewer", "organization", "o1")]);
        let checker = Checker::new(&roles, &registry);

        let granted = checker.get_permissions("organization", "o1").unwrap();
        let expected: HashSet<String> = ["documents.read", "documents.create"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(granted, expected);
    }

    #[test]
    fn test_get_permissions_none_vs_empty() {
        let registry = registry();
        let roles = user(&[("empty", "project", "p1")]);
        let checker = Checker::new(&roles, &registry);

        assert_eq!(checker.get_permissions("project", "p1"), Some(HashSet::new()));
        assert_eq!(checker.get_permissions("project", "p2"), None);
        assert_eq!(checker.get_permissions("undefined_scope", "x"), None);
        assert!(!checker.has_permission("files.read", "project", "p1"));
    }

    #[test]
    fn test_blank_role_name_is_no_role() {
        let registry = registry();
        let roles = user(&[("", "organization", "o1")]);
        let checker = Checker::new(&roles, &registry);

        assert_eq!(checker.get_permissions("organization", "o1"), None);
        assert_eq!(checker.get_assignable_roles("organization", "o1"), None);
    }

    #[test]
    fn test_owner_wildcard_permission() {
        let registry = registry();
        let roles = user(&[("owner", "organization", "o1")]);
        let checker = Checker::new(&roles, &registry);

        assert!(checker.has_permission("billing.invoices.download", "organization", "o1"));
        assert!(!checker.has_permission("billing.invoices.download", "organization", "o2"));
    }

    #[test]
    fn test_undeclared_roles_grant_nothing() {
        let registry = registry();
        let roles = user(&[("superuser", "organization", "o1"), ("admin", "team", "t1")]);
        let checker = Checker::new(&roles, &registry);

        assert!(checker.can("superuser", "organization", "o1"));
        assert!(!checker.has_permission("members.invite", "organization", "o1"));
        assert!(!checker.has_permission("members.invite", "team", "t1"));
        assert_eq!(checker.get_permissions("team", "t1"), Some(HashSet::new()));
        assert!(!checker.can_assign_role("member", "team", "t1"));
    }

    #[test]
    fn test_assignable_roles() {
        let registry = registry();

        let owner = user(&[("owner", "organization", "o1")]);
        let checker = Checker::new(&owner, &registry);
        let expected: HashSet<String> = ["owner", "admin", "member", "viewer"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(checker.get_assignable_roles("organization", "o1"), Some(expected));

        let admin = user(&[("admin", "organization", "o1")]);
        let checker = Checker::new(&admin, &registry);
        let expected: HashSet<String> = ["member", "viewer"].iter().map(|s| s.to_string()).collect();
        assert_eq!(checker.get_assignable_roles("organization", "o1"), Some(expected));
        assert!(checker.can_assign_role("viewer", "organization", "o1"));
        assert!(!checker.can_assign_role("admin", "organization", "o1"));
        assert!(!checker.can_assign_role("viewer", "organization", "o2"));

        let member = user(&[("member", "organization", "o1")]);
        let checker = Checker::new(&member, &registry);
        assert_eq!(checker.get_assignable_roles("organization", "o1"), Some(HashSet::new()));
        assert_eq!(checker.get_assignable_roles("organization", "o2"), None);
    }

    #[test]
    fn test_can_revoke_requires_lookup() {
        let registry = registry();
        let admin = user(&[("admin", "organization", "o1")]);
        let target = UserRoles::new(
            "u2",
            vec![RoleAssignment::new("u2", "member", "organization", "o1")],
        );

        let checker = Checker::new(&admin, &registry);
        assert!(!checker.can_revoke_role("u2", "member", "organization", "o1"));

        let checker = Checker::new(&admin, &registry).with_lookup(&target);
        assert!(checker.can_revoke_role("u2", "member", "organization", "o1"));
        // target does not hold viewer
        assert!(!checker.can_revoke_role("u2", "viewer", "organization", "o1"));
        // lookup only knows u2
        assert!(!checker.can_revoke_role("u3", "member", "organization", "o1"));
    }

    #[test]
    fn test_scope_scans() {
        let registry = registry();
        let roles = user(&[
            ("editor", "project", "p1"),
            ("reviewer", "project", "p1"),
            ("editor", "project", "p2"),
            ("reviewer", "project", "*"),
            ("admin", "organization", "o1"),
        ]);
        let checker = Checker::new(&roles, &registry);

        assert!(checker.has_role_in_any_scope("editor", "project"));
        assert!(!checker.has_role_in_any_scope("editor", "organization"));
        assert_eq!(
            checker.get_scopes_with_role("editor", "project"),
            vec![ScopeId::from("p1"), ScopeId::from("p2")]
        );
        assert_eq!(
            checker.get_scopes_with_role("reviewer", "project"),
            vec![ScopeId::from("p1"), ScopeId::Any]
        );
        assert_eq!(
            checker.get_scopes_with_any_role("project"),
            vec![ScopeId::from("p1"), ScopeId::from("p2"), ScopeId::Any]
        );
        assert!(checker.get_scopes_with_any_role("team").is_empty());
        assert!(!checker.is_empty());
    }
}
