//! # Registry
//!
//! The catalog of scope types, their roles, the permission patterns each
//! role grants and the roles each role may assign to others.
//!
//! A [`Registry`] is produced once by [`RegistryBuilder::build`](crate::RegistryBuilder::build)
//! (or [`Registry::from_config`]) and has no mutating methods afterwards, so
//! it can be shared between request handlers behind an `Arc` without locks.

use serde::Serialize;
use std::collections::HashMap;

use crate::builder::RegistryBuilder;
use crate::error::{AuthzError, AuthzResult};
use crate::permissions::WILDCARD;

/// A role declared within one scope type.
///
/// Role names are local to their scope type: `admin` in `organization` and
/// `admin` in `project` are unrelated definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    name: String,
    permissions: Vec<String>,
    assignable_roles: Vec<String>,
}

impl RoleDefinition {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: Vec::new(),
            assignable_roles: Vec::new(),
        }
    }

    /// Role name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permission patterns in declaration order (may contain duplicates).
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Roles this role may assign, in declaration order. `*` means any role
    /// of the same scope type.
    pub fn assignable_roles(&self) -> &[String] {
        &self.assignable_roles
    }

    /// Check if this role may assign `target`.
    ///
    /// Only the declared list is consulted; nothing is inherited from the
    /// target role or from any other role.
    pub fn can_assign(&self, target: &str) -> bool {
        self.assignable_roles
            .iter()
            .any(|r| r == WILDCARD || r == target)
    }

    pub(crate) fn push_permission(&mut self, pattern: String) {
        self.permissions.push(pattern);
    }

    pub(crate) fn push_assignable(&mut self, role: String) {
        self.assignable_roles.push(role);
    }
}

/// A scope type and the roles declared for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeDefinition {
    name: String,
    parent: Option<String>,
    roles: Vec<RoleDefinition>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ScopeDefinition {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            roles: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Scope type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent scope type, if one was recorded.
    ///
    /// This is descriptive metadata only. Holding a role in the parent scope
    /// grants nothing in this one.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Roles in declaration order.
    pub fn roles(&self) -> &[RoleDefinition] {
        &self.roles
    }

    /// Look up a role by name.
    pub fn role(&self, name: &str) -> Option<&RoleDefinition> {
        self.index.get(name).map(|&i| &self.roles[i])
    }

    /// Role names in declaration order.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.name())
    }

    /// Check if a role is declared in this scope type.
    pub fn has_role(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub(crate) fn set_parent(&mut self, parent: String) {
        self.parent = Some(parent);
    }

    /// Declare a role, resetting it in place if it already exists.
    pub(crate) fn declare_role(&mut self, name: &str) {
        match self.index.get(name) {
            Some(&i) => self.roles[i] = RoleDefinition::new(name),
            None => {
                self.index.insert(name.to_string(), self.roles.len());
                self.roles.push(RoleDefinition::new(name));
            }
        }
    }

    pub(crate) fn role_mut(&mut self, name: &str) -> Option<&mut RoleDefinition> {
        match self.index.get(name) {
            Some(&i) => self.roles.get_mut(i),
            None => None,
        }
    }
}

/// Frozen catalog of scope types and roles.
///
/// # Example
///
/// ```
/// use platform_rbac::Registry;
///
/// let mut builder = Registry::builder();
/// builder
///     .define_scope("organization")
///     .role("admin")
///     .permissions(["members.*", "settings.read"])
///     .can_assign(["member"])
///     .role("member")
///     .permissions(["documents.read"]);
/// let registry = builder.build().unwrap();
///
/// assert!(registry.validate_role("admin", "organization").is_ok());
/// assert!(registry.can_role_assign("admin", "member", "organization"));
/// assert!(registry.get_permissions("owner", "organization").is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registry {
    scopes: HashMap<String, ScopeDefinition>,
}

impl Registry {
    /// Start declaring a new registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn from_scopes(scopes: HashMap<String, ScopeDefinition>) -> Self {
        Self { scopes }
    }

    /// Look up a scope type definition.
    pub fn scope(&self, scope_type: &str) -> Option<&ScopeDefinition> {
        self.scopes.get(scope_type)
    }

    /// Check if a scope type is declared.
    pub fn has_scope(&self, scope_type: &str) -> bool {
        self.scopes.contains_key(scope_type)
    }

    /// Check if a role is declared within a scope type.
    pub fn has_role(&self, role: &str, scope_type: &str) -> bool {
        self.role(role, scope_type).is_some()
    }

    /// All declared scope type names, sorted.
    pub fn scope_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scopes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parent scope type recorded for `scope_type`, if any.
    pub fn parent_scope(&self, scope_type: &str) -> Option<&str> {
        self.scope(scope_type).and_then(ScopeDefinition::parent)
    }

    /// Role names declared in `scope_type`, in declaration order.
    ///
    /// Empty for an undeclared scope type.
    pub fn role_names(&self, scope_type: &str) -> Vec<&str> {
        self.scope(scope_type)
            .map(|scope| scope.role_names().collect())
            .unwrap_or_default()
    }

    /// Ensure a scope type is declared.
    ///
    /// # Errors
    ///
    /// [`AuthzError::InvalidScope`] if it is not.
    pub fn validate_scope(&self, scope_type: &str) -> AuthzResult<()> {
        if self.has_scope(scope_type) {
            Ok(())
        } else {
            Err(AuthzError::InvalidScope(scope_type.to_string()))
        }
    }

    /// Ensure a role is declared within a scope type.
    ///
    /// # Errors
    ///
    /// [`AuthzError::InvalidScope`] if the scope type is unknown, otherwise
    /// [`AuthzError::InvalidRole`] if the role is not declared in it.
    pub fn validate_role(&self, role: &str, scope_type: &str) -> AuthzResult<()> {
        let scope = self
            .scope(scope_type)
            .ok_or_else(|| AuthzError::InvalidScope(scope_type.to_string()))?;

        if scope.has_role(role) {
            Ok(())
        } else {
            Err(AuthzError::invalid_role(role, scope_type))
        }
    }

    /// Permission patterns granted by a role.
    ///
    /// An unknown scope type or role grants nothing, so this returns an empty
    /// slice instead of an error.
    pub fn get_permissions(&self, role: &str, scope_type: &str) -> &[String] {
        self.role(role, scope_type)
            .map(RoleDefinition::permissions)
            .unwrap_or(&[])
    }

    /// Assignable role tokens declared on a role (unexpanded, may contain `*`).
    pub fn get_assignable(&self, role: &str, scope_type: &str) -> &[String] {
        self.role(role, scope_type)
            .map(RoleDefinition::assignable_roles)
            .unwrap_or(&[])
    }

    /// Check if `assigner` may assign `target` within `scope_type`.
    ///
    /// True when `assigner` is declared in the scope type and its assignable
    /// list contains `target` or `*`. Assignability is not transitive.
    pub fn can_role_assign(&self, assigner: &str, target: &str, scope_type: &str) -> bool {
        self.role(assigner, scope_type)
            .map(|role| role.can_assign(target))
            .unwrap_or(false)
    }

    fn role(&self, role: &str, scope_type: &str) -> Option<&RoleDefinition> {
        self.scopes.get(scope_type).and_then(|scope| scope.role(role))
    }
}
