//! # Registry builder
//!
//! Two ways to declare the catalog at startup:
//!
//! - **Fluent**: [`RegistryBuilder`] hands out a [`ScopeBuilder`] per scope
//!   type and a [`RoleBuilder`] per role. Each handle borrows the builder, so
//!   declarations chain from one role to the next and on to the next scope.
//! - **Declarative**: a [`RegistryConfig`] (deserializable from JSON) passed
//!   to [`Registry::from_config`] or [`build_registry`].
//!
//! Both end in a frozen [`Registry`]. Declaration problems (malformed
//! permission patterns, empty names) are collected while chaining and
//! reported once by [`RegistryBuilder::build`].
//!
//! ```text
//! define_scope("organization")
//!   .role("owner").permissions(["*"]).can_assign(["*"])
//!   .role("admin").permissions(["members.*"]).can_assign(["member"])
//!   .define_scope("project").parent_scope("organization")
//!   .role("editor").permissions(["files.*"])
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AuthzError, AuthzResult};
use crate::permissions;
use crate::registry::{Registry, ScopeDefinition};

/// Accumulates scope and role declarations.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    scopes: HashMap<String, ScopeDefinition>,
    errors: Vec<AuthzError>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a scope type.
    ///
    /// Declaring the same scope type twice replaces the earlier definition
    /// and all of its roles.
    pub fn define_scope(&mut self, name: impl Into<String>) -> ScopeBuilder<'_> {
        let name = name.into();
        if name.is_empty() {
            self.errors.push(AuthzError::InvalidScope(name.clone()));
        }
        self.scopes
            .insert(name.clone(), ScopeDefinition::new(name.clone()));
        ScopeBuilder {
            builder: self,
            scope: name,
        }
    }

    /// Freeze the declarations into a [`Registry`].
    ///
    /// # Errors
    ///
    /// The first declaration error recorded while chaining, if any.
    pub fn build(self) -> AuthzResult<Registry> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }

        tracing::debug!(
            scopes = self.scopes.len(),
            roles = self.scopes.values().map(|s| s.roles().len()).sum::<usize>(),
            "Registry built"
        );

        Ok(Registry::from_scopes(self.scopes))
    }

    fn scope_mut(&mut self, scope: &str) -> Option<&mut ScopeDefinition> {
        self.scopes.get_mut(scope)
    }
}

/// Handle for declaring roles on one scope type.
#[derive(Debug)]
pub struct ScopeBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    scope: String,
}

impl<'a> ScopeBuilder<'a> {
    /// Record the parent scope type (informational only, not validated).
    pub fn parent_scope(self, parent: impl Into<String>) -> Self {
        if let Some(scope) = self.builder.scope_mut(&self.scope) {
            scope.set_parent(parent.into());
        }
        self
    }

    /// Declare a role on this scope type.
    pub fn role(self, name: impl Into<String>) -> RoleBuilder<'a> {
        RoleBuilder::declare(self.builder, self.scope, name.into())
    }

    /// Name of the scope type being declared.
    pub fn name(&self) -> &str {
        &self.scope
    }
}

/// Handle for declaring one role's grants.
#[derive(Debug)]
pub struct RoleBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    scope: String,
    role: String,
}

impl<'a> RoleBuilder<'a> {
    fn declare(builder: &'a mut RegistryBuilder, scope: String, role: String) -> Self {
        if role.is_empty() {
            builder
                .errors
                .push(AuthzError::invalid_role(role.clone(), scope.clone()));
        }
        if let Some(definition) = builder.scope_mut(&scope) {
            definition.declare_role(&role);
        }
        Self {
            builder,
            scope,
            role,
        }
    }

    /// Append permission patterns to this role.
    ///
    /// Patterns are validated as they are declared; malformed ones are left
    /// out and reported by [`RegistryBuilder::build`].
    pub fn permissions<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            let pattern = pattern.into();
            if let Err(err) = permissions::validate(&pattern) {
                tracing::warn!(
                    scope = %self.scope,
                    role = %self.role,
                    error = %err,
                    "Rejected permission pattern"
                );
                self.builder.errors.push(err);
                continue;
            }
            if let Some(role) = self
                .builder
                .scope_mut(&self.scope)
                .and_then(|s| s.role_mut(&self.role))
            {
                role.push_permission(pattern);
            }
        }
        self
    }

    /// Append roles this role may assign. `*` means any role of this scope type.
    pub fn can_assign<I, S>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(role) = self
            .builder
            .scope_mut(&self.scope)
            .and_then(|s| s.role_mut(&self.role))
        {
            for target in roles {
                role.push_assignable(target.into());
            }
        }
        self
    }

    /// Record the parent scope type of the current scope.
    pub fn parent_scope(self, parent: impl Into<String>) -> Self {
        if let Some(scope) = self.builder.scope_mut(&self.scope) {
            scope.set_parent(parent.into());
        }
        self
    }

    /// Declare a sibling role on the same scope type.
    pub fn role(self, name: impl Into<String>) -> RoleBuilder<'a> {
        RoleBuilder::declare(self.builder, self.scope, name.into())
    }

    /// Move on to declaring another scope type.
    pub fn define_scope(self, name: impl Into<String>) -> ScopeBuilder<'a> {
        self.builder.define_scope(name)
    }

    /// Return to the scope handle, e.g. to declare roles in a loop.
    pub fn finish(self) -> ScopeBuilder<'a> {
        ScopeBuilder {
            builder: self.builder,
            scope: self.scope,
        }
    }
}

/// Declarative registry configuration.
///
/// # Example
///
/// ```
/// use platform_rbac::{Registry, RegistryConfig};
///
/// let config = RegistryConfig::from_json(r#"{
///     "scopes": [{
///         "name": "organization",
///         "roles": [
///             { "name": "owner", "permissions": ["*"], "can_assign": ["*"] },
///             { "name": "member", "permissions": ["documents.read"] }
///         ]
///     }]
/// }"#).unwrap();
///
/// let registry = Registry::from_config(&config).unwrap();
/// assert!(registry.can_role_assign("owner", "member", "organization"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Scope types to declare, in order.
    #[serde(default)]
    pub scopes: Vec<ScopeSpec>,
}

/// One scope type in a [`RegistryConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSpec {
    /// Scope type name.
    pub name: String,
    /// Informational parent scope type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Roles of this scope type.
    #[serde(default)]
    pub roles: Vec<RoleSpec>,
}

/// One role in a [`ScopeSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    /// Role name.
    pub name: String,
    /// Permission patterns granted.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Roles this role may assign.
    #[serde(default)]
    pub can_assign: Vec<String>,
}

impl RegistryConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Registry {
    /// Build a registry from a declarative configuration.
    ///
    /// # Errors
    ///
    /// The same declaration errors as [`RegistryBuilder::build`].
    pub fn from_config(config: &RegistryConfig) -> AuthzResult<Registry> {
        build_registry(&config.scopes)
    }
}

/// Build a registry from a list of scope specifications.
pub fn build_registry(specs: &[ScopeSpec]) -> AuthzResult<Registry> {
    let mut builder = RegistryBuilder::new();

    for spec in specs {
        let mut scope = builder.define_scope(spec.name.clone());
        if let Some(parent) = &spec.parent {
            scope = scope.parent_scope(parent.clone());
        }
        for role in &spec.roles {
            scope = scope
                .role(role.name.clone())
                .permissions(role.permissions.iter().cloned())
                .can_assign(role.can_assign.iter().cloned())
                .finish();
        }
    }

    builder.build()
}
