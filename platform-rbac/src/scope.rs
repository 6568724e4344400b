//! # Scopes
//!
//! A scope bounds a permission check: a scope *type* declared in the
//! registry (e.g. `organization`) plus the id of one instance of it
//! (e.g. `org_123`).
//!
//! The id `*` is reserved and means "every instance of this scope type".
//! Inside the crate it is always represented by [`ScopeId::Any`]; the
//! literal only appears when a scope id is serialized or parsed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Serialized form of [`ScopeId::Any`].
pub const ANY_SCOPE_ID: &str = "*";

/// Identifier of a scope instance.
///
/// # Example
///
/// ```
/// use platform_rbac::ScopeId;
///
/// assert_eq!(ScopeId::from("*"), ScopeId::Any);
/// assert_eq!(ScopeId::from("org_123"), ScopeId::Id("org_123".to_string()));
/// assert_eq!(ScopeId::Any.as_str(), "*");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScopeId {
    /// Every instance of the scope type.
    Any,
    /// One concrete instance.
    Id(String),
}

impl ScopeId {
    /// Get the string form used as an index key and on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            ScopeId::Any => ANY_SCOPE_ID,
            ScopeId::Id(id) => id,
        }
    }

    /// Check if this is the wildcard id.
    pub fn is_any(&self) -> bool {
        matches!(self, ScopeId::Any)
    }
}

impl From<String> for ScopeId {
    fn from(s: String) -> Self {
        if s == ANY_SCOPE_ID {
            ScopeId::Any
        } else {
            ScopeId::Id(s)
        }
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        ScopeId::from(s.to_string())
    }
}

impl From<ScopeId> for String {
    fn from(id: ScopeId) -> Self {
        match id {
            ScopeId::Any => ANY_SCOPE_ID.to_string(),
            ScopeId::Id(id) => id,
        }
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(scope type, scope id)` pair.
///
/// # Example
///
/// ```
/// use platform_rbac::Scope;
///
/// let scope = Scope::new("organization", "org_123");
/// assert_eq!(scope.to_string(), "organization:org_123");
///
/// let every_project = Scope::any("project");
/// assert!(every_project.scope_id.is_any());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Scope type name as declared in the registry.
    pub scope_type: String,
    /// Instance id, or [`ScopeId::Any`].
    pub scope_id: ScopeId,
}

impl Scope {
    /// Create a scope for a concrete instance (or `*`).
    pub fn new(scope_type: impl Into<String>, scope_id: impl Into<ScopeId>) -> Self {
        Self {
            scope_type: scope_type.into(),
            scope_id: scope_id.into(),
        }
    }

    /// Create the wildcard scope covering every instance of `scope_type`.
    pub fn any(scope_type: impl Into<String>) -> Self {
        Self {
            scope_type: scope_type.into(),
            scope_id: ScopeId::Any,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope_type, self.scope_id)
    }
}
