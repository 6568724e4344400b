//! Assignment records
//!
//! This module provides the stored form of a role assignment: the
//! assignment itself plus the bookkeeping the store keeps about it (id,
//! who granted it, when).

use chrono::{DateTime, Utc};
use platform_rbac::{RoleAssignment, Scope};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted role assignment.
///
/// # Examples
///
/// ```
/// use platform_assignments::AssignmentRecord;
/// use platform_rbac::RoleAssignment;
///
/// let record = AssignmentRecord::new(RoleAssignment::new("u1", "member", "organization", "org_1"))
///     .with_granter("admin_1");
/// assert_eq!(record.granted_by.as_deref(), Some("admin_1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Unique record ID
    pub id: Uuid,

    /// The assignment fact
    #[serde(flatten)]
    pub assignment: RoleAssignment,

    /// Who granted the role (None for system grants)
    pub granted_by: Option<String>,

    /// When the role was granted
    pub created_at: DateTime<Utc>,
}

impl AssignmentRecord {
    /// Creates a new record.
    ///
    /// The record is created with:
    /// - A newly generated UUID v7 ID
    /// - Current timestamp for created_at
    /// - No granter
    ///
    /// # Arguments
    ///
    /// * `assignment` - The role assignment to store
    pub fn new(assignment: RoleAssignment) -> Self {
        Self {
            id: Uuid::now_v7(),
            assignment,
            granted_by: None,
            created_at: Utc::now(),
        }
    }

    /// Set who granted this role.
    ///
    /// # Arguments
    ///
    /// * `granter_id` - The user ID of who granted the role
    pub fn with_granter(mut self, granter_id: impl Into<String>) -> Self {
        self.granted_by = Some(granter_id.into());
        self
    }

    /// The scope of the stored assignment.
    pub fn scope(&self) -> Scope {
        self.assignment.scope()
    }

    /// Check if this record stores `role` for `user_id` at exactly `scope`.
    pub fn is_for(&self, user_id: &str, role: &str, scope: &Scope) -> bool {
        self.assignment.user_id == user_id
            && self.assignment.role == role
            && self.is_at(scope)
    }

    /// Check if this record sits at exactly `scope` (no wildcard expansion).
    pub fn is_at(&self, scope: &Scope) -> bool {
        self.assignment.scope_type == scope.scope_type && self.assignment.scope_id == scope.scope_id
    }
}
