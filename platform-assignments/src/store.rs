//! Assignment storage
//!
//! This module provides the storage abstraction for role assignments and an
//! in-memory implementation for single-process deployments and tests.

#[cfg(feature = "memory")]
use crate::error::StoreError;
use crate::error::StoreResult;
use crate::record::AssignmentRecord;
use async_trait::async_trait;
use platform_rbac::Scope;
#[cfg(feature = "memory")]
use std::sync::Arc;
#[cfg(feature = "memory")]
use tokio::sync::RwLock;

/// Storage trait for role assignments.
///
/// Scopes are compared exactly: a record stored at `project:*` is only
/// returned by `list_for_scope(project:*)`, never by `list_for_scope(project:p1)`.
/// Wildcard expansion happens later, in [`platform_rbac::UserRoles`].
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Persist a new assignment.
    ///
    /// Fails with [`StoreError::Duplicate`](crate::StoreError::Duplicate) when the user already holds the
    /// role at exactly that scope.
    async fn create(&self, record: AssignmentRecord) -> StoreResult<AssignmentRecord>;

    /// Remove an assignment, returning the removed record.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound) when no such assignment exists.
    async fn delete(&self, user_id: &str, role: &str, scope: &Scope) -> StoreResult<AssignmentRecord>;

    /// All assignments held by a user.
    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<AssignmentRecord>>;

    /// All assignments stored at exactly `scope`.
    async fn list_for_scope(&self, scope: &Scope) -> StoreResult<Vec<AssignmentRecord>>;
}

/// In-memory assignment store.
///
/// This is suitable for single-process applications and testing.
#[cfg(feature = "memory")]
#[derive(Debug, Clone, Default)]
pub struct MemoryAssignmentStore {
    records: Arc<RwLock<Vec<AssignmentRecord>>>,
}

#[cfg(feature = "memory")]
impl MemoryAssignmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored assignments.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the store holds no assignments.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(feature = "memory")]
#[async_trait]
impl AssignmentStore for MemoryAssignmentStore {
    async fn create(&self, record: AssignmentRecord) -> StoreResult<AssignmentRecord> {
        let mut records = self.records.write().await;

        let assignment = &record.assignment;
        let scope = record.scope();
        if records
            .iter()
            .any(|r| r.is_for(&assignment.user_id, &assignment.role, &scope))
        {
            return Err(StoreError::Duplicate(format!(
                "{} already holds '{}' at {}",
                assignment.user_id, assignment.role, scope
            )));
        }

        tracing::debug!(
            record_id = %record.id,
            user_id = %assignment.user_id,
            role = %assignment.role,
            scope = %scope,
            "Stored role assignment"
        );
        records.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, user_id: &str, role: &str, scope: &Scope) -> StoreResult<AssignmentRecord> {
        let mut records = self.records.write().await;

        let position = records
            .iter()
            .position(|r| r.is_for(user_id, role, scope))
            .ok_or_else(|| {
                StoreError::NotFound(format!("{} does not hold '{}' at {}", user_id, role, scope))
            })?;

        let removed = records.remove(position);
        tracing::debug!(
            record_id = %removed.id,
            user_id = %user_id,
            role = %role,
            scope = %scope,
            "Removed role assignment"
        );
        Ok(removed)
    }

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<AssignmentRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.assignment.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_for_scope(&self, scope: &Scope) -> StoreResult<Vec<AssignmentRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| r.is_at(scope)).cloned().collect())
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use platform_rbac::{RoleAssignment, ScopeId};

    fn record(user: &str, role: &str, scope_type: &str, scope_id: &str) -> AssignmentRecord {
        AssignmentRecord::new(RoleAssignment::new(user, role, scope_type, scope_id))
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let store = MemoryAssignmentStore::new();
        store.create(record("u1", "admin", "org", "o1")).await.unwrap();
        store.create(record("u1", "viewer", "project", "*")).await.unwrap();
        store.create(record("u2", "member", "org", "o1")).await.unwrap();

        assert_eq!(store.len().await, 3);
        assert_eq!(store.list_for_user("u1").await.unwrap().len(), 2);
        assert_eq!(store.list_for_scope(&Scope::new("org", "o1")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let store = MemoryAssignmentStore::new();
        store.create(record("u1", "admin", "org", "o1")).await.unwrap();

        let err = store.create(record("u1", "admin", "org", "o1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        // Same role at a different scope is a separate assignment
        store.create(record("u1", "admin", "org", "o2")).await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = MemoryAssignmentStore::new();
        let err = store
            .delete("u1", "admin", &Scope::new("org", "o1"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_scope_listing_is_exact() {
        let store = MemoryAssignmentStore::new();
        store.create(record("u1", "viewer", "project", "*")).await.unwrap();
        store.create(record("u2", "editor", "project", "p1")).await.unwrap();

        let wildcard = store.list_for_scope(&Scope::any("project")).await.unwrap();
        assert_eq!(wildcard.len(), 1);
        assert_eq!(wildcard[0].assignment.scope_id, ScopeId::Any);

        let p1 = store.list_for_scope(&Scope::new("project", "p1")).await.unwrap();
        assert_eq!(p1.len(), 1);
        assert_eq!(p1[0].assignment.user_id, "u2");
    }

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let store = MemoryAssignmentStore::new();
        store.create(record("u1", "admin", "org", "o1")).await.unwrap();
        store.create(record("u1", "member", "org", "o1")).await.unwrap();

        let removed = store
            .delete("u1", "admin", &Scope::new("org", "o1"))
            .await
            .unwrap();
        assert_eq!(removed.assignment.role, "admin");

        let left = store.list_for_user("u1").await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].assignment.role, "member");
    }
}
