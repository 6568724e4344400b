//! Role assignment workflow
//!
//! [`RoleManager`] ties the authorization engine to storage: it loads a
//! user's assignments into [`UserRoles`], decides whether an actor may grant
//! or take away a role, persists the change, and records an audit entry with
//! the target's permissions before and after.

use crate::audit::{AuditAction, AuditEntry, AuditSink};
use crate::config::ManagerConfig;
use crate::error::{ManagerError, ManagerResult, StoreError};
use crate::record::AssignmentRecord;
use crate::retry::with_store_retry;
use crate::store::AssignmentStore;
use platform_rbac::{Checker, Registry, RoleAssignment, Scope, UserRoles};
use std::collections::HashSet;
use std::sync::Arc;

/// Role assignment workflow over a store and an audit sink.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use platform_assignments::{MemoryAssignmentStore, MemoryAuditLog, RoleManager};
/// use platform_rbac::{Registry, Scope};
///
/// # tokio_test_block(async {
/// let mut builder = Registry::builder();
/// builder
///     .define_scope("organization")
///     .role("owner").permissions(["*"]).can_assign(["*"])
///     .role("member").permissions(["projects.read"]);
/// let registry = Arc::new(builder.build().unwrap());
///
/// let manager = RoleManager::new(registry, MemoryAssignmentStore::new(), MemoryAuditLog::new());
/// let org = Scope::new("organization", "org_1");
///
/// manager.grant_unchecked("alice", "owner", &org).await.unwrap();
/// manager.assign_role("alice", "bob", "member", &org).await.unwrap();
///
/// assert!(manager.has_permission("bob", "projects.read", &org).await.unwrap());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
pub struct RoleManager<S, A> {
    registry: Arc<Registry>,
    store: S,
    audit: A,
    config: ManagerConfig,
}

impl<S, A> std::fmt::Debug for RoleManager<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleManager")
            .field("scope_types", &self.registry.scope_types())
            .field("config", &self.config)
            .finish()
    }
}

impl<S: AssignmentStore, A: AuditSink> RoleManager<S, A> {
    /// Create a manager with the default configuration.
    pub fn new(registry: Arc<Registry>, store: S, audit: A) -> Self {
        Self::with_config(registry, store, audit, ManagerConfig::default())
    }

    /// Create a manager with an explicit configuration.
    pub fn with_config(registry: Arc<Registry>, store: S, audit: A, config: ManagerConfig) -> Self {
        Self {
            registry,
            store,
            audit,
            config,
        }
    }

    /// The shared role catalog.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The assignment store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The audit sink.
    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// The active configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Load a user's assignments and index them.
    #[tracing::instrument(skip(self))]
    pub async fn load_user_roles(&self, user_id: &str) -> ManagerResult<UserRoles> {
        let records = with_store_retry(&self.config.retry, || self.store.list_for_user(user_id)).await?;

        tracing::debug!(count = records.len(), "Loaded role assignments");
        Ok(UserRoles::new(
            user_id,
            records.into_iter().map(|record| record.assignment),
        ))
    }

    /// Check if a user holds `permission` at `scope`.
    pub async fn has_permission(
        &self,
        user_id: &str,
        permission: &str,
        scope: &Scope,
    ) -> ManagerResult<bool> {
        let roles = self.load_user_roles(user_id).await?;
        Ok(Checker::new(&roles, &self.registry).has_permission(
            permission,
            &scope.scope_type,
            scope.scope_id.as_str(),
        ))
    }

    /// All assignments stored at exactly `scope`.
    pub async fn list_scope_members(&self, scope: &Scope) -> ManagerResult<Vec<AssignmentRecord>> {
        Ok(with_store_retry(&self.config.retry, || self.store.list_for_scope(scope)).await?)
    }

    /// Grant `role` at `scope` to `target_user_id` on behalf of `actor_id`.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::Authz`] if the role is not declared for the scope type
    /// - [`ManagerError::Forbidden`] if the actor's roles at the scope cannot assign it
    /// - [`ManagerError::Store`] if the target already holds it or storage fails
    #[tracing::instrument(skip(self))]
    pub async fn assign_role(
        &self,
        actor_id: &str,
        target_user_id: &str,
        role: &str,
        scope: &Scope,
    ) -> ManagerResult<AssignmentRecord> {
        self.registry.validate_role(role, &scope.scope_type)?;

        let actor = self.load_user_roles(actor_id).await?;
        if !Checker::new(&actor, &self.registry).can_assign_role(
            role,
            &scope.scope_type,
            scope.scope_id.as_str(),
        ) {
            tracing::debug!("Actor may not assign role");
            return Err(ManagerError::Forbidden {
                actor_id: actor_id.to_string(),
                action: "assign",
                role: role.to_string(),
                scope: scope.clone(),
            });
        }

        let record = AssignmentRecord::new(RoleAssignment::at(target_user_id, role, scope.clone()))
            .with_granter(actor_id);
        self.persist_grant(Some(actor_id), record).await
    }

    /// Grant a role without an authorization check.
    ///
    /// Used to seed the first owner of a scope, when nobody can yet assign
    /// anything there. The role must still be declared, and the change is
    /// audited with no actor.
    #[tracing::instrument(skip(self))]
    pub async fn grant_unchecked(
        &self,
        target_user_id: &str,
        role: &str,
        scope: &Scope,
    ) -> ManagerResult<AssignmentRecord> {
        self.registry.validate_role(role, &scope.scope_type)?;

        let record = AssignmentRecord::new(RoleAssignment::at(target_user_id, role, scope.clone()));
        self.persist_grant(None, record).await
    }

    /// Take `role` at `scope` away from `target_user_id` on behalf of `actor_id`.
    ///
    /// The target must hold the role through an assignment stored at exactly
    /// `scope`; a role held only through the `*` instance of the scope type
    /// cannot be revoked at a single instance. The actor must be able to
    /// assign the role at the scope.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::Authz`] if the role is not declared for the scope type
    /// - [`ManagerError::Store`] with [`StoreError::NotFound`] if no assignment is stored at `scope`
    /// - [`ManagerError::Forbidden`] if the actor's roles at the scope cannot assign it
    #[tracing::instrument(skip(self))]
    pub async fn revoke_role(
        &self,
        actor_id: &str,
        target_user_id: &str,
        role: &str,
        scope: &Scope,
    ) -> ManagerResult<AssignmentRecord> {
        self.registry.validate_role(role, &scope.scope_type)?;

        let stored = with_store_retry(&self.config.retry, || self.store.list_for_scope(scope)).await?;
        if !stored.iter().any(|r| r.is_for(target_user_id, role, scope)) {
            tracing::debug!("No assignment stored at this exact scope");
            return Err(StoreError::NotFound(format!(
                "{} does not hold '{}' at {}",
                target_user_id, role, scope
            ))
            .into());
        }

        let actor = self.load_user_roles(actor_id).await?;
        let target = self.load_user_roles(target_user_id).await?;

        let allowed = Checker::new(&actor, &self.registry)
            .with_lookup(&target)
            .can_revoke_role(target_user_id, role, &scope.scope_type, scope.scope_id.as_str());
        if !allowed {
            tracing::debug!("Actor may not revoke role");
            return Err(ManagerError::Forbidden {
                actor_id: actor_id.to_string(),
                action: "revoke",
                role: role.to_string(),
                scope: scope.clone(),
            });
        }

        let before = self.permissions_at(&target, scope);
        let removed = with_store_retry(&self.config.retry, || {
            self.store.delete(target_user_id, role, scope)
        })
        .await?;
        let after = self.snapshot(target_user_id, scope).await;

        tracing::info!(record_id = %removed.id, "Role revoked");

        let entry = AuditEntry::new(AuditAction::RoleRevoked, target_user_id, role, scope)
            .with_actor(actor_id)
            .with_snapshots(before, after);
        self.write_audit(entry).await;

        Ok(removed)
    }

    async fn persist_grant(
        &self,
        actor_id: Option<&str>,
        record: AssignmentRecord,
    ) -> ManagerResult<AssignmentRecord> {
        let target_user_id = record.assignment.user_id.clone();
        let scope = record.scope();

        let before = self.snapshot(&target_user_id, &scope).await;
        let created = with_store_retry(&self.config.retry, || self.store.create(record.clone())).await?;
        let after = self.snapshot(&target_user_id, &scope).await;

        tracing::info!(record_id = %created.id, "Role assigned");

        let mut entry = AuditEntry::new(
            AuditAction::RoleAssigned,
            target_user_id,
            created.assignment.role.clone(),
            &scope,
        )
        .with_snapshots(before, after);
        if let Some(actor_id) = actor_id {
            entry = entry.with_actor(actor_id);
        }
        self.write_audit(entry).await;

        Ok(created)
    }

    fn permissions_at(&self, roles: &UserRoles, scope: &Scope) -> Option<HashSet<String>> {
        Checker::new(roles, &self.registry).get_permissions(&scope.scope_type, scope.scope_id.as_str())
    }

    /// Current permissions of `user_id` at `scope`, for the audit trail.
    ///
    /// A failed load only degrades the snapshot; the mutation it surrounds
    /// has its own error path.
    async fn snapshot(&self, user_id: &str, scope: &Scope) -> Option<HashSet<String>> {
        match self.load_user_roles(user_id).await {
            Ok(roles) => self.permissions_at(&roles, scope),
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Failed to snapshot permissions");
                None
            }
        }
    }

    async fn write_audit(&self, entry: AuditEntry) {
        if !self.config.audit_enabled {
            return;
        }

        let entry_id = entry.id;
        if let Err(e) = self.audit.record(entry).await {
            // The change is already persisted
            tracing::error!(error = %e, entry_id = %entry_id, "Failed to write audit entry");
        }
    }
}
