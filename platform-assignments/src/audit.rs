//! Audit trail for role changes
//!
//! Every assignment or revocation that goes through the
//! [`RoleManager`](crate::RoleManager) produces an [`AuditEntry`] recording
//! who changed what, and the target user's effective permissions at the
//! scope before and after the change.

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use platform_rbac::{Scope, ScopeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
#[cfg(feature = "memory")]
use std::sync::Arc;
#[cfg(feature = "memory")]
use tokio::sync::RwLock;
use uuid::Uuid;

/// Kind of role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A role was granted
    RoleAssigned,
    /// A role was taken away
    RoleRevoked,
}

impl AuditAction {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::RoleAssigned => "role_assigned",
            AuditAction::RoleRevoked => "role_revoked",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded role change.
///
/// Permission snapshots are sorted pattern lists. `None` means the target
/// held no role at the scope at that moment (no access at all), which is
/// different from holding roles that grant nothing (`Some(vec![])`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// What happened
    pub action: AuditAction,

    /// Who made the change (None for system bootstrap grants)
    pub actor_id: Option<String>,

    /// Whose roles changed
    pub target_user_id: String,

    /// Role granted or revoked
    pub role: String,

    /// Scope type of the change
    pub scope_type: String,

    /// Scope instance of the change
    pub scope_id: ScopeId,

    /// Target's permission patterns before the change
    pub permissions_before: Option<Vec<String>>,

    /// Target's permission patterns after the change
    pub permissions_after: Option<Vec<String>>,

    /// When the change was recorded
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates a new audit entry with no actor and no snapshots.
    pub fn new(
        action: AuditAction,
        target_user_id: impl Into<String>,
        role: impl Into<String>,
        scope: &Scope,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            action,
            actor_id: None,
            target_user_id: target_user_id.into(),
            role: role.into(),
            scope_type: scope.scope_type.clone(),
            scope_id: scope.scope_id.clone(),
            permissions_before: None,
            permissions_after: None,
            recorded_at: Utc::now(),
        }
    }

    /// Set the acting user.
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Set the before/after permission snapshots.
    pub fn with_snapshots(
        mut self,
        before: Option<HashSet<String>>,
        after: Option<HashSet<String>>,
    ) -> Self {
        self.permissions_before = before.map(sorted);
        self.permissions_after = after.map(sorted);
        self
    }

    /// Scope of the change.
    pub fn scope(&self) -> Scope {
        Scope::new(self.scope_type.clone(), self.scope_id.clone())
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(self).map_err(|e| StoreError::Internal(e.to_string()))
    }
}

fn sorted(set: HashSet<String>) -> Vec<String> {
    let mut patterns: Vec<String> = set.into_iter().collect();
    patterns.sort();
    patterns
}

/// Destination for audit entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one entry.
    async fn record(&self, entry: AuditEntry) -> StoreResult<()>;
}

/// Audit sink that emits each entry as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: AuditEntry) -> StoreResult<()> {
        let payload = entry.to_json()?;
        tracing::info!(
            target: "platform_assignments::audit",
            action = %entry.action,
            actor_id = entry.actor_id.as_deref().unwrap_or("system"),
            target_user_id = %entry.target_user_id,
            role = %entry.role,
            scope = %entry.scope(),
            entry = %payload,
            "Role change recorded"
        );
        Ok(())
    }
}

/// In-memory audit log.
///
/// Keeps every entry in insertion order. Intended for tests and local
/// development.
#[cfg(feature = "memory")]
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

#[cfg(feature = "memory")]
impl MemoryAuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, oldest first.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }

    /// Entries whose target is `user_id`, oldest first.
    pub async fn entries_for_user(&self, user_id: &str) -> Vec<AuditEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.target_user_id == user_id)
            .cloned()
            .collect()
    }
}

#[cfg(feature = "memory")]
#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn record(&self, entry: AuditEntry) -> StoreResult<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }
}
