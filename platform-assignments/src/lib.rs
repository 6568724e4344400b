//! # Platform Role Assignments
//!
//! This crate provides role assignment storage and the assign/revoke
//! workflow for the Relay platform, on top of the `platform-rbac` engine.
//!
//! ## Overview
//!
//! The platform-assignments crate handles:
//! - **Records**: Persisted role assignments with granter and timestamp
//! - **Store**: The async storage seam and an in-memory implementation
//! - **Audit**: Role change entries with before/after permission snapshots
//! - **Manager**: Authorization-checked assign and revoke, with retries on transient store failures
//! - **Config**: Environment-driven workflow settings and file-based registry loading
//!
//! ## Architecture
//!
//! ```text
//! RoleManager
//!   ├─ Arc<Registry>      (platform-rbac, frozen at startup)
//!   ├─ AssignmentStore    ─→ AssignmentRecord ─→ UserRoles ─→ Checker
//!   └─ AuditSink          ─→ AuditEntry
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use platform_assignments::{registry_from_file, ManagerConfig, MemoryAssignmentStore, RoleManager, TracingAuditSink};
//! use platform_rbac::Scope;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(registry_from_file("rbac.json")?);
//!     let config = ManagerConfig::from_env();
//!     config.validate()?;
//!
//!     let manager = RoleManager::with_config(registry, MemoryAssignmentStore::new(), TracingAuditSink, config);
//!     let org = Scope::new("organization", "org_1");
//!
//!     manager.grant_unchecked("founder", "owner", &org).await?;
//!     manager.assign_role("founder", "user_2", "admin", &org).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `memory`: In-memory store and audit log (enabled by default)

pub mod audit;
pub mod config;
pub mod error;
pub mod manager;
pub mod record;
pub mod retry;
pub mod store;

// Re-export main types for convenience
#[cfg(feature = "memory")]
pub use audit::MemoryAuditLog;
pub use audit::{AuditAction, AuditEntry, AuditSink, TracingAuditSink};
pub use config::{registry_from_file, ConfigError, ManagerConfig};
pub use error::{ManagerError, ManagerResult, StoreError, StoreResult};
pub use manager::RoleManager;
pub use record::AssignmentRecord;
pub use retry::RetryConfig;
#[cfg(feature = "memory")]
pub use store::MemoryAssignmentStore;
pub use store::AssignmentStore;
