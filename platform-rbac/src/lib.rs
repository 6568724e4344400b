//! # Platform RBAC (Role-Based Access Control)
//!
//! This crate provides the scoped authorization engine for the Relay
//! platform, shared across Verity, NoteMan, and ShipCheck applications.
//!
//! ## Overview
//!
//! The platform-rbac crate handles:
//! - **Registry**: Scope types, their roles, permission grants and which roles may assign which
//! - **Permissions**: Dot-separated permission strings and wildcard pattern matching
//! - **User Roles**: One user's role assignments, indexed by scope
//! - **Checker**: Role, permission and assignability decisions for one user
//!
//! Everything here is synchronous, in-memory and side-effect free. Loading
//! assignments, persisting changes and writing audit records belong to
//! `platform-assignments`.
//!
//! ## Architecture
//!
//! ```text
//! Scope      = scope type + scope id       ("organization", "org_123")
//!                                          ("project", *)  -> every project
//! Role       = permission patterns + assignable roles, per scope type
//! Assignment = user + role + scope
//!
//! assignments ─→ UserRoles ─┐
//!                           ├─→ Checker ─→ bool / Option<HashSet<String>>
//! Registry (frozen) ────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use platform_rbac::{Checker, Registry, RoleAssignment, ScopeId, UserRoles};
//!
//! // Declare the catalog once at startup
//! let mut builder = Registry::builder();
//! builder
//!     .define_scope("organization")
//!     .role("owner").permissions(["*"]).can_assign(["*"])
//!     .role("admin").permissions(["members.*", "projects.*"]).can_assign(["member"])
//!     .role("member").permissions(["projects.read"])
//!     .define_scope("project")
//!     .parent_scope("organization")
//!     .role("editor").permissions(["files.*"]);
//! let registry = builder.build().unwrap();
//!
//! // Index a user's assignments per request
//! let roles = UserRoles::new("user_1", vec![
//!     RoleAssignment::new("user_1", "admin", "organization", "org_1"),
//!     RoleAssignment::new("user_1", "editor", "project", ScopeId::Any),
//! ]);
//!
//! let checker = Checker::new(&roles, &registry);
//! assert!(checker.has_permission("members.invite", "organization", "org_1"));
//! assert!(checker.has_permission("files.upload", "project", "any_project"));
//! assert!(!checker.has_permission("files.upload", "organization", "org_1"));
//! assert!(checker.can_assign_role("member", "organization", "org_1"));
//! ```
//!
//! ## Fail-closed behavior
//!
//! Checker queries never return errors. A typo in a scope type or role name
//! always yields "no access". Only [`Registry::validate_scope`],
//! [`Registry::validate_role`] and declaration-time pattern validation
//! produce [`AuthzError`]s.
//!
//! ## Integration with platform-assignments
//!
//! - The assignment workflow validates roles against the [`Registry`] before persisting
//! - It builds [`UserRoles`] from stored records for each decision
//! - It snapshots [`Checker::get_permissions`] around mutations for the audit trail

pub mod assignment;
pub mod builder;
pub mod checker;
pub mod error;
pub mod permissions;
pub mod registry;
pub mod scope;
pub mod user_roles;

// Re-export main types for convenience
pub use assignment::RoleAssignment;
pub use builder::{build_registry, RegistryBuilder, RegistryConfig, RoleBuilder, RoleSpec, ScopeBuilder, ScopeSpec};
pub use checker::{Checker, RoleLookup};
pub use error::{AuthzError, AuthzResult};
pub use registry::{Registry, RoleDefinition, ScopeDefinition};
pub use scope::{Scope, ScopeId, ANY_SCOPE_ID};
pub use user_roles::UserRoles;
