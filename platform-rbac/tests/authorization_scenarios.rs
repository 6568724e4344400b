//! End-to-end authorization scenarios.
//!
//! These tests exercise the public API the way an application does: declare
//! the catalog once, index a user's assignments per request, and ask the
//! checker questions.
//!
//! Scenarios:
//! 1. Organization roles with assignability
//! 2. Project roles with wildcard scope assignments
//! 3. Permission union across roles
//! 4. Unknown scopes and roles fail closed
//! 5. A frozen registry shared between threads

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use platform_rbac::permissions::{matches, matches_any};
use platform_rbac::{
    AuthzError, Checker, Registry, RegistryConfig, RoleAssignment, ScopeId, UserRoles,
};

/// Catalog used across scenarios, declared through JSON configuration.
const REGISTRY_JSON: &str = r#"{
    "scopes": [
        {
            "name": "organization",
            "roles": [
                { "name": "owner",  "permissions": ["*"], "can_assign": ["*"] },
                { "name": "admin",  "permissions": ["members.*", "projects.*"], "can_assign": ["member", "viewer"] },
                { "name": "member", "permissions": ["projects.read", "documents.*"] },
                { "name": "viewer", "permissions": ["projects.read"] }
            ]
        },
        {
            "name": "project",
            "parent": "organization",
            "roles": [
                { "name": "editor",   "permissions": ["files.*"] },
                { "name": "reviewer", "permissions": ["comments.*"] },
                { "name": "auditor",  "permissions": ["*.metadata.*"] }
            ]
        }
    ]
}"#;

fn registry() -> Registry {
    let config = RegistryConfig::from_json(REGISTRY_JSON).expect("valid registry json");
    Registry::from_config(&config).expect("valid registry")
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_round_trip_roles_at_scope() {
    let roles = UserRoles::new(
        "u",
        vec![
            RoleAssignment::new("u", "admin", "organization", "o1"),
            RoleAssignment::new("u", "member", "organization", "o1"),
        ],
    );

    let found: HashSet<String> = roles
        .get_roles("organization", "o1")
        .into_iter()
        .map(str::to_string)
        .collect();
    assert_eq!(found, set(&["admin", "member"]));
    assert!(!roles.has_role("viewer", "organization", "o1"));
}

#[test]
fn test_wildcard_scope_covers_unseen_ids() {
    let registry = registry();
    let roles = UserRoles::new(
        "u",
        vec![RoleAssignment::new("u", "editor", "project", ScopeId::Any)],
    );
    let checker = Checker::new(&roles, &registry);

    for project in ["p1", "p2", "created-after-login"] {
        assert!(roles.get_roles("project", project).contains(&"editor"));
        assert!(checker.has_permission("files.write", "project", project));
    }
    assert!(!checker.has_permission("files.write", "organization", "o1"));
}

#[test]
fn test_owner_and_admin_assignable_roles() {
    let registry = registry();

    let owner = UserRoles::new(
        "owner_user",
        vec![RoleAssignment::new("owner_user", "owner", "organization", "o1")],
    );
    assert_eq!(
        Checker::new(&owner, &registry).get_assignable_roles("organization", "o1"),
        Some(set(&["owner", "admin", "member", "viewer"]))
    );

    let admin = UserRoles::new(
        "admin_user",
        vec![RoleAssignment::new("admin_user", "admin", "organization", "o1")],
    );
    assert_eq!(
        Checker::new(&admin, &registry).get_assignable_roles("organization", "o1"),
        Some(set(&["member", "viewer"]))
    );
}

#[test]
fn test_owner_wildcard_does_not_reach_other_scope_types() {
    let registry = registry();
    let owner = UserRoles::new(
        "u",
        vec![RoleAssignment::new("u", "owner", "organization", "o1")],
    );
    let checker = Checker::new(&owner, &registry);

    assert!(!checker.can_assign_role("editor", "project", "p1"));
    assert_eq!(checker.get_assignable_roles("project", "p1"), None);
}

#[test]
fn test_permission_union_across_roles() {
    let registry = registry();
    let roles = UserRoles::new(
        "u",
        vec![
            RoleAssignment::new("u", "editor", "project", "p1"),
            RoleAssignment::new("u", "reviewer", "project", "p1"),
        ],
    );
    let checker = Checker::new(&roles, &registry);

    assert!(checker.has_permission("files.read", "project", "p1"));
    assert!(checker.has_permission("comments.create", "project", "p1"));
    assert!(!checker.has_permission("settings.write", "project", "p1"));
    assert_eq!(
        checker.get_permissions("project", "p1"),
        Some(set(&["files.*", "comments.*"]))
    );
}

#[test]
fn test_multi_wildcard_pattern() {
    let registry = registry();
    let roles = UserRoles::new(
        "u",
        vec![RoleAssignment::new("u", "auditor", "project", "p1")],
    );
    let checker = Checker::new(&roles, &registry);

    assert!(checker.has_permission("files.metadata.read", "project", "p1"));
    assert!(checker.has_permission("comments.metadata.export", "project", "p1"));
    assert!(!checker.has_permission("files.content.read", "project", "p1"));
    assert!(!checker.has_permission("files.metadata", "project", "p1"));
}

#[test]
fn test_undefined_scope_and_role_fail_closed() {
    let registry = registry();
    let roles = UserRoles::new(
        "u",
        vec![
            RoleAssignment::new("u", "admin", "organizaton", "o1"),
            RoleAssignment::new("u", "admn", "organization", "o1"),
        ],
    );
    let checker = Checker::new(&roles, &registry);

    assert_eq!(checker.get_permissions("undefinedScope", "x"), None);
    assert!(!checker.has_permission("members.invite", "organizaton", "o1"));
    assert!(!checker.has_permission("members.invite", "organization", "o1"));
    assert!(!checker.can_assign_role("member", "organization", "o1"));

    assert!(matches!(
        registry.validate_role("admin", "organizaton"),
        Err(AuthzError::InvalidScope(_))
    ));
    assert!(matches!(
        registry.validate_role("admn", "organization"),
        Err(AuthzError::InvalidRole { .. })
    ));
}

#[test]
fn test_vacuous_lists() {
    let registry = registry();
    let roles = UserRoles::new("u", Vec::new());
    let checker = Checker::new(&roles, &registry);

    assert!(checker.is_empty());
    assert!(checker.has_all_roles(&[], "organization", "o1"));
    assert!(!checker.has_any_role(&[], "organization", "o1"));
}

#[test]
fn test_matcher_law() {
    let cases = [
        ("*", "a.b.c", true),
        ("a.*", "a.b", true),
        ("a.*", "a.b.c", false),
        ("*.b", "a.b", true),
        ("a.b", "a.b", true),
        ("a.b", "a.c", false),
        ("a.*.c", "a.x.c", true),
        ("a.*.c", "a.x.d", false),
    ];

    for (pattern, permission, expected) in cases {
        assert_eq!(
            matches(pattern, permission),
            expected,
            "pattern {} vs permission {}",
            pattern,
            permission
        );
    }

    let none: Vec<String> = Vec::new();
    assert!(!matches_any(&none, "a.b"));
}

#[test]
fn test_registry_shared_between_threads() {
    let registry = Arc::new(registry());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let user_id = format!("user_{}", i);
                let project = format!("p{}", i);
                let roles = UserRoles::new(
                    user_id.clone(),
                    vec![RoleAssignment::new(user_id, "editor", "project", project.as_str())],
                );
                let checker = Checker::new(&roles, &registry);
                checker.has_permission("files.read", "project", &project)
                    && !checker.has_permission("files.read", "project", "other")
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().expect("thread panicked"));
    }
}
