//! # Permissions
//!
//! Permission strings and the wildcard matcher used by role grants.
//!
//! A permission is a dot-separated list of segments, for example
//! `document.read` or `project.settings.update`. Roles grant permission
//! *patterns*, which may use `*` as a whole segment to stand in for exactly
//! one segment of the requested permission:
//!
//! ```text
//! Pattern               Permission                Match
//! *                     anything.at.all           yes
//! document.*            document.read             yes
//! document.*            document.read.draft       no  (segment count differs)
//! *.metadata.*          file.metadata.read        yes
//! ```

use crate::error::{AuthzError, AuthzResult};

/// Segment wildcard, and on its own the pattern that matches every permission.
pub const WILDCARD: &str = "*";

/// Separator between permission segments.
pub const SEPARATOR: char = '.';

/// Check if a permission pattern covers a requested permission.
///
/// The single-segment pattern `*` matches every permission. Any other pattern
/// must have the same number of segments as the permission; each `*` segment
/// matches any one segment and every other segment must be equal
/// (case-sensitive).
///
/// # Arguments
///
/// * `pattern` - The granted pattern, as declared on a role
/// * `permission` - The permission being requested
///
/// # Returns
///
/// `true` if the pattern covers the permission, `false` otherwise
///
/// # Example
///
/// ```
/// use platform_rbac::permissions::matches;
///
/// assert!(matches("files.*", "files.read"));
/// assert!(matches("*", "settings.billing.update"));
/// assert!(!matches("files.*", "files.read.all"));
/// assert!(!matches("Files.read", "files.read"));
/// ```
pub fn matches(pattern: &str, permission: &str) -> bool {
    if pattern == WILDCARD {
        return true;
    }

    let mut pattern_parts = pattern.split(SEPARATOR);
    let mut permission_parts = permission.split(SEPARATOR);

    loop {
        match (pattern_parts.next(), permission_parts.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                if expected != WILDCARD && expected != actual {
                    return false;
                }
            }
            // Segment counts differ
            _ => return false,
        }
    }
}

/// Check if any of the given patterns covers the requested permission.
///
/// Returns `false` for an empty pattern list.
///
/// # Example
///
/// ```
/// use platform_rbac::permissions::matches_any;
///
/// let granted = vec!["files.*".to_string(), "comments.create".to_string()];
/// assert!(matches_any(&granted, "comments.create"));
/// assert!(!matches_any(&granted, "settings.write"));
/// assert!(!matches_any(Vec::<String>::new(), "files.read"));
/// ```
pub fn matches_any<I, S>(patterns: I, permission: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .any(|pattern| matches(pattern.as_ref(), permission))
}

/// Validate the structure of a permission or permission pattern.
///
/// A valid string is either the bare wildcard `*`, or two or more non-empty
/// segments separated by dots, where each segment is `*` or consists only of
/// ASCII letters, digits and underscores.
///
/// # Errors
///
/// Returns [`AuthzError::InvalidPermission`] describing the first problem.
///
/// # Example
///
/// ```
/// use platform_rbac::permissions::validate;
///
/// assert!(validate("document.read").is_ok());
/// assert!(validate("*.metadata.*").is_ok());
/// assert!(validate("*").is_ok());
/// assert!(validate("document").is_err());
/// assert!(validate("document..read").is_err());
/// assert!(validate("document.re-ad").is_err());
/// ```
pub fn validate(pattern: &str) -> AuthzResult<()> {
    if pattern.is_empty() {
        return Err(AuthzError::invalid_permission(pattern, "must not be empty"));
    }

    if pattern == WILDCARD {
        return Ok(());
    }

    if !pattern.contains(SEPARATOR) {
        return Err(AuthzError::invalid_permission(
            pattern,
            "must contain at least two dot-separated segments",
        ));
    }

    for segment in pattern.split(SEPARATOR) {
        if segment.is_empty() {
            return Err(AuthzError::invalid_permission(pattern, "empty segment"));
        }
        if segment == WILDCARD {
            continue;
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AuthzError::invalid_permission(
                pattern,
                format!("segment '{}' contains invalid characters", segment),
            ));
        }
    }

    Ok(())
}

/// Check if a permission or pattern is structurally valid.
pub fn is_valid(pattern: &str) -> bool {
    validate(pattern).is_ok()
}
