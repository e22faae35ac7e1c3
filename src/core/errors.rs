/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum AuthzError {
    #[error("Unknown permission for '{target_type}': {permission}")]
    #[diagnostic(
        code(authz::unknown_permission),
        help("Use one of the names registered for this target type, or bits inside its mask.")
    )]
    UnknownPermission {
        target_type: String,
        permission: String,
    },

    #[error("Target type '{0}' is not registered")]
    #[diagnostic(
        code(authz::not_registered),
        help("Register the type with its permission names during startup.")
    )]
    NotRegistered(String),

    #[error("Target type '{0}' is already registered")]
    #[diagnostic(
        code(authz::already_registered),
        help("Use the idempotent `register` when repeated registration is expected.")
    )]
    AlreadyRegistered(String),

    #[error("Registry is frozen, cannot register '{0}'")]
    #[diagnostic(
        code(authz::registry_frozen),
        help("All target types must be registered before the registry is frozen.")
    )]
    RegistryFrozen(String),

    #[error("Too many permissions for '{target_type}': {count} (max {max})")]
    #[diagnostic(
        code(authz::too_many_permissions),
        help("Split the vocabulary across target types or merge related permissions.")
    )]
    TooManyPermissions {
        target_type: String,
        count: usize,
        max: usize,
    },

    #[error("Duplicate permission '{permission}' for '{target_type}'")]
    #[diagnostic(code(authz::duplicate_permission))]
    DuplicatePermission {
        target_type: String,
        permission: String,
    },

    #[error("Invalid permission name: {0:?}")]
    #[diagnostic(
        code(authz::invalid_permission_name),
        help("Permission names must be non-empty and at most 64 bytes.")
    )]
    InvalidPermissionName(String),

    #[error("Unknown mask format: {0}")]
    #[diagnostic(
        code(authz::invalid_format),
        help("Use one of: int, string_list, int_list, choices.")
    )]
    InvalidFormat(String),

    #[error("Cascade depth {depth} exceeds limit {max}")]
    #[diagnostic(
        code(authz::cascade_depth_exceeded),
        help("A change listener keeps triggering further mutations. Check for cycles between listeners.")
    )]
    CascadeDepthExceeded { depth: usize, max: usize },

    #[error("Change listener {listener} failed: {reason}")]
    #[diagnostic(
        code(authz::listener_failed),
        help("The grant store mutation was kept; only the notification failed.")
    )]
    ListenerFailed { listener: u64, reason: String },

    #[error("Grant store error: {0}")]
    #[diagnostic(code(authz::store))]
    Store(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(authz::config))]
    Config(String),
}

impl AuthzError {
    pub(crate) fn unknown(target_type: impl ToString, permission: impl ToString) -> Self {
        AuthzError::UnknownPermission {
            target_type: target_type.to_string(),
            permission: permission.to_string(),
        }
    }
}

impl From<serde_json::Error> for AuthzError {
    fn from(err: serde_json::Error) -> Self {
        AuthzError::Store(err.to_string())
    }
}

impl From<std::io::Error> for AuthzError {
    fn from(err: std::io::Error) -> Self {
        AuthzError::Store(err.to_string())
    }
}
