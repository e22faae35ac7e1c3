/*!
 * Object Permissions Library
 * Bitmask-based object-level permissions for users and groups
 */

pub mod core;
pub mod monitoring;
pub mod permissions;

// Re-exports
pub use crate::core::{AuthzError, AuthzResult, Bitmask, EngineConfig, GroupId, ListenerFailurePolicy, ObjectId, RevokeMode, TargetType, UserId};
pub use monitoring::{init_tracing, EngineStats};
pub use permissions::{
    Account, Applied, Authorizable, CapabilitySet, ChangeEvent, ChangeKind, FormattedMask, GrantRecord,
    GrantStore, Group, MaskFormat, MemoryGrantStore, PermissionManager, PermissionSpec, Principal,
    PrincipalKey, Registry, Target, TargetRef, User,
};
