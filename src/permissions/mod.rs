/*!
 * Permissions Module
 * Object-level permissions for users and groups, stored as bitmasks
 *
 * Each target type registers an ordered vocabulary of permission names; the
 * k-th name is bit `1 << k`. Grants attach a mask to a (principal, object)
 * pair, and a user's effective permission is its own mask OR'ed with those of
 * its groups.
 *
 * ## Features
 * - Registry of per-type vocabularies with lock-free reads
 * - Codec between names, bit lists and masks
 * - Atomic grant / revoke / set per record
 * - Synchronous change listeners with bounded cascades
 * - Superuser and inactive-account short circuits
 *
 * ## Usage
 * ```ignore
 * use object_permissions::permissions::{Authorizable, PermissionManager, TargetRef, User};
 *
 * let manager = PermissionManager::new();
 * manager.register("doc", ["read", "write", "delete", "admin"])?;
 *
 * let alice = User::new(1).with_groups([10]);
 * let doc = TargetRef::new("doc", 42);
 *
 * alice.grant(&manager, &doc, ["read", "admin"])?;
 * assert!(manager.has_permission(&alice, &doc, "admin", false)?);
 * ```
 */

pub mod capability;
pub mod codec;
pub mod evaluation;
pub mod manager;
pub mod notify;
pub mod registry;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use capability::CapabilitySet;
pub use codec::{split_bits, FormattedMask, MaskFormat, PermissionSpec};
pub use manager::PermissionManager;
pub use notify::{cascade_depth, ChangeEvent, ChangeKind, ListenerFn, ListenerId, ListenerRegistry};
pub use registry::Registry;
pub use store::{Applied, GrantStore, MaskOp, MemoryGrantStore};
pub use types::{
    Account, Authorizable, GrantKey, GrantRecord, Group, ObjectList, ObjectSource, Principal,
    PrincipalKey, Target, TargetRef, User,
};
