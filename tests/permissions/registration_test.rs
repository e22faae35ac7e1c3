/*!
 * Registration Tests
 * Vocabulary registration, codec conversions and the registration facade
 */

use object_permissions::core::limits::MAX_PERMISSIONS_PER_TYPE;
use object_permissions::permissions::{
    Authorizable, MaskFormat, PermissionManager, Registry, TargetRef, User,
};
use object_permissions::{AuthzError, TargetType};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::Arc;

const DOC_PERMS: [&str; 4] = ["read", "write", "delete", "admin"];

#[test]
fn test_bits_follow_registration_order() {
    let manager = PermissionManager::new();
    let caps = manager.register("doc", DOC_PERMS).unwrap();

    assert_eq!(caps.values(), vec![1, 2, 4, 8]);
    assert_eq!(caps.full_mask(), 15);
    assert_eq!(caps.as_int(["read", "admin"]).unwrap(), 9);
    assert_eq!(caps.as_string_list(9), vec!["read", "admin"]);
    assert_eq!(caps.as_int_list(9), vec![1, 8]);
    assert_eq!(
        caps.as_choices(9),
        vec![(1, "read".to_string()), (8, "admin".to_string())]
    );
}

#[test]
fn test_string_list_ignores_foreign_bits() {
    let manager = PermissionManager::new();
    let caps = manager.register("doc", DOC_PERMS).unwrap();
    assert_eq!(caps.as_string_list(0b1_0000_0001), vec!["read"]);
}

#[test]
fn test_foreign_integer_bits_rejected() {
    let manager = PermissionManager::new();
    let caps = manager.register("doc", DOC_PERMS).unwrap();
    assert!(matches!(
        caps.as_int(16u32),
        Err(AuthzError::UnknownPermission { .. })
    ));
}

#[test]
fn test_registration_is_idempotent() {
    let manager = PermissionManager::new();
    let first = manager.register("doc", DOC_PERMS).unwrap();
    let second = manager.register("doc", ["publish"]).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.bit("publish"), None);
}

#[test]
fn test_vocabulary_limit() {
    let manager = PermissionManager::new();
    let names: Vec<String> = (0..MAX_PERMISSIONS_PER_TYPE).map(|i| format!("p{}", i)).collect();
    let caps = manager.register("wide", names).unwrap();
    assert_eq!(caps.full_mask(), (1u32 << MAX_PERMISSIONS_PER_TYPE) - 1);

    let too_many: Vec<String> = (0..=MAX_PERMISSIONS_PER_TYPE).map(|i| format!("p{}", i)).collect();
    assert!(matches!(
        manager.register("wider", too_many),
        Err(AuthzError::TooManyPermissions { .. })
    ));
}

#[test]
fn test_invalid_names_rejected() {
    let manager = PermissionManager::new();
    assert!(matches!(
        manager.register("doc", ["read", ""]),
        Err(AuthzError::InvalidPermissionName(_))
    ));
    assert!(matches!(
        manager.register("doc", ["read", "read"]),
        Err(AuthzError::DuplicatePermission { .. })
    ));
    assert!(!manager.registry().is_registered(&TargetType::new("doc")));
}

#[test]
fn test_frozen_registry() {
    let manager = PermissionManager::new();
    manager.register("doc", DOC_PERMS).unwrap();
    manager.freeze_registry();

    assert!(manager.register("doc", DOC_PERMS).is_ok());
    assert!(matches!(
        manager.register("note", ["read"]),
        Err(AuthzError::RegistryFrozen(_))
    ));
}

#[test]
#[serial]
fn test_global_registry_shared() {
    let first = PermissionManager::global();
    let second = PermissionManager::global();
    first.register("global_doc", DOC_PERMS).unwrap();

    assert!(Arc::ptr_eq(first.registry(), second.registry()));
    assert!(Registry::global().is_registered(&TargetType::new("global_doc")));
}

#[test]
fn test_authorizable_facade() {
    let manager = PermissionManager::new();
    manager.register("doc", DOC_PERMS).unwrap();
    let user = User::new(1);
    let doc = TargetRef::new("doc", 3);

    user.grant(&manager, &doc, ["read", "admin"]).unwrap();
    assert!(user.has_permission(&manager, &doc, "admin", false).unwrap());

    let names = user
        .permissions_on(&manager, &doc, "string_list".parse::<MaskFormat>().unwrap())
        .unwrap()
        .into_string_list()
        .unwrap();
    assert_eq!(names, vec!["read", "admin"]);

    user.revoke(&manager, &doc, "admin").unwrap();
    user.set(&manager, &doc, ["write", "delete"]).unwrap();
    assert_eq!(manager.effective_mask(&user, &doc).unwrap(), 6);

    assert!(user.revoke_all(&manager, &doc).unwrap());
    assert_eq!(manager.effective_mask(&user, &doc).unwrap(), 0);
}

#[test]
fn test_unknown_format_name() {
    assert!(matches!(
        "xml".parse::<MaskFormat>(),
        Err(AuthzError::InvalidFormat(_))
    ));
}
