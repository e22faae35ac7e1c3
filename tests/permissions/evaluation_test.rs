/*!
 * Evaluation Tests
 * Checks, effective permissions and object queries across users and groups
 */

use object_permissions::permissions::{
    Account, Authorizable, Group, MaskFormat, ObjectList, PermissionManager, Target, TargetRef, User,
};
use object_permissions::{AuthzError, GroupId, ObjectId, TargetType, UserId};
use pretty_assertions::assert_eq;

/// Domain entity implementing `Target` directly
#[derive(Debug, Clone, PartialEq)]
struct Document {
    id: ObjectId,
    title: String,
}

impl Target for Document {
    fn target_type(&self) -> TargetType {
        TargetType::new("doc")
    }

    fn object_id(&self) -> ObjectId {
        self.id
    }
}

/// Application account with its own storage of group memberships
struct StaffAccount {
    id: UserId,
    teams: Vec<GroupId>,
    disabled: bool,
}

impl Account for StaffAccount {
    fn user_id(&self) -> UserId {
        self.id
    }

    fn is_active(&self) -> bool {
        !self.disabled
    }

    fn group_ids(&self) -> Vec<GroupId> {
        self.teams.clone()
    }
}

fn setup() -> PermissionManager {
    let manager = PermissionManager::new();
    manager.register("doc", ["read", "write", "delete", "admin"]).unwrap();
    manager
}

fn doc(id: ObjectId) -> Document {
    Document {
        id,
        title: format!("doc-{}", id),
    }
}

#[test]
fn test_read_admin_scenario() {
    let manager = setup();
    let user = User::new(1);
    let d = doc(1);
    manager.grant(&user, &d, ["read", "admin"]).unwrap();

    assert_eq!(manager.effective_mask(&user, &d).unwrap(), 9);
    assert!(manager.has_permission(&user, &d, "read", false).unwrap());
    assert!(manager.has_permission(&user, &d, ["read", "admin"], true).unwrap());
    assert!(!manager.has_permission(&user, &d, ["read", "write"], true).unwrap());
    assert!(manager.has_permission(&user, &d, ["read", "write"], false).unwrap());
    assert!(!manager.has_permission(&user, &d, "delete", false).unwrap());
}

#[test]
fn test_group_grant_reaches_member() {
    let manager = setup();
    let member = User::new(1).with_groups([7]);
    let outsider = User::new(2);
    let d = doc(1);
    manager.grant(&Group::new(7), &d, "write").unwrap();

    assert!(manager.has_permission(&member, &d, "write", false).unwrap());
    assert!(!manager.has_permission(&outsider, &d, "write", false).unwrap());
    assert_eq!(
        manager
            .effective_permission(&member, &d, MaskFormat::StringList)
            .unwrap()
            .into_string_list()
            .unwrap(),
        vec!["write"]
    );
}

#[test]
fn test_direct_revoke_keeps_group_grant() {
    let manager = setup();
    let member = User::new(1).with_groups([7]);
    let d = doc(1);
    manager.grant(&Group::new(7), &d, "write").unwrap();
    manager.grant(&member, &d, ["read", "write"]).unwrap();

    manager.revoke(&member, &d, "write").unwrap();
    let direct: Vec<_> = manager.user_grants(&d).unwrap().iter().map(|r| r.mask).collect();
    assert_eq!(direct, vec![1]);
    assert_eq!(manager.effective_mask(&member, &d).unwrap(), 3);
    assert!(manager.has_permission(&member, &d, "write", false).unwrap());
    assert!(manager.has_permission(&member, &d, ["read", "write"], true).unwrap());
}

#[test]
fn test_membership_changes_take_effect() {
    let manager = setup();
    let mut user = User::new(1);
    let d = doc(1);
    manager.grant(&Group::new(3), &d, "delete").unwrap();

    assert!(!manager.has_permission(&user, &d, "delete", false).unwrap());
    user.join(3);
    assert!(manager.has_permission(&user, &d, "delete", false).unwrap());
    user.leave(3);
    assert!(!manager.has_permission(&user, &d, "delete", false).unwrap());
}

#[test]
fn test_custom_account() {
    let manager = setup();
    let d = doc(1);
    manager.grant(&Group::new(20), &d, "admin").unwrap();

    let staff = StaffAccount {
        id: 5,
        teams: vec![10, 20],
        disabled: false,
    };
    assert!(manager.has_permission(&staff, &d, "admin", false).unwrap());

    let disabled = StaffAccount {
        disabled: true,
        ..staff
    };
    assert!(!manager.has_permission(&disabled, &d, "admin", false).unwrap());
}

#[test]
fn test_custom_account_methods() {
    let manager = setup();
    let d = doc(1);
    let staff = StaffAccount {
        id: 5,
        teams: vec![],
        disabled: false,
    };

    staff.grant(&manager, &d, ["read", "write"]).unwrap();
    assert!(staff.has_permission(&manager, &d, "write", false).unwrap());
    assert_eq!(manager.effective_mask(&User::new(5), &d).unwrap(), 3);

    staff.revoke(&manager, &d, "write").unwrap();
    assert_eq!(
        staff
            .permissions_on(&manager, &d, MaskFormat::StringList)
            .unwrap()
            .into_string_list()
            .unwrap(),
        vec!["read"]
    );

    staff.set(&manager, &d, "admin").unwrap();
    assert!(!staff.has_permission(&manager, &d, "read", false).unwrap());
    assert!(staff.revoke_all(&manager, &d).unwrap());
    assert_eq!(manager.effective_mask(&staff, &d).unwrap(), 0);
}

#[test]
fn test_superuser_without_grants() {
    let manager = setup();
    let root = User::new(0).superuser();
    assert!(manager.has_permission(&root, &doc(1), ["read", "write", "delete", "admin"], true).unwrap());
    // Superuser status does not invent grants
    assert_eq!(manager.effective_mask(&root, &doc(1)).unwrap(), 0);
}

#[test]
fn test_unregistered_type() {
    let manager = setup();
    let note = TargetRef::new("note", 1);
    assert!(matches!(
        manager.has_permission(&User::new(1), &note, "read", false),
        Err(AuthzError::NotRegistered(_))
    ));
    assert!(matches!(
        manager.object_ids_with_permission(&User::new(1), "note", "read"),
        Err(AuthzError::NotRegistered(_))
    ));
}

#[test]
fn test_objects_with_permission() {
    let manager = setup();
    let user = User::new(1).with_groups([2]);
    let docs: Vec<Document> = (1..=5).map(doc).collect();

    manager.grant(&user, &docs[0], "read").unwrap();
    manager.grant(&Group::new(2), &docs[2], "write").unwrap();
    manager.grant(&user, &docs[4], "admin").unwrap();
    manager.grant(&User::new(9), &docs[1], "read").unwrap();

    let source = ObjectList::new("doc", docs.clone());
    let found = manager
        .objects_with_permission(&user, &source, ["read", "write"])
        .unwrap();
    let titles: Vec<&str> = found.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["doc-1", "doc-3"]);

    // Groups only see their own records
    let group_ids = manager
        .object_ids_with_permission(&Group::new(2), "doc", "write")
        .unwrap();
    assert_eq!(group_ids.into_iter().collect::<Vec<_>>(), vec![3]);
}

#[test]
fn test_holders_of_object() {
    let manager = setup();
    let d = doc(1);
    manager.grant(&User::new(1), &d, ["read", "write"]).unwrap();
    manager.grant(&User::new(2), &d, "read").unwrap();
    manager.grant(&Group::new(5), &d, ["read", "write"]).unwrap();

    assert_eq!(manager.users_with_permission(&d, ["read", "write"]).unwrap(), vec![1]);
    assert_eq!(manager.groups_with_permission(&d, "write").unwrap(), vec![5]);
    assert_eq!(manager.user_grants(&d).unwrap().len(), 2);
}
