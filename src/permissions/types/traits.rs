/*!
 * Permission Traits
 * Adapter interfaces for principals, target objects and object lookup
 */

use super::core::{Principal, TargetRef};
use super::super::codec::{FormattedMask, MaskFormat, PermissionSpec};
use super::super::manager::PermissionManager;
use crate::core::types::{AuthzResult, GroupId, ObjectId, TargetType, UserId};
use std::collections::BTreeSet;

/// User account adapter
pub trait Account: Send + Sync {
    fn user_id(&self) -> UserId;

    /// Superusers pass every permission check
    fn is_superuser(&self) -> bool {
        false
    }

    /// Inactive accounts fail every permission check
    fn is_active(&self) -> bool {
        true
    }

    /// Groups this user belongs to, in evaluation order
    fn group_ids(&self) -> Vec<GroupId>;
}

/// Any domain entity permissions can be granted on
pub trait Target {
    fn target_type(&self) -> TargetType;

    fn object_id(&self) -> ObjectId;

    fn target_ref(&self) -> TargetRef {
        TargetRef::new(self.target_type(), self.object_id())
    }
}

/// Resolves object ids of one target type back into objects
pub trait ObjectSource {
    type Object;

    fn target_type(&self) -> TargetType;

    /// Load the objects whose id is in `ids`; unknown ids are skipped
    fn load(&self, ids: &BTreeSet<ObjectId>) -> Vec<Self::Object>;
}

/// In-memory object table for one target type
#[derive(Debug, Clone)]
pub struct ObjectList<T> {
    target_type: TargetType,
    objects: Vec<T>,
}

impl<T: Target + Clone> ObjectList<T> {
    pub fn new(target_type: impl Into<TargetType>, objects: Vec<T>) -> Self {
        Self {
            target_type: target_type.into(),
            objects,
        }
    }
}

impl<T: Target + Clone> ObjectSource for ObjectList<T> {
    type Object = T;

    fn target_type(&self) -> TargetType {
        self.target_type.clone()
    }

    fn load(&self, ids: &BTreeSet<ObjectId>) -> Vec<T> {
        self.objects
            .iter()
            .filter(|obj| ids.contains(&obj.object_id()))
            .cloned()
            .collect()
    }
}

/// Permission operations bound to a principal
///
/// Implemented for every [`Account`] and for [`Group`](super::core::Group),
/// so `user.grant(&manager, &doc, "read")` and `manager.grant(&user, ...)`
/// are interchangeable.
pub trait Authorizable {
    fn principal(&self) -> Principal<'_>;

    fn grant<T, P>(&self, manager: &PermissionManager, target: &T, perm: P) -> AuthzResult<()>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        manager.grant(self.principal(), target, perm).map(|_| ())
    }

    fn revoke<T, P>(&self, manager: &PermissionManager, target: &T, perm: P) -> AuthzResult<()>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        manager.revoke(self.principal(), target, perm).map(|_| ())
    }

    fn revoke_all<T>(&self, manager: &PermissionManager, target: &T) -> AuthzResult<bool>
    where
        T: Target + ?Sized,
    {
        manager.revoke_all(self.principal(), target)
    }

    fn set<T, P>(&self, manager: &PermissionManager, target: &T, perm: P) -> AuthzResult<()>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        manager.set(self.principal(), target, perm).map(|_| ())
    }

    fn has_permission<T, P>(
        &self,
        manager: &PermissionManager,
        target: &T,
        perm: P,
        require_all: bool,
    ) -> AuthzResult<bool>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        manager.has_permission(self.principal(), target, perm, require_all)
    }

    fn permissions_on<T>(
        &self,
        manager: &PermissionManager,
        target: &T,
        format: MaskFormat,
    ) -> AuthzResult<FormattedMask>
    where
        T: Target + ?Sized,
    {
        manager.effective_permission(self.principal(), target, format)
    }
}

impl<A: Account> Authorizable for A {
    fn principal(&self) -> Principal<'_> {
        Principal::User(self)
    }
}

impl Authorizable for super::core::Group {
    fn principal(&self) -> Principal<'_> {
        Principal::Group(self.id)
    }
}
