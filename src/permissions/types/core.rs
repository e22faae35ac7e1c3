/*!
 * Permission Types
 * Principals, target addressing and grant records
 */

use super::traits::{Account, Target};
use crate::core::types::{Bitmask, GroupId, ObjectId, TargetType, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage identity of a principal
///
/// Exactly one of user or group, so a record can never name both or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum PrincipalKey {
    User(UserId),
    Group(GroupId),
}

impl PrincipalKey {
    pub fn is_user(&self) -> bool {
        matches!(self, PrincipalKey::User(_))
    }

    pub fn is_group(&self) -> bool {
        matches!(self, PrincipalKey::Group(_))
    }
}

impl fmt::Display for PrincipalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKey::User(id) => write!(f, "user:{}", id),
            PrincipalKey::Group(id) => write!(f, "group:{}", id),
        }
    }
}

/// A principal as seen by the evaluation engine
///
/// Users carry their account flags and group memberships; groups carry only
/// their identity.
#[derive(Clone, Copy)]
pub enum Principal<'a> {
    User(&'a dyn Account),
    Group(GroupId),
}

impl<'a> Principal<'a> {
    pub fn key(&self) -> PrincipalKey {
        match self {
            Principal::User(account) => PrincipalKey::User(account.user_id()),
            Principal::Group(id) => PrincipalKey::Group(*id),
        }
    }
}

impl fmt::Debug for Principal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.key())
    }
}

impl<'a, A: Account> From<&'a A> for Principal<'a> {
    fn from(account: &'a A) -> Self {
        Principal::User(account)
    }
}

impl From<&Group> for Principal<'_> {
    fn from(group: &Group) -> Self {
        Principal::Group(group.id)
    }
}

/// Plain user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub is_superuser: bool,
    pub is_active: bool,
    pub groups: Vec<GroupId>,
}

impl User {
    /// Active, non-superuser account without groups
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            is_superuser: false,
            is_active: true,
            groups: Vec::new(),
        }
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.groups = groups.into_iter().collect();
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Add a group membership (no-op if already a member)
    pub fn join(&mut self, group: GroupId) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    pub fn leave(&mut self, group: GroupId) {
        self.groups.retain(|g| *g != group);
    }
}

impl Account for User {
    fn user_id(&self) -> UserId {
        self.id
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn group_ids(&self) -> Vec<GroupId> {
        self.groups.clone()
    }
}

/// Group of users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
}

impl Group {
    pub fn new(id: GroupId) -> Self {
        Self { id }
    }
}

/// Polymorphic address of a target object: (type, id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetRef {
    pub target_type: TargetType,
    pub object_id: ObjectId,
}

impl TargetRef {
    pub fn new(target_type: impl Into<TargetType>, object_id: ObjectId) -> Self {
        Self {
            target_type: target_type.into(),
            object_id,
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target_type, self.object_id)
    }
}

impl Target for TargetRef {
    fn target_type(&self) -> TargetType {
        self.target_type.clone()
    }

    fn object_id(&self) -> ObjectId {
        self.object_id
    }

    fn target_ref(&self) -> TargetRef {
        self.clone()
    }
}

/// Unique key of a grant record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrantKey {
    pub principal: PrincipalKey,
    pub target: TargetRef,
}

impl GrantKey {
    pub fn new(principal: PrincipalKey, target: TargetRef) -> Self {
        Self { principal, target }
    }
}

/// Permissions one principal holds on one target object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GrantRecord {
    pub principal: PrincipalKey,
    pub target: TargetRef,
    pub mask: Bitmask,
}

impl GrantRecord {
    pub fn new(principal: PrincipalKey, target: TargetRef, mask: Bitmask) -> Self {
        Self {
            principal,
            target,
            mask,
        }
    }

    pub fn key(&self) -> GrantKey {
        GrantKey::new(self.principal, self.target.clone())
    }

    /// True if the record holds at least one of `bits`
    #[inline]
    pub fn overlaps(&self, bits: Bitmask) -> bool {
        self.mask & bits != 0
    }

    /// True if the record holds every one of `bits`
    #[inline]
    pub fn contains(&self, bits: Bitmask) -> bool {
        self.mask & bits == bits
    }
}
