/*!
 * Evaluation Engine
 * Permission checks and object queries for users and groups
 *
 * A user's effective permission on an object is its direct mask OR'ed with
 * the masks of every group it belongs to. Superusers pass every check and
 * inactive users fail every check, before any name resolution or lookup.
 */

use super::codec::{FormattedMask, MaskFormat, PermissionSpec};
use super::manager::PermissionManager;
use super::types::{GrantKey, ObjectSource, Principal, PrincipalKey, Target, TargetRef};
use crate::core::types::{AuthzResult, Bitmask, GroupId, ObjectId, TargetType, UserId};
use std::collections::BTreeSet;
use tracing::debug;

/// How requested bits are matched against a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Match {
    Any,
    All,
}

impl Match {
    #[inline]
    fn satisfied(self, mask: Bitmask, bits: Bitmask) -> bool {
        // An empty request is never satisfied
        if bits == 0 {
            return false;
        }
        match self {
            Match::Any => mask & bits != 0,
            Match::All => mask & bits == bits,
        }
    }
}

impl PermissionManager {
    /// Check `perm` for a principal on one object
    ///
    /// With `require_all` every requested bit must be held, otherwise any one
    /// of them suffices.
    pub fn has_permission<'a, T, P>(
        &self,
        principal: impl Into<Principal<'a>>,
        target: &T,
        perm: P,
        require_all: bool,
    ) -> AuthzResult<bool>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        let principal = principal.into();
        let matcher = if require_all { Match::All } else { Match::Any };

        if let Principal::User(account) = principal {
            if account.is_superuser() {
                debug!(user = account.user_id(), "Superuser bypass");
                self.stats.record_check(true);
                return Ok(true);
            }
            if !account.is_active() {
                debug!(user = account.user_id(), "Inactive user denied");
                self.stats.record_check(false);
                return Ok(false);
            }
        }

        let target = target.target_ref();
        let bits = self.registry.capabilities(&target.target_type)?.as_int(perm)?;
        let allowed = self.evaluate(principal, &target, bits, matcher);

        debug!(
            principal = %principal.key(),
            target = %target,
            bits,
            require_all,
            allowed,
            "Permission check"
        );
        self.stats.record_check(allowed);
        Ok(allowed)
    }

    /// True if any of the requested permissions is held
    pub fn has_any_permission<'a, T, P>(
        &self,
        principal: impl Into<Principal<'a>>,
        target: &T,
        perm: P,
    ) -> AuthzResult<bool>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        self.has_permission(principal, target, perm, false)
    }

    /// True if every requested permission is held
    pub fn has_all_permissions<'a, T, P>(
        &self,
        principal: impl Into<Principal<'a>>,
        target: &T,
        perm: P,
    ) -> AuthzResult<bool>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        self.has_permission(principal, target, perm, true)
    }

    /// Direct record first, then groups in membership order; stops as soon as
    /// the accumulated mask satisfies the request.
    fn evaluate(&self, principal: Principal<'_>, target: &TargetRef, bits: Bitmask, matcher: Match) -> bool {
        let mut mask = self.mask_of(principal.key(), target);
        if matcher.satisfied(mask, bits) {
            return true;
        }

        if let Principal::User(account) = principal {
            for group in account.group_ids() {
                mask |= self.mask_of(PrincipalKey::Group(group), target);
                if matcher.satisfied(mask, bits) {
                    return true;
                }
            }
        }
        false
    }

    #[inline]
    fn mask_of(&self, principal: PrincipalKey, target: &TargetRef) -> Bitmask {
        self.store
            .get(&GrantKey::new(principal, target.clone()))
            .map_or(0, |record| record.mask)
    }

    /// Effective bits a principal holds on one object
    pub fn effective_mask<'a, T>(&self, principal: impl Into<Principal<'a>>, target: &T) -> AuthzResult<Bitmask>
    where
        T: Target + ?Sized,
    {
        let principal = principal.into();
        let target = target.target_ref();
        self.registry.capabilities(&target.target_type)?;

        let mut mask = self.mask_of(principal.key(), &target);
        if let Principal::User(account) = principal {
            for group in account.group_ids() {
                mask |= self.mask_of(PrincipalKey::Group(group), &target);
            }
        }
        Ok(mask)
    }

    /// Effective permission rendered in `format`; no grants renders empty
    pub fn effective_permission<'a, T>(
        &self,
        principal: impl Into<Principal<'a>>,
        target: &T,
        format: MaskFormat,
    ) -> AuthzResult<FormattedMask>
    where
        T: Target + ?Sized,
    {
        let principal = principal.into();
        let target = target.target_ref();
        let capabilities = self.registry.capabilities(&target.target_type)?;
        let mask = self.effective_mask(principal, &target)?;
        Ok(capabilities.format(mask, format))
    }

    /// Ids of objects of `target_type` where the principal holds any of `perm`
    ///
    /// For users the direct records and those of all their groups are merged.
    pub fn object_ids_with_permission<'a, P>(
        &self,
        principal: impl Into<Principal<'a>>,
        target_type: impl Into<TargetType>,
        perm: P,
    ) -> AuthzResult<BTreeSet<ObjectId>>
    where
        P: Into<PermissionSpec>,
    {
        let principal = principal.into();
        let target_type = target_type.into();
        let bits = self.registry.capabilities(&target_type)?.as_int(perm)?;
        if bits == 0 {
            return Ok(BTreeSet::new());
        }

        let mut principals = vec![principal.key()];
        if let Principal::User(account) = principal {
            principals.extend(account.group_ids().into_iter().map(PrincipalKey::Group));
        }

        let ids: BTreeSet<ObjectId> = self
            .store
            .overlapping(&target_type, &principals, bits)
            .into_iter()
            .map(|record| record.target.object_id)
            .collect();

        debug!(
            principal = %principal.key(),
            target_type = %target_type,
            bits,
            matches = ids.len(),
            "Object query"
        );
        Ok(ids)
    }

    /// Objects from `source` where the principal holds any of `perm`
    pub fn objects_with_permission<'a, S, P>(
        &self,
        principal: impl Into<Principal<'a>>,
        source: &S,
        perm: P,
    ) -> AuthzResult<Vec<S::Object>>
    where
        S: ObjectSource + ?Sized,
        P: Into<PermissionSpec>,
    {
        let ids = self.object_ids_with_permission(principal, source.target_type(), perm)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(source.load(&ids))
    }

    /// Users whose direct record on the object holds every bit of `perm`
    pub fn users_with_permission<T, P>(&self, target: &T, perm: P) -> AuthzResult<Vec<UserId>>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        Ok(self
            .holders(target, perm)?
            .into_iter()
            .filter_map(|key| match key {
                PrincipalKey::User(id) => Some(id),
                PrincipalKey::Group(_) => None,
            })
            .collect())
    }

    /// Groups whose record on the object holds every bit of `perm`
    pub fn groups_with_permission<T, P>(&self, target: &T, perm: P) -> AuthzResult<Vec<GroupId>>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        Ok(self
            .holders(target, perm)?
            .into_iter()
            .filter_map(|key| match key {
                PrincipalKey::Group(id) => Some(id),
                PrincipalKey::User(_) => None,
            })
            .collect())
    }

    fn holders<T, P>(&self, target: &T, perm: P) -> AuthzResult<Vec<PrincipalKey>>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        let target = target.target_ref();
        let bits = self.registry.capabilities(&target.target_type)?.as_int(perm)?;

        let mut holders: Vec<PrincipalKey> = self
            .store
            .for_target(&target)
            .into_iter()
            .filter(|record| Match::All.satisfied(record.mask, bits))
            .map(|record| record.principal)
            .collect();
        holders.sort();
        Ok(holders)
    }
}
