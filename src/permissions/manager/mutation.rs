/*!
 * Grant Mutations
 * grant / revoke / revoke_all / set and change notification dispatch
 */

use super::manager::PermissionManager;
use super::super::codec::PermissionSpec;
use super::super::notify::{cascade_depth, CascadeGuard, ChangeEvent, ChangeKind};
use super::super::store::{Applied, MaskOp};
use super::super::types::{GrantKey, GrantRecord, Principal, Target};
use crate::core::config::{ListenerFailurePolicy, RevokeMode};
use crate::core::errors::AuthzError;
use crate::core::types::{AuthzResult, Bitmask};
use crate::monitoring::span_operation;
use tracing::{debug, info, warn};

impl PermissionManager {
    /// Add permissions; creates the record on first non-zero grant
    pub fn grant<'a, T, P>(
        &self,
        principal: impl Into<Principal<'a>>,
        target: &T,
        perm: P,
    ) -> AuthzResult<Applied>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        let (key, bits) = self.resolve_key(principal.into(), target, perm)?;
        self.mutate(key, MaskOp::Grant(bits))
    }

    /// Remove permissions; a missing record is left missing
    ///
    /// Bits are cleared unless the engine is configured with
    /// [`RevokeMode::Toggle`], which flips them instead.
    pub fn revoke<'a, T, P>(
        &self,
        principal: impl Into<Principal<'a>>,
        target: &T,
        perm: P,
    ) -> AuthzResult<Applied>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        let (key, bits) = self.resolve_key(principal.into(), target, perm)?;
        let op = match self.config.revoke_mode {
            RevokeMode::Clear => MaskOp::Revoke(bits),
            RevokeMode::Toggle => MaskOp::Toggle(bits),
        };
        self.mutate(key, op)
    }

    /// Delete the record; returns whether one existed
    pub fn revoke_all<'a, T>(&self, principal: impl Into<Principal<'a>>, target: &T) -> AuthzResult<bool>
    where
        T: Target + ?Sized,
    {
        let key = GrantKey::new(principal.into().key(), target.target_ref());
        let applied = self.mutate(key, MaskOp::Clear)?;
        Ok(matches!(applied, Applied::Deleted(_)))
    }

    /// Replace the mask; setting no bits deletes the record
    pub fn set<'a, T, P>(
        &self,
        principal: impl Into<Principal<'a>>,
        target: &T,
        perm: P,
    ) -> AuthzResult<Applied>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        let (key, bits) = self.resolve_key(principal.into(), target, perm)?;
        self.mutate(key, MaskOp::Set(bits))
    }

    fn resolve_key<T, P>(&self, principal: Principal<'_>, target: &T, perm: P) -> AuthzResult<(GrantKey, Bitmask)>
    where
        T: Target + ?Sized,
        P: Into<PermissionSpec>,
    {
        let target = target.target_ref();
        let bits = self.registry.capabilities(&target.target_type)?.as_int(perm)?;
        Ok((GrantKey::new(principal.key(), target), bits))
    }

    /// Apply one op to the store and notify listeners of the result
    fn mutate(&self, key: GrantKey, op: MaskOp) -> AuthzResult<Applied> {
        let span = span_operation(op.name());
        let depth = cascade_depth();
        if depth > self.config.max_cascade_depth {
            self.stats.record_cascade_rejection();
            span.record_error("cascade depth exceeded");
            warn!(
                principal = %key.principal,
                target = %key.target,
                depth,
                max = self.config.max_cascade_depth,
                "Cascade depth exceeded, mutation rejected"
            );
            return Err(AuthzError::CascadeDepthExceeded {
                depth,
                max: self.config.max_cascade_depth,
            });
        }

        let applied = self.store.apply(key, op)?;
        span.record_result(true);
        // Counted once the store is written, whatever the listeners do
        match op {
            MaskOp::Grant(_) => self.stats.record_grant(),
            MaskOp::Revoke(_) | MaskOp::Toggle(_) | MaskOp::Clear => self.stats.record_revoke(),
            MaskOp::Set(_) => self.stats.record_set(),
        }

        match &applied {
            Applied::Created(record) => {
                info!(principal = %record.principal, target = %record.target, mask = record.mask, ?op, "Grant record created");
                self.notify(record, ChangeKind::Created, depth)?;
            }
            Applied::Updated(record) => {
                info!(principal = %record.principal, target = %record.target, mask = record.mask, ?op, "Grant record updated");
                self.notify(record, ChangeKind::Updated, depth)?;
            }
            Applied::Deleted(record) => {
                info!(principal = %record.principal, target = %record.target, ?op, "Grant record deleted");
            }
            Applied::Unchanged(_) => {
                debug!(?op, "Grant mutation left store unchanged");
            }
        }

        Ok(applied)
    }

    fn notify(&self, record: &GrantRecord, kind: ChangeKind, depth: usize) -> AuthzResult<()> {
        let listeners = self.listeners.ordered();
        if listeners.is_empty() {
            return Ok(());
        }

        let event = ChangeEvent::new(record.clone(), kind, depth);
        let _guard = CascadeGuard::enter();

        for (id, listener) in listeners {
            self.stats.record_notification();
            let Err(err) = listener(self, &event) else {
                continue;
            };
            self.stats.record_listener_failure();

            match self.config.listener_failure {
                ListenerFailurePolicy::Propagate => {
                    warn!(listener = id, error = %err, "Change listener failed");
                    // Nested failures already carry their origin
                    return Err(match err {
                        AuthzError::CascadeDepthExceeded { .. } | AuthzError::ListenerFailed { .. } => err,
                        other => AuthzError::ListenerFailed {
                            listener: id,
                            reason: other.to_string(),
                        },
                    });
                }
                ListenerFailurePolicy::LogAndContinue => {
                    warn!(listener = id, error = %err, "Change listener failed, continuing");
                }
            }
        }

        Ok(())
    }
}
