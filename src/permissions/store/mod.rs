/*!
 * Grant Store
 * Persistence interface for grant records
 */

mod memory;

pub use memory::MemoryGrantStore;

use super::types::{GrantKey, GrantRecord, PrincipalKey, TargetRef};
use crate::core::types::{AuthzResult, Bitmask, TargetType};
use serde::{Deserialize, Serialize};

/// Read-modify-write operation applied atomically to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "bits")]
pub enum MaskOp {
    /// OR bits in, creating the record if missing
    Grant(Bitmask),
    /// AND-NOT bits out of an existing record
    Revoke(Bitmask),
    /// XOR bits against an existing record
    Toggle(Bitmask),
    /// Replace the mask, creating the record if missing
    Set(Bitmask),
    /// Delete the record
    Clear,
}

impl MaskOp {
    /// Whether the op may create a missing record
    pub fn creates(&self) -> bool {
        matches!(self, MaskOp::Grant(_) | MaskOp::Set(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            MaskOp::Grant(_) => "grant",
            MaskOp::Revoke(_) => "revoke",
            MaskOp::Toggle(_) => "toggle",
            MaskOp::Set(_) => "set",
            MaskOp::Clear => "clear",
        }
    }

    /// A grant of no bits, which never counts as a write
    pub fn is_empty_grant(&self) -> bool {
        matches!(self, MaskOp::Grant(0))
    }

    /// Mask after applying the op to `current`
    pub fn apply_to(&self, current: Bitmask) -> Bitmask {
        match *self {
            MaskOp::Grant(bits) => current | bits,
            MaskOp::Revoke(bits) => current & !bits,
            MaskOp::Toggle(bits) => current ^ bits,
            MaskOp::Set(bits) => bits,
            MaskOp::Clear => 0,
        }
    }
}

/// Outcome of a [`MaskOp`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "record")]
pub enum Applied {
    Created(GrantRecord),
    Updated(GrantRecord),
    Deleted(GrantRecord),
    /// No record existed and none was created, or the mask did not change
    Unchanged(Option<GrantRecord>),
}

impl Applied {
    /// Record as it exists after the op, if any
    pub fn record(&self) -> Option<&GrantRecord> {
        match self {
            Applied::Created(r) | Applied::Updated(r) => Some(r),
            Applied::Unchanged(r) => r.as_ref(),
            Applied::Deleted(_) => None,
        }
    }

    /// Whether a create or update was persisted
    pub fn is_write(&self) -> bool {
        matches!(self, Applied::Created(_) | Applied::Updated(_))
    }
}

/// Backing storage for grant records
///
/// Implementations must make `apply` atomic per key: no other mutator of the
/// same (principal, target) may interleave between the read and the write.
/// A record whose mask reaches zero must be deleted, never stored.
pub trait GrantStore: Send + Sync {
    fn get(&self, key: &GrantKey) -> Option<GrantRecord>;

    fn apply(&self, key: GrantKey, op: MaskOp) -> AuthzResult<Applied>;

    /// Every record on one object
    fn for_target(&self, target: &TargetRef) -> Vec<GrantRecord>;

    /// Records of `principals` on objects of `target_type` sharing a bit with `bits`
    fn overlapping(
        &self,
        target_type: &TargetType,
        principals: &[PrincipalKey],
        bits: Bitmask,
    ) -> Vec<GrantRecord>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, sorted by key
    fn snapshot(&self) -> Vec<GrantRecord>;

    /// Replace the store contents; zero-mask records are dropped
    fn restore(&self, records: Vec<GrantRecord>) -> AuthzResult<()>;
}
