/*!
 * In-Memory Grant Store
 * Sharded grant table with per-object and per-principal indexes
 *
 * Lock ordering: a writer holds the record's shard while it updates the
 * indexes; readers copy index entries out before touching the record table.
 */

use super::{Applied, GrantStore, MaskOp};
use crate::core::errors::AuthzError;
use crate::core::limits::DEFAULT_STORE_CAPACITY;
use crate::core::types::{AuthzResult, Bitmask, ObjectId, TargetType};
use crate::permissions::types::{GrantKey, GrantRecord, PrincipalKey, TargetRef};
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Current on-disk snapshot version
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    version: u32,
    records: Vec<GrantRecord>,
}

/// Grant store kept entirely in memory
pub struct MemoryGrantStore {
    records: DashMap<GrantKey, Bitmask, RandomState>,
    /// Reverse relation: who holds a record on an object
    by_target: DashMap<TargetRef, BTreeSet<PrincipalKey>, RandomState>,
    /// Which objects of a type a principal holds records on
    by_principal: DashMap<(PrincipalKey, TargetType), BTreeSet<ObjectId>, RandomState>,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            by_target: DashMap::with_hasher(RandomState::new()),
            by_principal: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Write all records to a JSON file
    pub fn save_to(&self, path: impl AsRef<Path>) -> AuthzResult<()> {
        let path = path.as_ref();
        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION,
            records: self.snapshot(),
        };
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush()?;
        info!(path = %path.display(), records = snapshot.records.len(), "Saved grant store");
        Ok(())
    }

    /// Build a store from a file written by [`save_to`](Self::save_to)
    pub fn load_from(path: impl AsRef<Path>) -> AuthzResult<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let snapshot: StoreSnapshot = serde_json::from_reader(reader)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(AuthzError::Store(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let store = Self::with_capacity(snapshot.records.len().max(DEFAULT_STORE_CAPACITY));
        let count = snapshot.records.len();
        store.restore(snapshot.records)?;
        info!(path = %path.display(), records = count, "Loaded grant store");
        Ok(store)
    }

    fn index(&self, key: &GrantKey) {
        self.by_target
            .entry(key.target.clone())
            .or_default()
            .insert(key.principal);
        self.by_principal
            .entry((key.principal, key.target.target_type.clone()))
            .or_default()
            .insert(key.target.object_id);
    }

    fn unindex(&self, key: &GrantKey) {
        if let Entry::Occupied(mut entry) = self.by_target.entry(key.target.clone()) {
            entry.get_mut().remove(&key.principal);
            if entry.get().is_empty() {
                entry.remove();
            }
        }
        let principal_key = (key.principal, key.target.target_type.clone());
        if let Entry::Occupied(mut entry) = self.by_principal.entry(principal_key) {
            entry.get_mut().remove(&key.target.object_id);
            if entry.get().is_empty() {
                entry.remove();
            }
        }
    }

    fn clear(&self) {
        self.records.clear();
        self.by_target.clear();
        self.by_principal.clear();
    }
}

impl Default for MemoryGrantStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GrantStore for MemoryGrantStore {
    fn get(&self, key: &GrantKey) -> Option<GrantRecord> {
        self.records
            .get(key)
            .map(|mask| GrantRecord::new(key.principal, key.target.clone(), *mask))
    }

    /// Grant and set on an existing record always count as a write, even when
    /// the bits are already present, so listeners see every save. A grant of
    /// no bits is the exception and leaves the record unchanged.
    fn apply(&self, key: GrantKey, op: MaskOp) -> AuthzResult<Applied> {
        let applied = match self.records.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let current = *entry.get();
                let next = op.apply_to(current);
                if next == 0 {
                    self.unindex(&key);
                    entry.remove();
                    Applied::Deleted(GrantRecord::new(key.principal, key.target, current))
                } else if next == current && (!op.creates() || op.is_empty_grant()) {
                    Applied::Unchanged(Some(GrantRecord::new(key.principal, key.target, current)))
                } else {
                    *entry.get_mut() = next;
                    Applied::Updated(GrantRecord::new(key.principal, key.target, next))
                }
            }
            Entry::Vacant(entry) => {
                let next = op.apply_to(0);
                if !op.creates() || next == 0 {
                    Applied::Unchanged(None)
                } else {
                    let _held = entry.insert(next);
                    self.index(&key);
                    Applied::Created(GrantRecord::new(key.principal, key.target, next))
                }
            }
        };

        debug!(op = ?op, outcome = ?applied, "Applied grant store op");
        Ok(applied)
    }

    fn for_target(&self, target: &TargetRef) -> Vec<GrantRecord> {
        let principals: Vec<PrincipalKey> = match self.by_target.get(target) {
            Some(entry) => entry.iter().copied().collect(),
            None => return Vec::new(),
        };

        principals
            .into_iter()
            .filter_map(|principal| self.get(&GrantKey::new(principal, target.clone())))
            .collect()
    }

    fn overlapping(
        &self,
        target_type: &TargetType,
        principals: &[PrincipalKey],
        bits: Bitmask,
    ) -> Vec<GrantRecord> {
        let mut matches = Vec::new();
        for principal in principals {
            let object_ids: Vec<ObjectId> =
                match self.by_principal.get(&(*principal, target_type.clone())) {
                    Some(entry) => entry.iter().copied().collect(),
                    None => continue,
                };

            for object_id in object_ids {
                let key = GrantKey::new(*principal, TargetRef::new(target_type.clone(), object_id));
                if let Some(record) = self.get(&key) {
                    if record.overlaps(bits) {
                        matches.push(record);
                    }
                }
            }
        }
        matches
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn snapshot(&self) -> Vec<GrantRecord> {
        let mut records: Vec<GrantRecord> = self
            .records
            .iter()
            .map(|entry| GrantRecord::new(entry.key().principal, entry.key().target.clone(), *entry.value()))
            .collect();
        records.sort_by(|a, b| a.key().cmp(&b.key()));
        records
    }

    /// Not atomic with respect to concurrent writers
    fn restore(&self, records: Vec<GrantRecord>) -> AuthzResult<()> {
        self.clear();
        for record in records.into_iter().filter(|r| r.mask != 0) {
            let key = record.key();
            self.records.insert(key.clone(), record.mask);
            self.index(&key);
        }
        Ok(())
    }
}
