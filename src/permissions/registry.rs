/*!
 * Permission Registry
 * Process-wide map from target type to its capability set
 *
 * Registration is append-only. Readers load an immutable snapshot through
 * `arc-swap` and never take a lock; writers serialize on a mutex and publish a
 * new snapshot. After `freeze()` the set of types is fixed.
 */

use super::capability::CapabilitySet;
use crate::core::errors::AuthzError;
use crate::core::limits::DEFAULT_REGISTRY_CAPACITY;
use crate::core::types::{AuthzResult, TargetType};
use ahash::RandomState;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

type TypeMap = HashMap<TargetType, Arc<CapabilitySet>, RandomState>;

static GLOBAL_REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// Registry of target types and their permission vocabularies
pub struct Registry {
    types: ArcSwap<TypeMap>,
    write_lock: Mutex<()>,
    frozen: AtomicBool,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            types: ArcSwap::from_pointee(HashMap::with_capacity_and_hasher(
                DEFAULT_REGISTRY_CAPACITY,
                RandomState::new(),
            )),
            write_lock: Mutex::new(()),
            frozen: AtomicBool::new(false),
        }
    }

    /// Shared process-wide registry, created on first use
    pub fn global() -> Arc<Registry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(Registry::new()))
            .clone()
    }

    /// Register a target type
    ///
    /// Registering a type that already exists returns the original set
    /// unchanged, whatever `names` holds this time.
    pub fn register<I, S>(&self, target_type: impl Into<TargetType>, names: I) -> AuthzResult<Arc<CapabilitySet>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(target_type.into(), names, false)
    }

    /// Register a target type, failing with `AlreadyRegistered` on repeats
    pub fn register_strict<I, S>(
        &self,
        target_type: impl Into<TargetType>,
        names: I,
    ) -> AuthzResult<Arc<CapabilitySet>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(target_type.into(), names, true)
    }

    fn insert<I, S>(&self, target_type: TargetType, names: I, strict: bool) -> AuthzResult<Arc<CapabilitySet>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let _guard = self.write_lock.lock();

        if let Some(existing) = self.types.load().get(&target_type) {
            if strict {
                return Err(AuthzError::AlreadyRegistered(target_type.to_string()));
            }
            debug!(target_type = %target_type, "Target type already registered, ignoring");
            return Ok(existing.clone());
        }

        if self.is_frozen() {
            return Err(AuthzError::RegistryFrozen(target_type.to_string()));
        }

        let set = Arc::new(CapabilitySet::new(target_type.clone(), names)?);

        let mut next: TypeMap = HashMap::clone(&self.types.load());
        next.insert(target_type.clone(), set.clone());
        self.types.store(Arc::new(next));

        info!(
            target_type = %target_type,
            permissions = set.len(),
            "Registered target type"
        );
        Ok(set)
    }

    /// End the bootstrap phase; later registrations of new types fail
    pub fn freeze(&self) {
        let _guard = self.write_lock.lock();
        if !self.frozen.swap(true, Ordering::AcqRel) {
            info!(types = self.len(), "Permission registry frozen");
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn get(&self, target_type: &TargetType) -> Option<Arc<CapabilitySet>> {
        self.types.load().get(target_type).cloned()
    }

    /// Like [`get`](Self::get), but an unregistered type is an error
    pub fn capabilities(&self, target_type: &TargetType) -> AuthzResult<Arc<CapabilitySet>> {
        self.get(target_type)
            .ok_or_else(|| AuthzError::NotRegistered(target_type.to_string()))
    }

    pub fn is_registered(&self, target_type: &TargetType) -> bool {
        self.types.load().contains_key(target_type)
    }

    /// Registered types, sorted by name
    pub fn target_types(&self) -> Vec<TargetType> {
        let mut types: Vec<TargetType> = self.types.load().keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.types.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
