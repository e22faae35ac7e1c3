/*!
 * Permission Manager
 * Central entry point tying registry, grant store and listeners together
 */

use super::super::capability::CapabilitySet;
use super::super::notify::{ChangeEvent, ListenerId, ListenerRegistry};
use super::super::registry::Registry;
use super::super::store::{GrantStore, MemoryGrantStore};
use super::super::types::{GrantRecord, Target};
use crate::core::config::EngineConfig;
use crate::core::types::{AuthzResult, TargetType};
use crate::monitoring::{EngineStats, StatsCollector};
use std::sync::Arc;
use tracing::debug;

/// Central permission manager
///
/// Cheap to clone; clones share the registry, store, listeners and counters.
#[derive(Clone)]
pub struct PermissionManager {
    /// Target type vocabularies
    pub(in crate::permissions) registry: Arc<Registry>,
    /// Grant records
    pub(in crate::permissions) store: Arc<dyn GrantStore>,
    /// Change listeners
    pub(in crate::permissions) listeners: ListenerRegistry,
    pub(in crate::permissions) config: EngineConfig,
    pub(in crate::permissions) stats: Arc<StatsCollector>,
}

impl PermissionManager {
    /// Create a manager with a private registry and an in-memory store
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        debug!(
            max_cascade_depth = config.max_cascade_depth,
            revoke_mode = ?config.revoke_mode,
            listener_failure = ?config.listener_failure,
            "Initializing permission manager"
        );
        Self {
            registry: Arc::new(Registry::new()),
            store: Arc::new(MemoryGrantStore::new()),
            listeners: ListenerRegistry::new(),
            config,
            stats: Arc::new(StatsCollector::new()),
        }
    }

    /// Create a manager bound to the process-wide registry
    pub fn global() -> Self {
        Self::new().with_registry(Registry::global())
    }

    /// Use a shared registry
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Use a custom grant store
    pub fn with_store(mut self, store: Arc<dyn GrantStore>) -> Self {
        self.store = store;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn GrantStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.snapshot()
    }

    /// Register a target type; repeats return the existing set
    pub fn register<I, S>(&self, target_type: impl Into<TargetType>, names: I) -> AuthzResult<Arc<CapabilitySet>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.register(target_type, names)
    }

    /// Register a target type, failing if it already exists
    pub fn register_strict<I, S>(
        &self,
        target_type: impl Into<TargetType>,
        names: I,
    ) -> AuthzResult<Arc<CapabilitySet>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.register_strict(target_type, names)
    }

    /// Reject registration of new target types from now on
    pub fn freeze_registry(&self) {
        self.registry.freeze();
    }

    /// Capability set of a registered type
    pub fn capabilities(&self, target_type: &TargetType) -> AuthzResult<Arc<CapabilitySet>> {
        self.registry.capabilities(target_type)
    }

    /// User records scoped to one object
    pub fn user_grants<T: Target + ?Sized>(&self, target: &T) -> AuthzResult<Vec<GrantRecord>> {
        self.grants_on(target, true)
    }

    /// Group records scoped to one object
    pub fn group_grants<T: Target + ?Sized>(&self, target: &T) -> AuthzResult<Vec<GrantRecord>> {
        self.grants_on(target, false)
    }

    fn grants_on<T: Target + ?Sized>(&self, target: &T, users: bool) -> AuthzResult<Vec<GrantRecord>> {
        let target = target.target_ref();
        self.registry.capabilities(&target.target_type)?;
        Ok(self
            .store
            .for_target(&target)
            .into_iter()
            .filter(|record| record.principal.is_user() == users)
            .collect())
    }

    /// Register a change listener
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&PermissionManager, &ChangeEvent) -> AuthzResult<()> + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.count()
    }
}

impl Default for PermissionManager {
    fn default() -> Self {
        Self::new()
    }
}
