/*!
 * Change Notification
 * Synchronous listener registry for grant record writes
 *
 * Listeners run inline on the mutating thread, in subscription order, after
 * the store write. A listener may mutate further records; the nesting level is
 * tracked per thread so cascades can be bounded.
 */

use super::manager::PermissionManager;
use super::types::{GrantRecord, PrincipalKey, TargetRef};
use crate::core::types::AuthzResult;
use ahash::RandomState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Handle returned by `subscribe`
pub type ListenerId = u64;

/// Change listener callback
pub type ListenerFn = Arc<dyn Fn(&PermissionManager, &ChangeEvent) -> AuthzResult<()> + Send + Sync>;

/// Kind of write that triggered a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
}

/// Notification payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChangeEvent {
    /// Record as persisted
    pub record: GrantRecord,
    pub principal: PrincipalKey,
    pub target: TargetRef,
    pub kind: ChangeKind,
    /// 0 for a direct call, n for a mutation made by a listener at level n
    pub depth: usize,
}

impl ChangeEvent {
    pub fn new(record: GrantRecord, kind: ChangeKind, depth: usize) -> Self {
        Self {
            principal: record.principal,
            target: record.target.clone(),
            record,
            kind,
            depth,
        }
    }
}

thread_local! {
    static CASCADE_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Listener nesting level of the current thread
pub fn cascade_depth() -> usize {
    CASCADE_DEPTH.with(|depth| depth.get())
}

/// Raises the nesting level for the lifetime of the guard
pub(crate) struct CascadeGuard {
    _private: (),
}

impl CascadeGuard {
    pub(crate) fn enter() -> Self {
        CASCADE_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self { _private: () }
    }
}

impl Drop for CascadeGuard {
    fn drop(&mut self) {
        CASCADE_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Registry of change listeners
///
/// # Performance
/// - Cache-line aligned to prevent false sharing of atomic ID counter
#[repr(C, align(64))]
#[derive(Clone)]
pub struct ListenerRegistry {
    listeners: Arc<DashMap<ListenerId, ListenerFn, RandomState>>,
    next_id: Arc<AtomicU64>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a listener; ids increase monotonically
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&PermissionManager, &ChangeEvent) -> AuthzResult<()> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.insert(id, Arc::new(listener));
        info!(listener = id, "Registered change listener");
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(&id).is_some();
        if removed {
            info!(listener = id, "Unregistered change listener");
        }
        removed
    }

    pub fn exists(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    pub fn count(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners in subscription order
    ///
    /// The returned handles are detached from the map so listeners can
    /// subscribe or unsubscribe while being dispatched.
    pub fn ordered(&self) -> Vec<(ListenerId, ListenerFn)> {
        let mut listeners: Vec<(ListenerId, ListenerFn)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        listeners.sort_by_key(|(id, _)| *id);
        debug!(count = listeners.len(), "Collected change listeners");
        listeners
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
