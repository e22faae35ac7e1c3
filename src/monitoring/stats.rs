/*!
 * Engine Statistics
 * Lock-free counters for checks, mutations and notifications
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter block shared by all clones of a manager
///
/// # Performance
/// - Cache-line aligned to prevent false sharing with neighbouring allocations
#[repr(C, align(64))]
#[derive(Default)]
pub struct StatsCollector {
    checks: AtomicU64,
    allowed: AtomicU64,
    grants: AtomicU64,
    revokes: AtomicU64,
    sets: AtomicU64,
    notifications: AtomicU64,
    listener_failures: AtomicU64,
    cascade_rejections: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_check(&self, allowed: bool) {
        self.checks.fetch_add(1, Ordering::Relaxed);
        if allowed {
            self.allowed.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_grant(&self) {
        self.grants.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_revoke(&self) {
        self.revokes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_listener_failure(&self) {
        self.listener_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_cascade_rejection(&self) {
        self.cascade_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStats {
        let checks = self.checks.load(Ordering::Relaxed);
        let allowed = self.allowed.load(Ordering::Relaxed);
        EngineStats {
            checks,
            allowed,
            denied: checks.saturating_sub(allowed),
            grants: self.grants.load(Ordering::Relaxed),
            revokes: self.revokes.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            listener_failures: self.listener_failures.load(Ordering::Relaxed),
            cascade_rejections: self.cascade_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStats {
    pub checks: u64,
    pub allowed: u64,
    pub denied: u64,
    pub grants: u64,
    pub revokes: u64,
    pub sets: u64,
    /// Listener invocations, not events
    pub notifications: u64,
    pub listener_failures: u64,
    pub cascade_rejections: u64,
}
