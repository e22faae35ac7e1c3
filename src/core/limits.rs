/*!
 * System Limits and Constants
 *
 * Centralized location for the engine's limits, thresholds, and defaults.
 * Organized by domain for maintainability and discoverability.
 *
 * - Security-critical constants are marked with [SECURITY]
 * - Performance-critical constants are marked with [PERF]
 */

// =============================================================================
// CAPABILITY SET LIMITS
// =============================================================================

/// Maximum permissions a single target type may declare
/// The k-th permission occupies bit k; bit 31 is never used so masks stay
/// representable as a non-negative signed 32-bit integer in external stores
/// [SECURITY] Checked at registration, overflow is an error
pub const MAX_PERMISSIONS_PER_TYPE: usize = 31;

/// Maximum length of a single permission name (bytes)
pub const MAX_PERMISSION_NAME_LEN: usize = 64;

// =============================================================================
// CHANGE NOTIFICATION
// =============================================================================

/// Default bound on listener-triggered cascades
/// A mutation issued from a listener running at a deeper level is rejected
/// [SECURITY] Prevents unbounded recursion between mutually cascading listeners
pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 8;

/// Hard ceiling accepted from configuration
pub const MAX_CASCADE_DEPTH_CEILING: usize = 256;

// =============================================================================
// STORE SIZING
// =============================================================================

/// Initial capacity of the in-memory grant table
/// [PERF] Avoids early rehashing for typical bootstrap volumes
pub const DEFAULT_STORE_CAPACITY: usize = 1024;

/// Initial capacity of the registry type map
pub const DEFAULT_REGISTRY_CAPACITY: usize = 32;
