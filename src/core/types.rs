/*!
 * Core Types
 * Common identifiers used across the engine
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Permission bitmask; bit k is the k-th registered permission
pub type Bitmask = u32;

/// User identifier
pub type UserId = u64;

/// Group identifier
pub type GroupId = u64;

/// Primary key of a target object within its type
pub type ObjectId = u64;

/// Common result type for engine operations
pub type AuthzResult<T> = Result<T, super::errors::AuthzError>;

/// Identifier of a registered target type (e.g. `"document"`)
///
/// Cheap to clone; shared between the registry, records and events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetType(Arc<str>);

impl TargetType {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TargetType {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl AsRef<str> for TargetType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
