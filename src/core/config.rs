/*!
 * Engine Configuration
 * Tunables for revoke semantics, cascade bounds and listener failures
 *
 * Environment variables:
 * - OBJPERM_MAX_CASCADE_DEPTH: listener cascade bound (default: 8)
 * - OBJPERM_REVOKE_MODE: `clear` or `toggle` (default: clear)
 * - OBJPERM_LISTENER_FAILURE: `propagate` or `log` (default: propagate)
 */

use super::errors::AuthzError;
use super::limits::{DEFAULT_MAX_CASCADE_DEPTH, MAX_CASCADE_DEPTH_CEILING};
use super::types::AuthzResult;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How `revoke` removes bits from a stored mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokeMode {
    /// AND-NOT: only bits currently held are cleared
    #[default]
    Clear,
    /// XOR: bit-compatible with legacy stores; revoking an unheld bit sets it
    Toggle,
}

impl FromStr for RevokeMode {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" | "and_not" => Ok(RevokeMode::Clear),
            "toggle" | "xor" => Ok(RevokeMode::Toggle),
            other => Err(AuthzError::Config(format!("unknown revoke mode '{}'", other))),
        }
    }
}

/// What happens when a change listener returns an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerFailurePolicy {
    /// Stop dispatch and return the failure to the mutating caller.
    /// The store mutation is not rolled back.
    #[default]
    Propagate,
    /// Log the failure and keep notifying the remaining listeners
    LogAndContinue,
}

impl FromStr for ListenerFailurePolicy {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "propagate" => Ok(ListenerFailurePolicy::Propagate),
            "log" | "log_and_continue" => Ok(ListenerFailurePolicy::LogAndContinue),
            other => Err(AuthzError::Config(format!(
                "unknown listener failure policy '{}'",
                other
            ))),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    /// Deepest listener level allowed to issue further mutations
    pub max_cascade_depth: usize,
    pub revoke_mode: RevokeMode,
    pub listener_failure: ListenerFailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cascade_depth: DEFAULT_MAX_CASCADE_DEPTH,
            revoke_mode: RevokeMode::Clear,
            listener_failure: ListenerFailurePolicy::Propagate,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `OBJPERM_*` environment variables, falling back to defaults
    pub fn from_env() -> AuthzResult<Self> {
        let mut config = Self::default();

        if let Ok(depth) = std::env::var("OBJPERM_MAX_CASCADE_DEPTH") {
            let depth = depth.trim().parse::<usize>().map_err(|e| {
                AuthzError::Config(format!("OBJPERM_MAX_CASCADE_DEPTH: {}", e))
            })?;
            config.max_cascade_depth = depth;
        }
        if let Ok(mode) = std::env::var("OBJPERM_REVOKE_MODE") {
            config.revoke_mode = mode.parse()?;
        }
        if let Ok(policy) = std::env::var("OBJPERM_LISTENER_FAILURE") {
            config.listener_failure = policy.parse()?;
        }

        config.validate()
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> AuthzResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AuthzError::Config(e.to_string()))?;
        config.validate()
    }

    pub fn with_max_cascade_depth(mut self, depth: usize) -> Self {
        self.max_cascade_depth = depth;
        self
    }

    pub fn with_revoke_mode(mut self, mode: RevokeMode) -> Self {
        self.revoke_mode = mode;
        self
    }

    pub fn with_listener_failure(mut self, policy: ListenerFailurePolicy) -> Self {
        self.listener_failure = policy;
        self
    }

    fn validate(self) -> AuthzResult<Self> {
        if self.max_cascade_depth > MAX_CASCADE_DEPTH_CEILING {
            return Err(AuthzError::Config(format!(
                "max_cascade_depth {} exceeds ceiling {}",
                self.max_cascade_depth, MAX_CASCADE_DEPTH_CEILING
            )));
        }
        Ok(self)
    }
}
