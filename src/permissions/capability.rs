/*!
 * Capability Set
 * Ordered, named, bit-indexed permission vocabulary of one target type
 *
 * The k-th registered name owns bit `1 << k`. Sets are immutable once built;
 * the registry hands them out behind an `Arc`.
 */

use super::codec::{FormattedMask, MaskFormat, PermissionSpec};
use crate::core::errors::AuthzError;
use crate::core::limits::{MAX_PERMISSIONS_PER_TYPE, MAX_PERMISSION_NAME_LEN};
use crate::core::types::{AuthzResult, Bitmask, TargetType};
use ahash::RandomState;
use serde::Serialize;
use std::collections::HashMap;

/// Permission vocabulary for one target type
#[derive(Debug, Clone, Serialize)]
pub struct CapabilitySet {
    target_type: TargetType,
    names: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, Bitmask, RandomState>,
}

impl CapabilitySet {
    /// Build a set, validating count, emptiness and uniqueness of names
    pub fn new<I, S>(target_type: impl Into<TargetType>, names: I) -> AuthzResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target_type = target_type.into();
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.len() > MAX_PERMISSIONS_PER_TYPE {
            return Err(AuthzError::TooManyPermissions {
                target_type: target_type.to_string(),
                count: names.len(),
                max: MAX_PERMISSIONS_PER_TYPE,
            });
        }

        let mut index = HashMap::with_capacity_and_hasher(names.len(), RandomState::new());
        for (position, name) in names.iter().enumerate() {
            if name.is_empty() || name.len() > MAX_PERMISSION_NAME_LEN {
                return Err(AuthzError::InvalidPermissionName(name.clone()));
            }
            if index.insert(name.clone(), 1 << position).is_some() {
                return Err(AuthzError::DuplicatePermission {
                    target_type: target_type.to_string(),
                    permission: name.clone(),
                });
            }
        }

        Ok(Self {
            target_type,
            names,
            index,
        })
    }

    pub fn target_type(&self) -> &TargetType {
        &self.target_type
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Bit value of a single name
    pub fn bit(&self, name: &str) -> Option<Bitmask> {
        self.index.get(name).copied()
    }

    /// Names in registration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Bit values in registration order
    pub fn values(&self) -> Vec<Bitmask> {
        (0..self.names.len()).map(|k| 1 << k).collect()
    }

    /// (bit, name) pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (Bitmask, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(k, name)| (1 << k, name.as_str()))
    }

    /// Every bit this set defines
    pub fn full_mask(&self) -> Bitmask {
        match self.names.len() {
            0 => 0,
            n => Bitmask::MAX >> (Bitmask::BITS as usize - n),
        }
    }

    /// Resolve any permission input to its canonical mask
    ///
    /// Unknown names and integers carrying bits outside the set are rejected.
    pub fn as_int(&self, perm: impl Into<PermissionSpec>) -> AuthzResult<Bitmask> {
        self.resolve(&perm.into())
    }

    pub fn resolve(&self, spec: &PermissionSpec) -> AuthzResult<Bitmask> {
        match spec {
            PermissionSpec::Bits(bits) => {
                if bits & !self.full_mask() != 0 {
                    return Err(AuthzError::unknown(&self.target_type, spec));
                }
                Ok(*bits)
            }
            PermissionSpec::Name(name) => self
                .bit(name)
                .ok_or_else(|| AuthzError::unknown(&self.target_type, name)),
            PermissionSpec::List(items) => items
                .iter()
                .try_fold(0, |acc, item| Ok(acc | self.resolve(item)?)),
        }
    }

    /// Names of the set bits; bits outside the set are ignored
    pub fn as_string_list(&self, mask: Bitmask) -> Vec<String> {
        self.iter()
            .filter(|(bit, _)| mask & bit != 0)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Values of the set bits; bits outside the set are ignored
    pub fn as_int_list(&self, mask: Bitmask) -> Vec<Bitmask> {
        self.iter()
            .filter(|(bit, _)| mask & bit != 0)
            .map(|(bit, _)| bit)
            .collect()
    }

    /// (bit, name) pairs of the set bits; bits outside the set are ignored
    pub fn as_choices(&self, mask: Bitmask) -> Vec<(Bitmask, String)> {
        self.iter()
            .filter(|(bit, _)| mask & bit != 0)
            .map(|(bit, name)| (bit, name.to_string()))
            .collect()
    }

    /// All (bit, name) pairs, for populating selection lists
    pub fn choice_list(&self) -> Vec<(Bitmask, String)> {
        self.iter()
            .map(|(bit, name)| (bit, name.to_string()))
            .collect()
    }

    pub fn format(&self, mask: Bitmask, format: MaskFormat) -> FormattedMask {
        match format {
            MaskFormat::Int => FormattedMask::Int(mask),
            MaskFormat::StringList => FormattedMask::StringList(self.as_string_list(mask)),
            MaskFormat::IntList => FormattedMask::IntList(self.as_int_list(mask)),
            MaskFormat::Choices => FormattedMask::Choices(self.as_choices(mask)),
        }
    }
}

impl PartialEq for CapabilitySet {
    fn eq(&self, other: &Self) -> bool {
        self.target_type == other.target_type && self.names == other.names
    }
}

impl Eq for CapabilitySet {}
