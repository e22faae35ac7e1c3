/*!
 * Bitmask Codec
 * Permission inputs and the output shapes a mask can be rendered in
 */

use crate::core::errors::AuthzError;
use crate::core::types::Bitmask;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A permission as callers express it: raw bits, a name, or any nesting of both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionSpec {
    Bits(Bitmask),
    Name(String),
    List(Vec<PermissionSpec>),
}

impl From<Bitmask> for PermissionSpec {
    fn from(bits: Bitmask) -> Self {
        PermissionSpec::Bits(bits)
    }
}

impl From<&str> for PermissionSpec {
    fn from(name: &str) -> Self {
        PermissionSpec::Name(name.to_string())
    }
}

impl From<String> for PermissionSpec {
    fn from(name: String) -> Self {
        PermissionSpec::Name(name)
    }
}

impl From<&String> for PermissionSpec {
    fn from(name: &String) -> Self {
        PermissionSpec::Name(name.clone())
    }
}

impl<T: Into<PermissionSpec>> From<Vec<T>> for PermissionSpec {
    fn from(items: Vec<T>) -> Self {
        PermissionSpec::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PermissionSpec>, const N: usize> From<[T; N]> for PermissionSpec {
    fn from(items: [T; N]) -> Self {
        PermissionSpec::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PermissionSpec> + Clone> From<&[T]> for PermissionSpec {
    fn from(items: &[T]) -> Self {
        PermissionSpec::List(items.iter().cloned().map(Into::into).collect())
    }
}

impl fmt::Display for PermissionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionSpec::Bits(bits) => write!(f, "{:#b}", bits),
            PermissionSpec::Name(name) => f.write_str(name),
            PermissionSpec::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Output shape for a decoded mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskFormat {
    #[default]
    Int,
    StringList,
    IntList,
    Choices,
}

impl FromStr for MaskFormat {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(MaskFormat::Int),
            "string_list" | "str_list" => Ok(MaskFormat::StringList),
            "int_list" => Ok(MaskFormat::IntList),
            "choices" => Ok(MaskFormat::Choices),
            other => Err(AuthzError::InvalidFormat(other.to_string())),
        }
    }
}

/// A mask rendered in one of the [`MaskFormat`] shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "format", content = "value")]
pub enum FormattedMask {
    Int(Bitmask),
    StringList(Vec<String>),
    IntList(Vec<Bitmask>),
    Choices(Vec<(Bitmask, String)>),
}

impl FormattedMask {
    /// Zero permissions in the requested shape
    pub fn empty(format: MaskFormat) -> Self {
        match format {
            MaskFormat::Int => FormattedMask::Int(0),
            MaskFormat::StringList => FormattedMask::StringList(Vec::new()),
            MaskFormat::IntList => FormattedMask::IntList(Vec::new()),
            MaskFormat::Choices => FormattedMask::Choices(Vec::new()),
        }
    }

    pub fn format(&self) -> MaskFormat {
        match self {
            FormattedMask::Int(_) => MaskFormat::Int,
            FormattedMask::StringList(_) => MaskFormat::StringList,
            FormattedMask::IntList(_) => MaskFormat::IntList,
            FormattedMask::Choices(_) => MaskFormat::Choices,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FormattedMask::Int(bits) => *bits == 0,
            FormattedMask::StringList(v) => v.is_empty(),
            FormattedMask::IntList(v) => v.is_empty(),
            FormattedMask::Choices(v) => v.is_empty(),
        }
    }

    pub fn as_int(&self) -> Option<Bitmask> {
        match self {
            FormattedMask::Int(bits) => Some(*bits),
            _ => None,
        }
    }

    pub fn into_string_list(self) -> Option<Vec<String>> {
        match self {
            FormattedMask::StringList(names) => Some(names),
            _ => None,
        }
    }

    pub fn into_int_list(self) -> Option<Vec<Bitmask>> {
        match self {
            FormattedMask::IntList(bits) => Some(bits),
            _ => None,
        }
    }

    pub fn into_choices(self) -> Option<Vec<(Bitmask, String)>> {
        match self {
            FormattedMask::Choices(choices) => Some(choices),
            _ => None,
        }
    }
}

/// Set bits of `mask` from lowest to highest, each as its own value
pub fn split_bits(mask: Bitmask) -> impl Iterator<Item = Bitmask> {
    (0..Bitmask::BITS)
        .map(|shift| 1 << shift)
        .filter(move |bit| mask & bit != 0)
}
