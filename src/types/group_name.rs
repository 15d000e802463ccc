// ABOUTME: Validated elastic group name prefix and the blue/green role names derived from it.
// ABOUTME: A group's role is encoded as a "__prod" or "__stage" suffix on the prefix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Suffix marking the group that currently receives production traffic.
pub const PROD_SUFFIX: &str = "__prod";

/// Suffix marking the group parked behind the stage listener.
pub const STAGE_SUFFIX: &str = "__stage";

/// Maximum length of a group name accepted by the provider.
const MAX_GROUP_NAME_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum GroupNamePrefixError {
    #[error("group name prefix cannot be empty")]
    Empty,

    #[error("group name prefix exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("group name prefix cannot contain whitespace")]
    ContainsWhitespace,

    #[error("group name prefix already carries a role suffix: {0}")]
    HasRoleSuffix(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupNamePrefix(String);

impl GroupNamePrefix {
    pub fn new(value: &str) -> Result<Self, GroupNamePrefixError> {
        if value.is_empty() {
            return Err(GroupNamePrefixError::Empty);
        }

        let max = MAX_GROUP_NAME_LEN - PROD_SUFFIX.len().max(STAGE_SUFFIX.len());
        if value.len() > max {
            return Err(GroupNamePrefixError::TooLong(max));
        }

        if value.chars().any(char::is_whitespace) {
            return Err(GroupNamePrefixError::ContainsWhitespace);
        }

        if value.ends_with(PROD_SUFFIX) || value.ends_with(STAGE_SUFFIX) {
            return Err(GroupNamePrefixError::HasRoleSuffix(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the group serving production traffic.
    pub fn prod_name(&self) -> String {
        format!("{}{}", self.0, PROD_SUFFIX)
    }

    /// Name of the group parked behind the stage listener.
    pub fn stage_name(&self) -> String {
        format!("{}{}", self.0, STAGE_SUFFIX)
    }
}

impl fmt::Display for GroupNamePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for GroupNamePrefix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GroupNamePrefix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        GroupNamePrefix::new(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_append_suffixes() {
        let prefix = GroupNamePrefix::new("checkout").unwrap();
        assert_eq!(prefix.prod_name(), "checkout__prod");
        assert_eq!(prefix.stage_name(), "checkout__stage");
    }

    #[test]
    fn rejects_empty_prefix() {
        assert!(matches!(
            GroupNamePrefix::new(""),
            Err(GroupNamePrefixError::Empty)
        ));
    }

    #[test]
    fn rejects_whitespace() {
        assert!(matches!(
            GroupNamePrefix::new("check out"),
            Err(GroupNamePrefixError::ContainsWhitespace)
        ));
    }

    #[test]
    fn rejects_prefix_that_already_has_role() {
        assert!(matches!(
            GroupNamePrefix::new("checkout__prod"),
            Err(GroupNamePrefixError::HasRoleSuffix(_))
        ));
    }

    #[test]
    fn rejects_overlong_prefix() {
        let long = "a".repeat(250);
        assert!(matches!(
            GroupNamePrefix::new(&long),
            Err(GroupNamePrefixError::TooLong(_))
        ));
    }

    #[test]
    fn deserialize_validates() {
        let ok: GroupNamePrefix = serde_yaml::from_str("checkout").unwrap();
        assert_eq!(ok.as_str(), "checkout");
        assert!(serde_yaml::from_str::<GroupNamePrefix>("\"\"").is_err());
    }
}
