// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub const ROLE_NAME_MAX_LEN: usize = 64;

pub fn parse_role_name(input: &str) -> Result<RoleName, ValidationError> {
    RoleName::parse(input)
}

macro_rules! row_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(ReleaseId);
row_id!(ClusterId);
row_id!(NodeId);
row_id!(TagId);

/// Role identifier within a release: `[A-Za-z0-9_]+`, at most
/// [`ROLE_NAME_MAX_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
#[non_exhaustive]
pub struct RoleName(String);

impl RoleName {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.is_empty() {
            return Err(ValidationError("role name must not be empty".to_string()));
        }
        if input.chars().count() > ROLE_NAME_MAX_LEN {
            return Err(ValidationError(format!(
                "role name exceeds max length {ROLE_NAME_MAX_LEN}"
            )));
        }
        if !input.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ValidationError(format!(
                "role name '{input}' must match [A-Za-z0-9_]+"
            )));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoleName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl Display for RoleName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_name_rejects_special_symbols_and_overlong_input() {
        assert!(RoleName::parse("@#$%^&*()").is_err());
        assert!(RoleName::parse("controller-2").is_err());
        assert!(RoleName::parse(&"a".repeat(ROLE_NAME_MAX_LEN + 1)).is_err());
        assert_eq!(
            RoleName::parse("new_controller").expect("valid").as_str(),
            "new_controller"
        );
    }
}
