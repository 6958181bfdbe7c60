// SPDX-License-Identifier: Apache-2.0

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A role definition as submitted by operators and returned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleDocument {
    pub name: String,
    pub meta: RoleMeta,
    pub volumes_roles_mapping: Vec<VolumeMapping>,
}

/// Role metadata. Attributes without a typed field survive in `extra`
/// so a stored role serializes back to the document it was created from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Vec<Restriction>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RoleMeta {
    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.has_primary.unwrap_or(false)
    }

    #[must_use]
    pub fn conflicts(&self) -> &[String] {
        self.conflicts.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn update_required(&self) -> &[String] {
        self.update_required.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn restrictions(&self) -> &[Restriction] {
        self.restrictions.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VolumeMapping {
    pub id: String,
    pub allocate_size: AllocateSize,
}

/// `"all"`, a size expression such as `"2 * 1024"`, or a plain byte count.
/// Any other JSON value decodes as `Other` and is rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum AllocateSize {
    Bytes(u64),
    Text(String),
    Other(Value),
}

pub const ALLOCATE_ALL: &str = "all";

impl AllocateSize {
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::Text(s) if s == ALLOCATE_ALL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<LimitOverride>>,
}

impl Limit {
    #[must_use]
    pub fn overrides(&self) -> &[LimitOverride] {
        self.overrides.as_deref().unwrap_or(&[])
    }
}

/// Conditional replacement for some of the limit bounds; only the fields it
/// sets take part in resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitOverride {
    pub condition: ConditionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The limit bounds in effect once overrides are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffectiveLimits {
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub recommended: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

/// Expression text or the `{fact: literal}` shorthand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum ConditionSource {
    Expression(String),
    Mapping(Map<String, Value>),
}

/// A mapping with a `condition` key is always the detailed form; anything
/// else is a bare condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum Restriction {
    Detailed(DetailedRestriction),
    Bare(ConditionSource),
}

pub const RESTRICTION_CONDITION_KEY: &str = "condition";

impl<'de> Deserialize<'de> for Restriction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let detailed = value
            .as_object()
            .is_some_and(|map| map.contains_key(RESTRICTION_CONDITION_KEY));
        if detailed {
            serde_json::from_value(value)
                .map(Self::Detailed)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Bare)
                .map_err(D::Error::custom)
        }
    }
}

impl Restriction {
    #[must_use]
    pub fn condition(&self) -> &ConditionSource {
        match self {
            Self::Detailed(d) => &d.condition,
            Self::Bare(c) => c,
        }
    }

    #[must_use]
    pub fn action(&self) -> RestrictionAction {
        match self {
            Self::Detailed(d) => d.action.unwrap_or_default(),
            Self::Bare(_) => RestrictionAction::Hide,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Detailed(d) => d.message.as_deref(),
            Self::Bare(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedRestriction {
    pub condition: ConditionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<RestrictionAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RestrictionAction {
    #[default]
    Hide,
    Disable,
}

impl RestrictionAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Disable => "disable",
        }
    }
}

/// A restriction whose condition holds for the facts it was evaluated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRestriction {
    pub index: usize,
    pub action: RestrictionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
