// SPDX-License-Identifier: Apache-2.0

use crate::ids::{NodeId, TagId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum OwnerType {
    Release,
    Cluster,
    Plugin,
}

impl OwnerType {
    pub const ALL: [Self; 3] = [Self::Release, Self::Cluster, Self::Plugin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Cluster => "cluster",
            Self::Plugin => "plugin",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input {
            "release" => Ok(Self::Release),
            "cluster" => Ok(Self::Cluster),
            "plugin" => Ok(Self::Plugin),
            other => Err(ValidationError(format!(
                "owner type must be one of release|cluster|plugin, got '{other}'"
            ))),
        }
    }
}

impl Display for OwnerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub tag: String,
    pub owner_type: OwnerType,
    pub owner_id: i64,
    pub has_primary: bool,
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeTagAssignment {
    pub node_id: NodeId,
    pub tag_id: TagId,
    pub is_primary: bool,
}

/// A node binding as seen from the node: the tag row and whether this node
/// holds its primary designation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeTagView {
    pub tag: Tag,
    pub is_primary: bool,
}
