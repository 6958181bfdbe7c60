// SPDX-License-Identifier: Apache-2.0

use crate::ids::{ClusterId, NodeId, ReleaseId};
use crate::role::VolumeMapping;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// `releases.volumes_metadata`: the volume catalog plus per-role mappings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumesMetadata {
    #[serde(default)]
    pub volumes: Vec<VolumeSpec>,
    #[serde(default)]
    pub volumes_roles_mapping: BTreeMap<String, Vec<VolumeMapping>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl VolumesMetadata {
    #[must_use]
    pub fn volume_ids(&self) -> BTreeSet<String> {
        self.volumes.iter().map(|v| v.id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub id: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl VolumeSpec {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub id: ReleaseId,
    pub name: String,
}

/// Input for creating a release: name, volume catalog and optional
/// forward-declared tag names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRelease {
    pub name: String,
    #[serde(default)]
    pub volume_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_metadata: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub id: ClusterId,
    pub name: String,
    pub release_id: ReleaseId,
    pub mode: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub hostname: String,
    pub cluster_id: Option<ClusterId>,
    pub roles: Vec<String>,
    pub pending_roles: Vec<String>,
    pub primary_roles: Vec<String>,
}

impl NodeRecord {
    /// Current and pending roles, deduplicated, current first.
    #[must_use]
    pub fn all_roles(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.roles
            .iter()
            .chain(self.pending_roles.iter())
            .map(String::as_str)
            .filter(|r| seen.insert(*r))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewNode {
    pub hostname: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub pending_roles: Vec<String>,
    #[serde(default)]
    pub primary_roles: Vec<String>,
}
