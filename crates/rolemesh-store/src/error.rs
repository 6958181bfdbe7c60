// SPDX-License-Identifier: Apache-2.0

use rolemesh_core::ErrorCode;
use rolemesh_model::{ClusterId, NodeId, ReleaseId, TagId};
use rolemesh_policies::ValidationErrors;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum StoreErrorCode {
    Validation,
    RoleNotFound,
    NameMismatch,
    DuplicateRole,
    RoleInUse,
    UnknownRelease,
    UnknownCluster,
    UnknownNode,
    UnknownTag,
    PrimaryNotAllowed,
    ForeignTag,
    Config,
    Storage,
}

impl StoreErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::RoleNotFound => "role_not_found",
            Self::NameMismatch => "name_mismatch",
            Self::DuplicateRole => "duplicate_role",
            Self::RoleInUse => "role_in_use",
            Self::UnknownRelease => "unknown_release",
            Self::UnknownCluster => "unknown_cluster",
            Self::UnknownNode => "unknown_node",
            Self::UnknownTag => "unknown_tag",
            Self::PrimaryNotAllowed => "primary_not_allowed",
            Self::ForeignTag => "foreign_tag",
            Self::Config => "config_error",
            Self::Storage => "storage_error",
        }
    }

    /// Machine-readable code shared with the CLI and the API layer.
    #[must_use]
    pub const fn error_code(self) -> ErrorCode {
        match self {
            Self::Validation => ErrorCode::ValidationFailed,
            Self::RoleNotFound => ErrorCode::RoleNotFound,
            Self::UnknownRelease | Self::UnknownCluster | Self::UnknownNode | Self::UnknownTag => {
                ErrorCode::NotFound
            }
            Self::NameMismatch => ErrorCode::NameMismatch,
            Self::DuplicateRole => ErrorCode::DuplicateRole,
            Self::RoleInUse => ErrorCode::RoleInUse,
            Self::PrimaryNotAllowed => ErrorCode::PrimaryNotAllowed,
            Self::ForeignTag => ErrorCode::UnknownReference,
            Self::Config => ErrorCode::UsageError,
            Self::Storage => ErrorCode::StorageFailure,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum StoreError {
    Validation(ValidationErrors),
    RoleNotFound { release_id: ReleaseId, name: String },
    NameMismatch { expected: String, found: String },
    DuplicateRole { release_id: ReleaseId, name: String },
    RoleInUse { name: String, node_ids: Vec<NodeId> },
    UnknownRelease(ReleaseId),
    UnknownCluster(ClusterId),
    UnknownNode(NodeId),
    UnknownTag(TagId),
    PrimaryNotAllowed { tag_id: TagId, tag: String },
    ForeignTag { tag_id: TagId, node_id: NodeId },
    Config(String),
    Storage(String),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> StoreErrorCode {
        match self {
            Self::Validation(_) => StoreErrorCode::Validation,
            Self::RoleNotFound { .. } => StoreErrorCode::RoleNotFound,
            Self::NameMismatch { .. } => StoreErrorCode::NameMismatch,
            Self::DuplicateRole { .. } => StoreErrorCode::DuplicateRole,
            Self::RoleInUse { .. } => StoreErrorCode::RoleInUse,
            Self::UnknownRelease(_) => StoreErrorCode::UnknownRelease,
            Self::UnknownCluster(_) => StoreErrorCode::UnknownCluster,
            Self::UnknownNode(_) => StoreErrorCode::UnknownNode,
            Self::UnknownTag(_) => StoreErrorCode::UnknownTag,
            Self::PrimaryNotAllowed { .. } => StoreErrorCode::PrimaryNotAllowed,
            Self::ForeignTag { .. } => StoreErrorCode::ForeignTag,
            Self::Config(_) => StoreErrorCode::Config,
            Self::Storage(_) => StoreErrorCode::Storage,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errs) => write!(f, "{errs}"),
            Self::RoleNotFound { release_id, name } => {
                write!(f, "Role {name} is not found for the release {release_id}")
            }
            Self::NameMismatch { expected, found } => write!(
                f,
                "Role name '{found}' in the document does not match the role '{expected}' being updated"
            ),
            Self::DuplicateRole { release_id, name } => {
                write!(f, "Role {name} already exists for the release {release_id}")
            }
            Self::RoleInUse { name, node_ids } => {
                let ids: Vec<String> = node_ids.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "Can't delete roles that are assigned to some node: role {name} is used by nodes {}",
                    ids.join(", ")
                )
            }
            Self::UnknownRelease(id) => write!(f, "Release {id} is not found"),
            Self::UnknownCluster(id) => write!(f, "Cluster {id} is not found"),
            Self::UnknownNode(id) => write!(f, "Node {id} is not found"),
            Self::UnknownTag(id) => write!(f, "Tag {id} is not found"),
            Self::PrimaryNotAllowed { tag_id, tag } => {
                write!(f, "Tag {tag} ({tag_id}) can not be primary")
            }
            Self::ForeignTag { tag_id, node_id } => write!(
                f,
                "Tag {tag_id} does not belong to the release or cluster of node {node_id}"
            ),
            Self::Config(msg) => write!(f, "config_error: {msg}"),
            Self::Storage(msg) => write!(f, "storage_error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationErrors> for StoreError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

pub(crate) fn storage(err: impl Display) -> StoreError {
    StoreError::Storage(err.to_string())
}
