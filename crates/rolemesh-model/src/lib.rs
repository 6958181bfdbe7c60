// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Typed documents and entities shared by the rolemesh crates.
//!
//! ```compile_fail
//! use rolemesh_model::RestrictionAction;
//!
//! fn exhaustive_match(a: RestrictionAction) -> &'static str {
//!     match a {
//!         RestrictionAction::Hide => "h",
//!         RestrictionAction::Disable => "d",
//!     }
//! }
//! ```

mod ids;
mod release;
mod role;
mod tag;

pub use ids::{
    parse_role_name, ClusterId, NodeId, ReleaseId, RoleName, TagId, ValidationError,
    ROLE_NAME_MAX_LEN,
};
pub use release::{
    ClusterRecord, NewNode, NewRelease, NodeRecord, ReleaseRecord, VolumeSpec, VolumesMetadata,
};
pub use role::{
    ActiveRestriction, AllocateSize, ConditionSource, DetailedRestriction, EffectiveLimits, Limit,
    LimitOverride, Restriction, RestrictionAction, RoleDocument, RoleMeta, VolumeMapping,
    ALLOCATE_ALL, RESTRICTION_CONDITION_KEY,
};
pub use tag::{NodeTagAssignment, NodeTagView, OwnerType, Tag};

pub const CRATE_NAME: &str = "rolemesh-model";
