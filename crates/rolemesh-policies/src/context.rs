// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

/// What a role document is validated against: the release's volume catalog,
/// the roles it already defines and the tag names it forward-declares.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReleaseContext {
    pub known_volume_ids: BTreeSet<String>,
    pub existing_roles: BTreeSet<String>,
    pub declared_tags: BTreeSet<String>,
}

impl ReleaseContext {
    #[must_use]
    pub fn new<I, S>(known_volume_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_volume_ids: known_volume_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.existing_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_declared_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub(crate) fn resolves(&self, reference: &str, own_name: &str) -> bool {
        reference == own_name
            || self.existing_roles.contains(reference)
            || self.declared_tags.contains(reference)
    }
}
