// SPDX-License-Identifier: Apache-2.0

use rolemesh_conditions::{Condition, Facts};
use rolemesh_model::{ActiveRestriction, EffectiveLimits, RoleDocument};

/// A role document that passed validation, with its conditions compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRole {
    document: RoleDocument,
    limit_conditions: Vec<Condition>,
    restriction_conditions: Vec<Condition>,
}

impl ValidatedRole {
    pub(crate) fn new(
        document: RoleDocument,
        limit_conditions: Vec<Condition>,
        restriction_conditions: Vec<Condition>,
    ) -> Self {
        Self {
            document,
            limit_conditions,
            restriction_conditions,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.document.name
    }

    #[must_use]
    pub fn document(&self) -> &RoleDocument {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> RoleDocument {
        self.document
    }

    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.document.meta.has_primary()
    }

    /// Overall bounds with overrides applied in order; for each bound the
    /// first override whose condition holds and which sets it wins.
    #[must_use]
    pub fn effective_limits(&self, facts: &Facts) -> EffectiveLimits {
        let Some(limit) = &self.document.meta.limits else {
            return EffectiveLimits::default();
        };
        let mut out = EffectiveLimits {
            min: limit.min,
            max: limit.max,
            recommended: limit.recommended,
            messages: Vec::new(),
        };
        let (mut min_set, mut max_set, mut recommended_set) = (false, false, false);

        for (item, cond) in limit.overrides().iter().zip(&self.limit_conditions) {
            if !cond.evaluate(facts) {
                continue;
            }
            if let (Some(v), false) = (item.min, min_set) {
                out.min = Some(v);
                min_set = true;
            }
            if let (Some(v), false) = (item.max, max_set) {
                out.max = Some(v);
                max_set = true;
            }
            if let (Some(v), false) = (item.recommended, recommended_set) {
                out.recommended = Some(v);
                recommended_set = true;
            }
            if let Some(message) = &item.message {
                out.messages.push(message.clone());
            }
        }
        out
    }

    #[must_use]
    pub fn active_restrictions(&self, facts: &Facts) -> Vec<ActiveRestriction> {
        self.document
            .meta
            .restrictions()
            .iter()
            .zip(&self.restriction_conditions)
            .enumerate()
            .filter(|(_, (_, cond))| cond.evaluate(facts))
            .map(|(index, (restriction, _))| ActiveRestriction {
                index,
                action: restriction.action(),
                message: restriction.message().map(str::to_string),
            })
            .collect()
    }
}
