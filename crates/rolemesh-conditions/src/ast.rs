// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::facts::{FactValue, Facts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum CompareOp {
    Eq,
    Neq,
}

impl CompareOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Neq => "!=",
        }
    }
}

/// Parsed condition. Build it once with [`Condition::parse`] or
/// [`Condition::compile`] and evaluate it as often as needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Condition {
    Comparison {
        field: String,
        op: CompareOp,
        literal: FactValue,
    },
    And {
        items: Vec<Condition>,
    },
    Or {
        items: Vec<Condition>,
    },
    Not {
        inner: Box<Condition>,
    },
    BoolFact {
        name: String,
    },
}

impl Condition {
    /// Missing facts compare as `null`; a missing bare fact is false.
    #[must_use]
    pub fn evaluate(&self, facts: &Facts) -> bool {
        match self {
            Self::Comparison { field, op, literal } => {
                let equal = match facts.get(field) {
                    Some(value) => value == literal,
                    None => *literal == FactValue::Null,
                };
                match op {
                    CompareOp::Eq => equal,
                    CompareOp::Neq => !equal,
                }
            }
            Self::And { items } => items.iter().all(|c| c.evaluate(facts)),
            Self::Or { items } => items.iter().any(|c| c.evaluate(facts)),
            Self::Not { inner } => !inner.evaluate(facts),
            Self::BoolFact { name } => facts.get(name).is_some_and(FactValue::is_truthy),
        }
    }

    /// Fact names referenced anywhere in the condition, in first-seen order.
    #[must_use]
    pub fn fact_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fact_names(&mut out);
        out
    }

    fn collect_fact_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Comparison { field: name, .. } | Self::BoolFact { name } => {
                if !out.contains(&name.as_str()) {
                    out.push(name.as_str());
                }
            }
            Self::And { items } | Self::Or { items } => {
                for item in items {
                    item.collect_fact_names(out);
                }
            }
            Self::Not { inner } => inner.collect_fact_names(out),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comparison { field, op, literal } => {
                write!(f, "{field} {} {literal}", op.as_str())
            }
            Self::And { items } => write_joined(f, items, " and "),
            Self::Or { items } => write_joined(f, items, " or "),
            Self::Not { inner } => write!(f, "not ({inner})"),
            Self::BoolFact { name } => f.write_str(name),
        }
    }
}

fn write_joined(f: &mut Formatter<'_>, items: &[Condition], sep: &str) -> std::fmt::Result {
    f.write_str("(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(")")
}
