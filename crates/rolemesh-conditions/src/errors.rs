// SPDX-License-Identifier: Apache-2.0

use chumsky::error::Simple;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::Hash;

/// A condition or size expression that failed to lex or parse. `start`/`end`
/// are byte offsets into the source; mapping-shorthand errors carry `0..0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSyntaxError {
    pub message: String,
    pub start: usize,
    pub end: usize,
}

impl ConditionSyntaxError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: 0,
            end: 0,
        }
    }
}

impl Display for ConditionSyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.start == 0 && self.end == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} at {}..{}", self.message, self.start, self.end)
        }
    }
}

impl std::error::Error for ConditionSyntaxError {}

pub(crate) fn to_syntax_error<T: Display + Hash + Eq>(err: Simple<T>) -> ConditionSyntaxError {
    let span = err.span();
    ConditionSyntaxError {
        message: err.to_string(),
        start: span.start,
        end: span.end,
    }
}
