// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Condition grammar used by role limits and restrictions.
//!
//! Expressions compare namespaced facts against literals and combine the
//! results with `and`, `or`, `not` and parentheses:
//!
//! ```
//! use rolemesh_conditions::{evaluate, Facts};
//!
//! let facts = Facts::new().with("cluster:mode", "multinode");
//! assert!(evaluate("cluster:mode == 'multinode'", &facts).unwrap_or(false));
//! assert!(!evaluate("not cluster:mode == 'multinode'", &facts).unwrap_or(true));
//! ```
//!
//! The same crate evaluates the integer size expressions accepted by
//! `allocate_size`.

mod ast;
mod errors;
mod facts;
mod lexer;
mod parser;
mod tokens;

pub use ast::{CompareOp, Condition};
pub use errors::ConditionSyntaxError;
pub use facts::{FactValue, Facts};
pub use parser::parse_size_expression;

pub const CRATE_NAME: &str = "rolemesh-conditions";

/// Parses `source` and evaluates it once against `facts`.
pub fn evaluate(source: &str, facts: &Facts) -> Result<bool, ConditionSyntaxError> {
    Ok(Condition::parse(source)?.evaluate(facts))
}
