// SPDX-License-Identifier: Apache-2.0

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    True,
    False,
    Null,
    KwAnd,
    KwOr,
    KwNot,
    CmpEq,
    CmpNeq,
    Plus,
    Star,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => write!(f, "{s}"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::Int(n) => write!(f, "{n}"),
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Null => f.write_str("null"),
            Self::KwAnd => f.write_str("and"),
            Self::KwOr => f.write_str("or"),
            Self::KwNot => f.write_str("not"),
            Self::CmpEq => f.write_str("=="),
            Self::CmpNeq => f.write_str("!="),
            Self::Plus => f.write_str("+"),
            Self::Star => f.write_str("*"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
        }
    }
}
