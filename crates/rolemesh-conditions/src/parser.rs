// SPDX-License-Identifier: Apache-2.0

use chumsky::prelude::*;
use chumsky::Stream;
use rolemesh_model::ConditionSource;
use serde_json::{Map, Value};

use crate::ast::{CompareOp, Condition};
use crate::errors::{to_syntax_error, ConditionSyntaxError};
use crate::facts::FactValue;
use crate::lexer::{is_fact_char, is_fact_start, lexer};
use crate::tokens::Token;

type Spanned = (Token, std::ops::Range<usize>);

fn tokenize(source: &str) -> Result<Vec<Spanned>, ConditionSyntaxError> {
    lexer().parse(source).map_err(|errs| {
        errs.into_iter()
            .next()
            .map(to_syntax_error)
            .unwrap_or_else(|| ConditionSyntaxError::new("invalid condition"))
    })
}

fn first_error(errs: Vec<Simple<Token>>) -> ConditionSyntaxError {
    errs.into_iter()
        .next()
        .map(to_syntax_error)
        .unwrap_or_else(|| ConditionSyntaxError::new("invalid condition"))
}

fn is_literal(token: &Token) -> bool {
    matches!(
        token,
        Token::Str(_) | Token::Int(_) | Token::True | Token::False | Token::Null
    )
}

/// A comparison operator pairs a fact with a literal in either order. The
/// grammar can read a lone fact as a boolean, so a missing right operand is
/// reported here where the operator is known.
fn check_operands(source: &str, tokens: &[Spanned]) -> Result<(), ConditionSyntaxError> {
    for (i, (token, _)) in tokens.iter().enumerate().skip(1) {
        if !matches!(token, Token::CmpEq | Token::CmpNeq) {
            continue;
        }
        let wants_literal = match &tokens[i - 1].0 {
            Token::Ident(_) => true,
            prev if is_literal(prev) => false,
            _ => continue,
        };
        let next = tokens.get(i + 1);
        let fits = next.is_some_and(|(next, _)| {
            if wants_literal {
                is_literal(next)
            } else {
                matches!(next, Token::Ident(_))
            }
        });
        if fits {
            continue;
        }
        let expected = if wants_literal { "a literal" } else { "a fact name" };
        let (found, at) = match next {
            Some((next, span)) => (format!("'{next}'"), span.clone()),
            None => ("end of input".to_string(), source.len()..source.len()),
        };
        return Err(ConditionSyntaxError {
            message: format!("expected {expected} after '{token}', found {found}"),
            start: at.start,
            end: at.end,
        });
    }
    Ok(())
}

fn fold_items(mut items: Vec<Condition>, wrap: fn(Vec<Condition>) -> Condition) -> Condition {
    if items.len() == 1 {
        items.remove(0)
    } else {
        wrap(items)
    }
}

fn condition_parser() -> impl Parser<Token, Condition, Error = Simple<Token>> {
    let ident = select! { Token::Ident(s) => s };
    let literal = select! {
        Token::Str(s) => FactValue::Str(s),
        Token::Int(n) => FactValue::Int(n),
        Token::True => FactValue::Bool(true),
        Token::False => FactValue::Bool(false),
        Token::Null => FactValue::Null,
    };
    let cmp_op = choice::<_, Simple<Token>>((
        just(Token::CmpEq).to(CompareOp::Eq),
        just(Token::CmpNeq).to(CompareOp::Neq),
    ));

    recursive(|expr| {
        let fact_first = ident
            .clone()
            .then(cmp_op.clone())
            .then(literal.clone())
            .map(|((field, op), literal)| Condition::Comparison { field, op, literal });
        let literal_first = literal
            .then(cmp_op)
            .then(ident.clone())
            .map(|((literal, op), field)| Condition::Comparison { field, op, literal });
        let atom = choice::<_, Simple<Token>>((
            fact_first,
            literal_first,
            ident.map(|name| Condition::BoolFact { name }),
            expr.delimited_by(just(Token::LParen), just(Token::RParen)),
        ));
        let unary = just(Token::KwNot)
            .repeated()
            .then(atom)
            .foldr(|_, inner| Condition::Not {
                inner: Box::new(inner),
            });
        let and = unary
            .separated_by(just(Token::KwAnd))
            .at_least(1)
            .map(|items| fold_items(items, |items| Condition::And { items }));
        and.separated_by(just(Token::KwOr))
            .at_least(1)
            .map(|items| fold_items(items, |items| Condition::Or { items }))
    })
}

fn size_parser() -> impl Parser<Token, u64, Error = Simple<Token>> {
    let int = select! { Token::Int(n) => n }.try_map(|n, span| {
        u64::try_from(n).map_err(|_| Simple::custom(span, "size must not be negative"))
    });

    recursive(|expr| {
        let atom = int.or(expr.delimited_by(just(Token::LParen), just(Token::RParen)));
        let product = atom
            .clone()
            .then(just(Token::Star).ignore_then(atom).repeated())
            .try_map(|(first, rest), span| {
                rest.into_iter()
                    .try_fold(first, u64::checked_mul)
                    .ok_or_else(|| Simple::custom(span, "size expression overflows"))
            });
        product
            .clone()
            .then(just(Token::Plus).ignore_then(product).repeated())
            .try_map(|(first, rest), span| {
                rest.into_iter()
                    .try_fold(first, u64::checked_add)
                    .ok_or_else(|| Simple::custom(span, "size expression overflows"))
            })
    })
}

fn token_stream(
    source: &str,
    tokens: Vec<Spanned>,
) -> Stream<'static, Token, std::ops::Range<usize>, std::vec::IntoIter<Spanned>> {
    let eoi = source.len()..source.len() + 1;
    Stream::from_iter(eoi, tokens.into_iter())
}

pub(crate) fn parse_expression(source: &str) -> Result<Condition, ConditionSyntaxError> {
    let tokens = tokenize(source)?;
    check_operands(source, &tokens)?;
    condition_parser()
        .then_ignore(end())
        .parse(token_stream(source, tokens))
        .map_err(first_error)
}

/// Evaluates a non-negative integer expression built from `+`, `*` and
/// parentheses.
pub fn parse_size_expression(source: &str) -> Result<u64, ConditionSyntaxError> {
    let tokens = tokenize(source)?;
    size_parser()
        .then_ignore(end())
        .parse(token_stream(source, tokens))
        .map_err(first_error)
}

/// `{fact: literal, ...}`: every listed fact equals its literal. Nested
/// objects extend the fact name with `.`.
pub(crate) fn compile_mapping(map: &Map<String, Value>) -> Result<Condition, ConditionSyntaxError> {
    let mut items = Vec::new();
    collect_mapping(map, "", &mut items)?;
    match items.len() {
        0 => Err(ConditionSyntaxError::new(
            "condition mapping must name at least one fact",
        )),
        1 => Ok(items.remove(0)),
        _ => Ok(Condition::And { items }),
    }
}

fn collect_mapping(
    map: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<Condition>,
) -> Result<(), ConditionSyntaxError> {
    for (key, value) in map {
        let field = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if !is_fact_name(&field) {
            return Err(ConditionSyntaxError::new(format!(
                "invalid fact name '{field}' in condition mapping"
            )));
        }
        if let Value::Object(nested) = value {
            if nested.is_empty() {
                return Err(ConditionSyntaxError::new(format!(
                    "condition mapping for '{field}' must not be empty"
                )));
            }
            collect_mapping(nested, &field, out)?;
            continue;
        }
        let literal = FactValue::from_json(value).ok_or_else(|| {
            ConditionSyntaxError::new(format!(
                "unsupported literal for '{field}' in condition mapping"
            ))
        })?;
        out.push(Condition::Comparison {
            field,
            op: CompareOp::Eq,
            literal,
        });
    }
    Ok(())
}

fn is_fact_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_fact_start(first) => chars.all(is_fact_char),
        _ => false,
    }
}

impl Condition {
    pub fn parse(source: &str) -> Result<Self, ConditionSyntaxError> {
        parse_expression(source)
    }

    pub fn compile(source: &ConditionSource) -> Result<Self, ConditionSyntaxError> {
        match source {
            ConditionSource::Expression(text) => parse_expression(text),
            ConditionSource::Mapping(map) => compile_mapping(map),
            _ => Err(ConditionSyntaxError::new("unsupported condition shape")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_not_fact_names() {
        assert!(parse_expression("and == 1").is_err());
        assert!(is_fact_name("cluster:mode"));
        assert!(!is_fact_name("9lives"));
    }

    #[test]
    fn size_expression_respects_precedence() {
        assert_eq!(parse_size_expression("2 + 3 * 4").expect("size"), 14);
        assert_eq!(parse_size_expression("(2 + 3) * 4").expect("size"), 20);
    }
}
