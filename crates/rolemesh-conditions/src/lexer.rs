// SPDX-License-Identifier: Apache-2.0

use chumsky::prelude::*;

use crate::tokens::Token;

/// Fact names start with a letter or `_` and may contain `:` and `.`
/// separators, e.g. `cluster:mode` or `settings:storage.volumes_ceph.value`.
pub(crate) fn is_fact_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_fact_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.')
}

pub(crate) fn lexer(
) -> impl Parser<char, Vec<(Token, std::ops::Range<usize>)>, Error = Simple<char>> {
    let int = just('-')
        .or_not()
        .then(text::int(10))
        .try_map(|(sign, digits): (Option<char>, String), span| {
            let raw = match sign {
                Some(_) => format!("-{digits}"),
                None => digits,
            };
            raw.parse::<i64>()
                .map(Token::Int)
                .map_err(|_| Simple::custom(span, "integer literal out of range"))
        });

    let single_quoted = just('\'')
        .ignore_then(filter(|c| *c != '\'').repeated().collect::<String>())
        .then_ignore(just('\''));
    let double_quoted = just('"')
        .ignore_then(filter(|c| *c != '"').repeated().collect::<String>())
        .then_ignore(just('"'));
    let string = single_quoted.or(double_quoted).map(Token::Str);

    let word = filter(|c: &char| is_fact_start(*c))
        .then(filter(|c: &char| is_fact_char(*c)).repeated())
        .map(|(first, rest)| {
            let mut raw = String::with_capacity(rest.len() + 1);
            raw.push(first);
            raw.extend(rest);
            match raw.as_str() {
                "and" => Token::KwAnd,
                "or" => Token::KwOr,
                "not" => Token::KwNot,
                "true" => Token::True,
                "false" => Token::False,
                "null" => Token::Null,
                _ => Token::Ident(raw),
            }
        });

    let op = choice::<_, Simple<char>>((
        just("==").to(Token::CmpEq),
        just("!=").to(Token::CmpNeq),
        just('+').to(Token::Plus),
        just('*').to(Token::Star),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
    ));

    choice::<_, Simple<char>>((int, string, op, word))
        .map_with_span(|tok, span| (tok, span))
        .padded()
        .repeated()
        .then_ignore(end())
}
