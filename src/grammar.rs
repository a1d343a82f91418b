// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Parsers for every syntactic construct the engine recognizes, producing
// `ast::AstNode` values. Built on top of `parser.rs`'s combinator kernel;
// structural recursion (concatenation, alternation) is written as plain
// loops over the primitives rather than pre-built `Parser` values, since
// each step needs to thread `GrammarOptions` through without fighting
// closure-capture lifetimes.
//
// General grammar (informal EBNF):
//
//     Root          -> Alternation End
//     Alternation   -> Concatenation ( '|' Concatenation )*
//     Concatenation -> Atom*
//     Atom          -> ( Group | Match | Backreference | Anchor ) Quantifier?
//     Group         -> '(' ( '?:' )? Alternation ')'
//     Match         -> Character | '.' | CharacterSet
//     CharacterSet  -> '[' '^'? ( Range | EscapedClass | Literal )+ ']'
//                    | '\d' | '\D' | '\w' | '\W' | '\s' | '\S'
//     Anchor        -> '^' | '$' | '\A' | '\z' | '\Z' | '\b' | '\B' | '\G'
//     Backreference -> '\' DecimalDigit+
//     Quantifier    -> '?' | '*' | '+' | '{' Number ( ',' Number? )? '}'

use crate::ast::{AnchorKind, AstNode, MatchKind, QuantifierKind, Unit};
use crate::charset::CharSet;
use crate::parser::{
    any_char, char_excluding, literal, map, number, offset_of, one_of, optional, required,
    ParseErr, PResult, Parser,
};

/// Parse-time configuration: the two engine options that change what a
/// pattern's syntax *means* rather than how matching proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrammarOptions {
    pub multiline: bool,
    pub dot_matches_line_separators: bool,
}

/// A compile-time syntax fault: a human-readable message and the byte
/// offset into the pattern where it was detected.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

/// Parses a complete pattern string into its root AST node.
pub fn parse_root_expression(pattern: &str, opts: &GrammarOptions) -> Result<AstNode, SyntaxError> {
    match complete_alternation(pattern, opts) {
        Ok((_, node)) => Ok(AstNode::with_child(Unit::Root, node)),
        Err(ParseErr::Fatal { message, at }) => {
            Err(SyntaxError { message, offset: offset_of(pattern, at) })
        }
        Err(ParseErr::NoMatch) => {
            Err(SyntaxError { message: "invalid pattern".to_string(), offset: 0 })
        }
    }
}

fn complete_alternation<'a>(input: &'a str, opts: &GrammarOptions) -> PResult<'a, AstNode> {
    let (rest, node) = alternation(input, opts)?;
    if rest.is_empty() {
        Ok((rest, node))
    } else {
        Err(ParseErr::Fatal {
            message: format!("unexpected character `{}`", rest.chars().next().unwrap()),
            at: rest,
        })
    }
}

fn alternation<'a>(input: &'a str, opts: &GrammarOptions) -> PResult<'a, AstNode> {
    let (mut rest, first) = concatenation(input, opts)?;
    let mut alts = vec![first];
    loop {
        match literal("|")(rest) {
            Ok((after_bar, _)) => match concatenation(after_bar, opts) {
                Ok((r2, node)) => {
                    alts.push(node);
                    rest = r2;
                }
                Err(ParseErr::NoMatch) => {
                    // An empty alternative (e.g. `a|`) is a valid
                    // concatenation of zero atoms.
                    alts.push(AstNode::with_children(Unit::Expression, Vec::new()));
                    rest = after_bar;
                }
                Err(fatal) => return Err(fatal),
            },
            Err(ParseErr::NoMatch) => break,
            Err(fatal) => return Err(fatal),
        }
    }
    if alts.len() == 1 {
        Ok((rest, alts.pop().unwrap()))
    } else {
        Ok((rest, AstNode::with_children(Unit::Alternation, alts)))
    }
}

fn concatenation<'a>(input: &'a str, opts: &GrammarOptions) -> PResult<'a, AstNode> {
    let mut rest = input;
    let mut atoms = Vec::new();
    loop {
        match atom(rest, opts) {
            Ok((r2, node)) => {
                atoms.push(node);
                rest = r2;
            }
            Err(ParseErr::NoMatch) => break,
            Err(fatal) => return Err(fatal),
        }
    }
    Ok((rest, AstNode::with_children(Unit::Expression, atoms)))
}

fn atom<'a>(input: &'a str, opts: &GrammarOptions) -> PResult<'a, AstNode> {
    let (rest, base) = atom_base(input, opts)?;
    let (rest, q) = optional(quantifier())(rest)?;
    match q {
        Some(kind) => Ok((rest, AstNode::with_child(Unit::Quantifier(kind), base))),
        None => Ok((rest, base)),
    }
}

fn atom_base<'a>(input: &'a str, opts: &GrammarOptions) -> PResult<'a, AstNode> {
    match group(input, opts) {
        Err(ParseErr::NoMatch) => {}
        other => return other,
    }
    match backreference(input) {
        Err(ParseErr::NoMatch) => {}
        other => return other,
    }
    match anchor(input, opts) {
        Err(ParseErr::NoMatch) => {}
        other => return other,
    }
    match_atom(input, opts)
}

fn group<'a>(input: &'a str, opts: &GrammarOptions) -> PResult<'a, AstNode> {
    let (rest, _) = literal("(")(input)?;
    // Committed: from here on, a failure is a real syntax error, not "try
    // the next alternative in atom_base".
    let (rest, non_capturing) = optional(literal("?:"))(rest)?;
    let (rest, inner) = match alternation(rest, opts) {
        Ok(ok) => ok,
        Err(ParseErr::NoMatch) => (rest, AstNode::with_children(Unit::Expression, Vec::new())),
        Err(fatal) => return Err(fatal),
    };
    let (rest, _) = match literal(")")(rest) {
        Ok(ok) => ok,
        Err(ParseErr::NoMatch) => {
            return Err(ParseErr::Fatal { message: "unbalanced parenthesis: expected `)`".to_string(), at: rest })
        }
        Err(fatal) => return Err(fatal),
    };
    let index_placeholder = if non_capturing.is_some() { None } else { Some(0) };
    Ok((rest, AstNode::with_child(Unit::Group { index: index_placeholder }, inner)))
}

fn backreference(input: &str) -> PResult<'_, AstNode> {
    let (rest, _) = literal("\\")(input)?;
    let (rest, n) = match number()(rest) {
        Ok(ok) => ok,
        Err(ParseErr::NoMatch) => return Err(ParseErr::NoMatch),
        Err(fatal) => return Err(fatal),
    };
    if n == 0 {
        return Err(ParseErr::Fatal {
            message: "backreference index must be >= 1".to_string(),
            at: input,
        });
    }
    Ok((rest, AstNode::leaf(Unit::Backreference(n))))
}

fn anchor<'a>(input: &'a str, opts: &GrammarOptions) -> PResult<'a, AstNode> {
    if let Ok((rest, _)) = literal("^")(input) {
        let kind = if opts.multiline { AnchorKind::StartOfString } else { AnchorKind::StartOfStringOnly };
        return Ok((rest, AstNode::leaf(Unit::Anchor(kind))));
    }
    if let Ok((rest, _)) = literal("$")(input) {
        let kind = if opts.multiline { AnchorKind::EndOfString } else { AnchorKind::EndOfStringOnly };
        return Ok((rest, AstNode::leaf(Unit::Anchor(kind))));
    }
    if let Ok((rest, _)) = literal("\\A")(input) {
        return Ok((rest, AstNode::leaf(Unit::Anchor(AnchorKind::StartOfStringOnly))));
    }
    if let Ok((rest, _)) = literal("\\z")(input) {
        return Ok((rest, AstNode::leaf(Unit::Anchor(AnchorKind::EndOfStringOnly))));
    }
    if let Ok((rest, _)) = literal("\\Z")(input) {
        return Ok((rest, AstNode::leaf(Unit::Anchor(AnchorKind::EndOfStringOnlyNotNewline))));
    }
    if let Ok((rest, _)) = literal("\\b")(input) {
        return Ok((rest, AstNode::leaf(Unit::Anchor(AnchorKind::WordBoundary))));
    }
    if let Ok((rest, _)) = literal("\\B")(input) {
        return Ok((rest, AstNode::leaf(Unit::Anchor(AnchorKind::NonWordBoundary))));
    }
    if let Ok((rest, _)) = literal("\\G")(input) {
        return Ok((rest, AstNode::leaf(Unit::Anchor(AnchorKind::PreviousMatchEnd))));
    }
    Err(ParseErr::NoMatch)
}

fn match_atom<'a>(input: &'a str, opts: &GrammarOptions) -> PResult<'a, AstNode> {
    if let Ok((rest, set)) = predefined_class(input) {
        return Ok((rest, AstNode::leaf(Unit::Match(MatchKind::CharacterSet(set)))));
    }
    if let Ok((rest, set)) = character_class(input) {
        return Ok((rest, AstNode::leaf(Unit::Match(MatchKind::CharacterSet(set)))));
    }
    if let Ok((rest, _)) = literal(".")(input) {
        return Ok((
            rest,
            AstNode::leaf(Unit::Match(MatchKind::AnyCharacter {
                including_newline: opts.dot_matches_line_separators,
            })),
        ));
    }
    let (rest, c) = plain_character(input)?;
    Ok((rest, AstNode::leaf(Unit::Match(MatchKind::Character(c)))))
}

fn plain_character(input: &str) -> PResult<'_, char> {
    if let Ok((rest, _)) = literal("\\")(input) {
        let (rest, c) = any_char(rest).map_err(|_| ParseErr::Fatal {
            message: "dangling escape at end of pattern".to_string(),
            at: input,
        })?;
        return Ok((rest, c));
    }
    char_excluding("[]().|?*+^$\\")(input)
}

fn predefined_class(input: &str) -> PResult<'_, CharSet> {
    if let Ok((rest, _)) = literal("\\d")(input) {
        return Ok((rest, CharSet::digit()));
    }
    if let Ok((rest, _)) = literal("\\D")(input) {
        return Ok((rest, CharSet::not_digit()));
    }
    if let Ok((rest, _)) = literal("\\w")(input) {
        return Ok((rest, CharSet::word()));
    }
    if let Ok((rest, _)) = literal("\\W")(input) {
        return Ok((rest, CharSet::not_word()));
    }
    if let Ok((rest, _)) = literal("\\s")(input) {
        return Ok((rest, CharSet::whitespace()));
    }
    if let Ok((rest, _)) = literal("\\S")(input) {
        return Ok((rest, CharSet::not_whitespace()));
    }
    Err(ParseErr::NoMatch)
}

fn character_class(input: &str) -> PResult<'_, CharSet> {
    let (rest, _) = literal("[")(input)?;
    let (rest, negated) = optional(literal("^"))(rest)?;
    let mut ranges = Vec::new();
    let mut subsets = Vec::new();
    let mut cursor = rest;
    loop {
        if literal("]")(cursor).is_ok() {
            break;
        }
        if cursor.is_empty() {
            return Err(ParseErr::Fatal {
                message: "unbalanced character class: expected `]`".to_string(),
                at: cursor,
            });
        }
        if let Ok((r2, set)) = predefined_class(cursor) {
            subsets.push(set);
            cursor = r2;
            continue;
        }
        let (r2, lo) = class_literal(cursor)?;
        if let Ok((r3, _)) = literal("-")(r2) {
            if let Ok((r4, hi)) = class_literal(r3) {
                if hi < lo {
                    return Err(ParseErr::Fatal {
                        message: format!(
                            "invalid character class range: `{}` is greater than `{}`",
                            lo, hi
                        ),
                        at: cursor,
                    });
                }
                ranges.push((lo, hi));
                cursor = r4;
                continue;
            }
        }
        ranges.push((lo, lo));
        cursor = r2;
    }
    let (rest, _) = literal("]")(cursor)?;
    Ok((rest, CharSet::from_ranges_and_subsets(ranges, subsets, negated.is_some())))
}

fn class_literal(input: &str) -> PResult<'_, char> {
    if let Ok((rest, _)) = literal("\\")(input) {
        let (rest, c) = any_char(rest).map_err(|_| ParseErr::Fatal {
            message: "dangling escape at end of pattern".to_string(),
            at: input,
        })?;
        return Ok((rest, c));
    }
    char_excluding("]")(input)
}

fn quantifier<'a>() -> Parser<'a, QuantifierKind> {
    one_of(vec![
        map(literal("?"), |_| Some(QuantifierKind::ZeroOrOne)),
        map(literal("*"), |_| Some(QuantifierKind::ZeroOrMore)),
        map(literal("+"), |_| Some(QuantifierKind::OneOrMore)),
        crate::parser::of(counted_quantifier),
    ])
}

fn counted_quantifier(input: &str) -> PResult<'_, QuantifierKind> {
    let (rest, _) = literal("{")(input)?;
    let (rest, low) = required(number(), "expected a number after `{`")(rest)?;
    let (rest, upper) = optional(crate::parser::of(comma_then_optional_number))(rest)?;
    let (rest, _) = required(literal("}"), "expected `}` to close quantifier")(rest)?;
    let kind = match upper {
        None => QuantifierKind::Range { low, high: Some(low) },
        Some(None) => QuantifierKind::Range { low, high: None },
        Some(Some(high)) => {
            if low > high {
                return Err(ParseErr::Fatal {
                    message: format!("invalid quantifier range: {{{},{}}} has low > high", low, high),
                    at: input,
                });
            }
            QuantifierKind::Range { low, high: Some(high) }
        }
    };
    Ok((rest, kind))
}

fn comma_then_optional_number(input: &str) -> PResult<'_, Option<usize>> {
    let (rest, _) = literal(",")(input)?;
    let (rest, n) = optional(number())(rest)?;
    Ok((rest, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> GrammarOptions {
        GrammarOptions::default()
    }

    fn parse(pattern: &str) -> AstNode {
        parse_root_expression(pattern, &opts()).unwrap()
    }

    #[test]
    fn parses_simple_concatenation() {
        let root = parse("ab");
        let expr = root.only_child();
        assert_eq!(expr.unit, Unit::Expression);
        assert_eq!(expr.children.len(), 2);
    }

    #[test]
    fn parses_alternation() {
        let root = parse("a|b");
        assert_eq!(root.only_child().unit, Unit::Alternation);
    }

    #[test]
    fn parses_group_and_assigns_placeholder_index() {
        let root = parse("(a)");
        let group = &root.only_child().children[0];
        assert!(matches!(group.unit, Unit::Group { index: Some(_) }));
    }

    #[test]
    fn non_capturing_group_has_no_index() {
        let root = parse("(?:a)");
        let group = &root.only_child().children[0];
        assert!(matches!(group.unit, Unit::Group { index: None }));
    }

    #[test]
    fn parses_counted_quantifier_range() {
        let root = parse("a{2,4}");
        let quant = &root.only_child().children[0];
        assert_eq!(quant.unit, Unit::Quantifier(QuantifierKind::Range { low: 2, high: Some(4) }));
    }

    #[test]
    fn unbalanced_paren_is_a_fatal_error() {
        let err = parse_root_expression("(a", &opts()).unwrap_err();
        assert!(err.message.contains("parenthesis"));
    }

    #[test]
    fn invalid_quantifier_range_is_an_error() {
        let err = parse_root_expression("a{4,2}", &opts()).unwrap_err();
        assert!(err.message.contains("low > high"));
    }

    #[test]
    fn multiline_changes_anchor_kind() {
        let ml = GrammarOptions { multiline: true, ..Default::default() };
        let root = parse_root_expression("^a", &ml).unwrap();
        let anchor = &root.only_child().children[0];
        assert_eq!(anchor.unit, Unit::Anchor(AnchorKind::StartOfString));
    }

    #[test]
    fn backreference_parses_index() {
        let root = parse("(a)\\1");
        let backref = &root.only_child().children[1];
        assert_eq!(backref.unit, Unit::Backreference(1));
    }

    #[test]
    fn dot_respects_dot_matches_line_separators() {
        let with_nl = GrammarOptions { dot_matches_line_separators: true, ..Default::default() };
        let root = parse_root_expression(".", &with_nl).unwrap();
        let node = &root.only_child().children[0];
        assert_eq!(node.unit, Unit::Match(MatchKind::AnyCharacter { including_newline: true }));
    }
}
