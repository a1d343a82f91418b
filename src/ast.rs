// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// The abstract syntax tree produced by `grammar.rs` and consumed by
// `compile.rs`. Nodes are tagged variants (a `Unit` discriminant plus an
// ordered list of children) rather than a class hierarchy, so the compiler
// dispatches with a single `match` instead of virtual calls.

use crate::charset::CharSet;

/// A node in the pattern's syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub unit: Unit,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn leaf(unit: Unit) -> AstNode {
        debug_assert!(
            matches!(unit, Unit::Match(_) | Unit::Anchor(_) | Unit::Backreference(_)),
            "leaf() used for a unit that expects children: {:?}",
            unit
        );
        AstNode { unit, children: Vec::new() }
    }

    pub fn with_child(unit: Unit, child: AstNode) -> AstNode {
        debug_assert!(matches!(unit, Unit::Quantifier(_) | Unit::Group { .. } | Unit::Root));
        AstNode { unit, children: vec![child] }
    }

    pub fn with_children(unit: Unit, children: Vec<AstNode>) -> AstNode {
        debug_assert!(matches!(unit, Unit::Expression | Unit::Alternation));
        AstNode { unit, children }
    }

    pub fn only_child(&self) -> &AstNode {
        debug_assert_eq!(self.children.len(), 1);
        &self.children[0]
    }
}

/// The discriminant carried by every AST node. Invariants (enforced by the
/// grammar and re-checked with `debug_assert!` in the constructors above):
/// `Quantifier`, `Group`, and `Root` have exactly one child; `Match`,
/// `Anchor`, and `Backreference` have none; `Expression` and `Alternation`
/// have zero or more, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    /// Top of the tree; its single child is an `Expression`.
    Root,
    /// Concatenation of juxtaposed atoms.
    Expression,
    /// A parenthesized group. `index` is `Some(1-based capture index)` for
    /// a capturing group, `None` for `(?:...)`.
    Group { index: Option<usize> },
    /// `a|b|c`; children are the alternatives.
    Alternation,
    /// A repeated atom; exactly one child.
    Quantifier(QuantifierKind),
    /// A single matched element; no children.
    Match(MatchKind),
    /// A zero-width assertion; no children.
    Anchor(AnchorKind),
    /// `\1`, `\2`, ...; no children.
    Backreference(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    ZeroOrMore,
    OneOrMore,
    ZeroOrOne,
    /// Covers `{m}` (`high == Some(m)`), `{m,}` (`high == None`), and
    /// `{m,n}` (`high == Some(n)`).
    Range { low: usize, high: Option<usize> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchKind {
    Character(char),
    AnyCharacter { including_newline: bool },
    CharacterSet(CharSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// `^` without `multiline`, or after a line break with `multiline`.
    StartOfString,
    /// `\A`: always the absolute start of input, regardless of `multiline`.
    StartOfStringOnly,
    /// `$` without `multiline`, or before a line break with `multiline`.
    EndOfString,
    /// `\z`: always the absolute end of input.
    EndOfStringOnly,
    /// `\Z`: absolute end of input, or immediately before a single
    /// trailing `\n`.
    EndOfStringOnlyNotNewline,
    WordBoundary,
    NonWordBoundary,
    /// `\G`: the end of the previous match in this search.
    PreviousMatchEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_no_children() {
        let node = AstNode::leaf(Unit::Anchor(AnchorKind::StartOfString));
        assert!(node.children.is_empty());
    }

    #[test]
    fn with_child_wraps_exactly_one() {
        let inner = AstNode::leaf(Unit::Match(MatchKind::Character('a')));
        let node = AstNode::with_child(Unit::Quantifier(QuantifierKind::ZeroOrMore), inner.clone());
        assert_eq!(node.children, vec![inner]);
    }
}
