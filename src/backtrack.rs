// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// The fallback matching engine for patterns that use backreferences.
// Backreferences make the language non-regular, so there is no NFA to
// simulate; this engine instead walks the AST directly with ordinary
// recursion, exploring the first-matching (leftmost-first, greedy-first)
// path the way a backtracking VM explores its instruction stream -- but
// where a classic explicit-stack backtracker maintains a job stack with
// save/restore entries to undo captures when a path fails, here "what
// happens after this node" is the caller's success continuation (`k`),
// and "undo on failure" falls out for free from each stack frame owning
// its own `Cursor` (see `cursor.rs`): a failed branch simply never calls
// its continuation, so there is nothing to restore by the time control
// returns to the caller.
//
// A `(pc, at)`-style visited-set memoization would keep the worst case at
// O(states * input length), but is not reproduced here; it would be
// unsound for backreference patterns, where the same `(node, position)`
// pair can behave differently depending on what an earlier group
// captured. This engine is already reserved by the caller for exactly
// the patterns that need that extra power, at the cost of the
// exponential worst case that comes with it.

use crate::ast::{AstNode, MatchKind, QuantifierKind, Unit};
use crate::cursor::{anchor_holds, Cursor};

pub struct Backtracker<'n> {
    root: &'n AstNode,
    case_insensitive: bool,
    anchored_at_start: bool,
}

type Continuation<'a, 't> = dyn Fn(Cursor<'t>) -> Option<Cursor<'t>> + 'a;

impl<'n> Backtracker<'n> {
    pub fn new(root: &'n AstNode, case_insensitive: bool) -> Backtracker<'n> {
        let anchored_at_start = starts_with_absolute_anchor(root.only_child());
        Backtracker { root, case_insensitive, anchored_at_start }
    }

    /// Searches `text` for a match starting at or after `start`, trying
    /// every successive start position until one succeeds or the end of
    /// the text is passed.
    pub fn search<'t>(
        &self,
        text: &'t str,
        start: usize,
        slot_count: usize,
        previous_match_index: Option<usize>,
    ) -> Option<Vec<Option<usize>>> {
        let mut pos = start;
        loop {
            let mut cursor = Cursor::new(text, pos, slot_count).with_slot_set(0);
            if let Some(idx) = previous_match_index {
                cursor = cursor.with_previous_match_index(idx);
            }
            let result = self.match_node(self.root.only_child(), cursor, &|c| Some(c.with_slot_set(1)));
            if let Some(c) = result {
                return Some(c.slots().to_vec());
            }
            if self.anchored_at_start || pos >= text.len() {
                return None;
            }
            let advance = text[pos..].chars().next().map_or(1, |c| c.len_utf8());
            pos += advance;
        }
    }

    fn match_node<'t>(
        &self,
        node: &AstNode,
        cursor: Cursor<'t>,
        k: &Continuation<'_, 't>,
    ) -> Option<Cursor<'t>> {
        match &node.unit {
            Unit::Root => self.match_node(node.only_child(), cursor, k),
            Unit::Expression => self.match_seq(&node.children, cursor, k),
            Unit::Alternation => {
                for alt in &node.children {
                    if let Some(c) = self.match_node(alt, cursor.clone(), k) {
                        return Some(c);
                    }
                }
                None
            }
            Unit::Group { index } => {
                let body = node.only_child();
                match index {
                    None => self.match_node(body, cursor, k),
                    Some(i) => {
                        let open = 2 * i;
                        let close = 2 * i + 1;
                        let marked = cursor.with_slot_set(open);
                        self.match_node(body, marked, &move |c| k(c.with_slot_set(close)))
                    }
                }
            }
            Unit::Quantifier(kind) => self.match_quantifier(*kind, node.only_child(), cursor, k),
            Unit::Match(match_kind) => self.match_atom(match_kind, cursor, k),
            Unit::Anchor(kind) => {
                if anchor_holds(*kind, &cursor) {
                    k(cursor)
                } else {
                    None
                }
            }
            Unit::Backreference(n) => self.match_backreference(*n, cursor, k),
        }
    }

    fn match_seq<'t>(
        &self,
        nodes: &[AstNode],
        cursor: Cursor<'t>,
        k: &Continuation<'_, 't>,
    ) -> Option<Cursor<'t>> {
        match nodes.split_first() {
            None => k(cursor),
            Some((first, rest)) => self.match_node(first, cursor, &move |c| self.match_seq(rest, c, k)),
        }
    }

    fn match_quantifier<'t>(
        &self,
        kind: QuantifierKind,
        child: &AstNode,
        cursor: Cursor<'t>,
        k: &Continuation<'_, 't>,
    ) -> Option<Cursor<'t>> {
        match kind {
            QuantifierKind::ZeroOrOne => {
                if let Some(c) = self.match_node(child, cursor.clone(), k) {
                    return Some(c);
                }
                k(cursor)
            }
            QuantifierKind::ZeroOrMore => self.match_repeat(child, cursor, 0, 0, None, k),
            QuantifierKind::OneOrMore => self.match_repeat(child, cursor, 0, 1, None, k),
            QuantifierKind::Range { low, high } => self.match_repeat(child, cursor, 0, low, high, k),
        }
    }

    /// Greedy bounded repetition: tries "match once more" before "stop
    /// here", so the first successful path found is the longest one. Once
    /// `done >= min`, a repetition that consumed no input is refused --
    /// otherwise a body that can match empty (e.g. `(a?)*`) would recurse
    /// forever.
    fn match_repeat<'t>(
        &self,
        child: &AstNode,
        cursor: Cursor<'t>,
        done: usize,
        min: usize,
        max: Option<usize>,
        k: &Continuation<'_, 't>,
    ) -> Option<Cursor<'t>> {
        let can_continue = max.map_or(true, |m| done < m);
        if can_continue {
            let start_index = cursor.index();
            let attempt = self.match_node(child, cursor.clone(), &move |c| {
                if c.index() == start_index && done >= min {
                    return None;
                }
                self.match_repeat(child, c, done + 1, min, max, k)
            });
            if attempt.is_some() {
                return attempt;
            }
        }
        if done >= min {
            return k(cursor);
        }
        None
    }

    fn match_atom<'t>(
        &self,
        kind: &MatchKind,
        cursor: Cursor<'t>,
        k: &Continuation<'_, 't>,
    ) -> Option<Cursor<'t>> {
        let c = cursor.current_char()?;
        let matches = match kind {
            MatchKind::Character(expected) => {
                if self.case_insensitive {
                    c.to_lowercase().eq(expected.to_lowercase())
                } else {
                    c == *expected
                }
            }
            MatchKind::AnyCharacter { including_newline } => *including_newline || c != '\n',
            MatchKind::CharacterSet(set) => set.contains(c, self.case_insensitive),
        };
        if matches {
            k(cursor.advanced(c.len_utf8()))
        } else {
            None
        }
    }

    fn match_backreference<'t>(
        &self,
        n: usize,
        cursor: Cursor<'t>,
        k: &Continuation<'_, 't>,
    ) -> Option<Cursor<'t>> {
        let (open, close) = (cursor.slot(2 * n), cursor.slot(2 * n + 1));
        let captured = match (open, close) {
            (Some(s), Some(e)) => &cursor.text()[s..e],
            // A group that never participated in the match (e.g. the
            // untaken side of an alternation) backreferences as empty.
            _ => "",
        };
        match cursor.remaining().get(..captured.len()) {
            Some(slice) if strings_match(slice, captured, self.case_insensitive) => {
                k(cursor.advanced(captured.len()))
            }
            _ => None,
        }
    }
}

fn strings_match(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn starts_with_absolute_anchor(expr: &AstNode) -> bool {
    use crate::ast::AnchorKind;
    matches!(
        expr.children.first().map(|n| &n.unit),
        Some(Unit::Anchor(AnchorKind::StartOfStringOnly))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::assign_capture_indices;
    use crate::grammar::{parse_root_expression, GrammarOptions};

    fn run(pattern: &str, text: &str) -> Option<Vec<Option<usize>>> {
        let mut ast = parse_root_expression(pattern, &GrammarOptions::default()).unwrap();
        let capture_count = assign_capture_indices(&mut ast);
        let bt = Backtracker::new(&ast, false);
        bt.search(text, 0, capture_count * 2, None)
    }

    #[test]
    fn matches_backreference_to_earlier_group() {
        let caps = run(r"(\w+) \1", "hello hello").unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(11)));
    }

    #[test]
    fn backreference_mismatch_fails() {
        assert!(run(r"(\w+) \1", "hello world").is_none());
    }

    #[test]
    fn zero_width_star_body_terminates() {
        let caps = run("(a?)*b", "b").unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(1)));
    }

    #[test]
    fn greedy_quantifier_prefers_longest_match() {
        let caps = run("a+", "aaa").unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(3)));
    }

    #[test]
    fn unparticipating_group_backreferences_as_empty() {
        let caps = run(r"(a)?\1b", "b").unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(1)));
    }
}
