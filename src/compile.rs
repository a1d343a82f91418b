// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Lowers an `ast::AstNode` into a `state::Graph`. Uses the handle-based
// fragment/patch-list technique: each sub-expression compiles to a `Frag`
// (an entry state plus a list of dangling exits), and concatenation is
// just patching one fragment's exits to the next fragment's entry. This
// is the same technique the early `regex` crate used its own compiler for
// (building a flat `Vec<Inst>` with `Split`/`Jump` placeholders patched
// after the fact), adapted here to an explicit `Frag`/`Patch` pair instead
// of mutating raw jump targets in place.

use crate::ast::{AnchorKind, AstNode, MatchKind, QuantifierKind, Unit};
use crate::error::{CompileError, CompileErrorKind};
use crate::state::{Graph, State, StateId};

#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub case_insensitive: bool,
    /// Upper bound on the number of states a single program may contain.
    pub size_limit: usize,
}

impl Default for CompileOptions {
    fn default() -> CompileOptions {
        CompileOptions { case_insensitive: false, size_limit: 10_000_000 }
    }
}

/// A dangling out-edge of a fragment still under construction: which
/// state, and which of its goto slots.
#[derive(Debug, Clone, Copy)]
enum Patch {
    /// The state's single `goto` field (every variant but `Split` has one).
    Single(StateId),
    Primary(StateId),
    Secondary(StateId),
}

struct Frag {
    start: StateId,
    out: Vec<Patch>,
}

struct Compiler {
    states: Vec<State>,
    opts: CompileOptions,
}

impl Compiler {
    /// Pushes a new state, rejecting the pattern once the program would
    /// grow past `size_limit`. Checked here, on every single allocation,
    /// rather than once after a `{m,n}` expansion has already run to
    /// completion -- a nested quantifier like `(a{100}){100}` would
    /// otherwise fully allocate its 10,000-state expansion before any
    /// limit check ever ran.
    fn alloc(&mut self, state: State) -> Result<StateId, CompileError> {
        if self.states.len() >= self.opts.size_limit {
            return Err(CompileError::new(CompileErrorKind::SizeLimitExceeded, 0));
        }
        self.states.push(state);
        Ok(self.states.len() - 1)
    }

    fn patch(&mut self, out: &[Patch], target: StateId) {
        for p in out {
            match *p {
                Patch::Single(id) => set_goto(&mut self.states[id], target),
                Patch::Primary(id) => {
                    if let State::Split { primary, .. } = &mut self.states[id] {
                        *primary = target;
                    }
                }
                Patch::Secondary(id) => {
                    if let State::Split { secondary, .. } = &mut self.states[id] {
                        *secondary = target;
                    }
                }
            }
        }
    }

    fn compile_node(&mut self, node: &AstNode) -> Result<Frag, CompileError> {
        match &node.unit {
            Unit::Root => self.compile_node(node.only_child()),
            Unit::Expression => self.compile_concat(&node.children),
            Unit::Alternation => self.compile_alternation(&node.children),
            Unit::Group { index } => {
                let inner = self.compile_node(node.only_child())?;
                match index {
                    None => Ok(inner),
                    Some(i) => {
                        let open = self.alloc(State::Save { slot: 2 * i, goto: inner.start })?;
                        let close = self.alloc(State::Save { slot: 2 * i + 1, goto: 0 })?;
                        self.patch(&inner.out, close);
                        Ok(Frag { start: open, out: vec![Patch::Single(close)] })
                    }
                }
            }
            Unit::Quantifier(kind) => self.compile_quantifier(*kind, node.only_child()),
            Unit::Match(kind) => self.compile_match(kind),
            Unit::Anchor(kind) => self.compile_anchor(*kind),
            Unit::Backreference(_) => unreachable!(
                "backreferences are matched by the backtracking interpreter, never compiled into the NFA graph"
            ),
        }
    }

    fn compile_concat(&mut self, children: &[AstNode]) -> Result<Frag, CompileError> {
        let mut iter = children.iter();
        let first = match iter.next() {
            Some(n) => self.compile_node(n)?,
            None => {
                let id = self.alloc(State::Nop { goto: 0 })?;
                return Ok(Frag { start: id, out: vec![Patch::Single(id)] });
            }
        };
        let mut frag = first;
        for child in iter {
            let next = self.compile_node(child)?;
            self.patch(&frag.out, next.start);
            frag = Frag { start: frag.start, out: next.out };
        }
        Ok(frag)
    }

    fn compile_alternation(&mut self, alts: &[AstNode]) -> Result<Frag, CompileError> {
        debug_assert!(!alts.is_empty());
        let mut iter = alts.iter().rev();
        let mut frag = self.compile_node(iter.next().unwrap())?;
        for alt in iter {
            let left = self.compile_node(alt)?;
            let split = self.alloc(State::Split { primary: left.start, secondary: frag.start })?;
            let mut out = left.out;
            out.extend(frag.out);
            frag = Frag { start: split, out };
        }
        Ok(frag)
    }

    fn compile_quantifier(
        &mut self,
        kind: QuantifierKind,
        child: &AstNode,
    ) -> Result<Frag, CompileError> {
        match kind {
            QuantifierKind::ZeroOrOne => {
                let e = self.compile_node(child)?;
                let split = self.alloc(State::Split { primary: e.start, secondary: 0 })?;
                let mut out = e.out;
                out.push(Patch::Secondary(split));
                Ok(Frag { start: split, out })
            }
            QuantifierKind::ZeroOrMore => {
                let e = self.compile_node(child)?;
                let split = self.alloc(State::Split { primary: e.start, secondary: 0 })?;
                self.patch(&e.out, split);
                Ok(Frag { start: split, out: vec![Patch::Secondary(split)] })
            }
            QuantifierKind::OneOrMore => {
                let e = self.compile_node(child)?;
                let split = self.alloc(State::Split { primary: e.start, secondary: 0 })?;
                self.patch(&e.out, split);
                Ok(Frag { start: e.start, out: vec![Patch::Secondary(split)] })
            }
            QuantifierKind::Range { low, high } => self.compile_range(low, high, child),
        }
    }

    /// `{m,n}` lowers to `m` mandatory copies followed by `n - m` optional
    /// ones (`{m,}` instead appends a trailing `*`), each copy compiled
    /// fresh from the AST since fragments can't be shared (a later copy's
    /// states must be distinct from an earlier one's).
    fn compile_range(
        &mut self,
        low: usize,
        high: Option<usize>,
        child: &AstNode,
    ) -> Result<Frag, CompileError> {
        let mut mandatory = Vec::with_capacity(low);
        for _ in 0..low {
            mandatory.push(child.clone());
        }
        let mandatory_node = AstNode::with_children(Unit::Expression, mandatory);

        match high {
            None => {
                if low == 0 {
                    self.compile_quantifier(QuantifierKind::ZeroOrMore, child)
                } else {
                    let tail = AstNode::with_child(Unit::Quantifier(QuantifierKind::ZeroOrMore), child.clone());
                    self.compile_concat(&[mandatory_node, tail])
                }
            }
            Some(high) => {
                let optional_count = high - low;
                let mut optional_tail = Vec::with_capacity(optional_count);
                for _ in 0..optional_count {
                    optional_tail.push(AstNode::with_child(
                        Unit::Quantifier(QuantifierKind::ZeroOrOne),
                        child.clone(),
                    ));
                }
                let tail_node = AstNode::with_children(Unit::Expression, optional_tail);
                self.compile_concat(&[mandatory_node, tail_node])
            }
        }
    }

    fn compile_match(&mut self, kind: &MatchKind) -> Result<Frag, CompileError> {
        let id = match kind {
            MatchKind::Character(c) => {
                self.alloc(State::Char { c: *c, case_insensitive: self.opts.case_insensitive, goto: 0 })?
            }
            MatchKind::AnyCharacter { including_newline } => {
                let set = crate::charset::CharSet::from_ranges(
                    if *including_newline {
                        vec![('\u{0}', char::MAX)]
                    } else {
                        vec![('\u{0}', '\u{9}'), ('\u{b}', char::MAX)]
                    },
                    false,
                );
                self.alloc(State::Set { set, case_insensitive: false, goto: 0 })?
            }
            MatchKind::CharacterSet(set) => {
                self.alloc(State::Set { set: set.clone(), case_insensitive: self.opts.case_insensitive, goto: 0 })?
            }
        };
        Ok(Frag { start: id, out: vec![Patch::Single(id)] })
    }

    fn compile_anchor(&mut self, kind: AnchorKind) -> Result<Frag, CompileError> {
        let id = self.alloc(State::Anchor { kind, goto: 0 })?;
        Ok(Frag { start: id, out: vec![Patch::Single(id)] })
    }
}

fn set_goto(state: &mut State, target: StateId) {
    match state {
        State::Save { goto, .. }
        | State::Anchor { goto, .. }
        | State::Char { goto, .. }
        | State::Set { goto, .. }
        | State::Nop { goto, .. } => *goto = target,
        State::Match | State::Split { .. } => unreachable!("not a single-goto state"),
    }
}

/// Compiles a (backreference-free) AST into an executable NFA graph,
/// implicitly wrapping the whole pattern in capture group 0.
pub fn compile(root: &AstNode, capture_count: usize, opts: CompileOptions) -> Result<Graph, CompileError> {
    let mut compiler = Compiler { states: Vec::new(), opts };
    let open = compiler.alloc(State::Save { slot: 0, goto: 0 })?;
    let body = compiler.compile_node(root)?;
    compiler.patch(&[Patch::Single(open)], body.start);
    let close = compiler.alloc(State::Save { slot: 1, goto: 0 })?;
    compiler.patch(&body.out, close);
    let accept = compiler.alloc(State::Match)?;
    compiler.patch(&[Patch::Single(close)], accept);
    Ok(Graph::new(compiler.states, capture_count))
}

/// True if the AST contains a `Backreference` node anywhere; such patterns
/// cannot be compiled into a regular-language NFA and must instead run
/// under the backtracking interpreter.
pub fn uses_backreferences(node: &AstNode) -> bool {
    matches!(node.unit, Unit::Backreference(_)) || node.children.iter().any(uses_backreferences)
}

/// Numbers capturing groups in source order of their opening parenthesis.
/// The grammar marks a capturing group with the placeholder `Some(0)`
/// (vs. `None` for `(?:...)`) without being able to count groups to its
/// right while still parsing; this pre-order walk, run once parsing has
/// finished, replaces each placeholder with its real 1-based index.
/// Returns the total capture count, including the implicit group 0 for
/// the whole match.
pub fn assign_capture_indices(node: &mut AstNode) -> usize {
    let mut next = 1;
    assign(node, &mut next);
    next
}

fn assign(node: &mut AstNode, next: &mut usize) {
    if let Unit::Group { index: Some(_) } = node.unit {
        let idx = *next;
        *next += 1;
        node.unit = Unit::Group { index: Some(idx) };
    }
    for child in &mut node.children {
        assign(child, next);
    }
}

/// Checks every `\N` in the AST refers to a group `assign_capture_indices`
/// actually numbered.
pub fn validate_backreferences(node: &AstNode, capture_count: usize) -> Result<(), usize> {
    if let Unit::Backreference(n) = node.unit {
        if n == 0 || n >= capture_count {
            return Err(n);
        }
    }
    for child in &node.children {
        validate_backreferences(child, capture_count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{parse_root_expression, GrammarOptions};

    fn compile_pattern(pattern: &str) -> Graph {
        let mut ast = parse_root_expression(pattern, &GrammarOptions::default()).unwrap();
        let capture_count = assign_capture_indices(&mut ast);
        compile(&ast, capture_count, CompileOptions::default()).unwrap()
    }

    #[test]
    fn literal_concatenation_compiles() {
        let g = compile_pattern("ab");
        assert!(g.len() > 0);
        assert!(matches!(g.get(g.len() - 1), State::Match));
    }

    #[test]
    fn star_creates_a_cycle_back_to_a_split() {
        let g = compile_pattern("a*");
        let has_split = (0..g.len()).any(|i| matches!(g.get(i), State::Split { .. }));
        assert!(has_split);
    }

    #[test]
    fn group_allocates_save_slots() {
        let g = compile_pattern("(a)");
        assert_eq!(g.capture_count, 2);
        let has_slot_2 = (0..g.len()).any(|i| matches!(g.get(i), State::Save { slot: 2, .. }));
        assert!(has_slot_2);
    }

    #[test]
    fn backreference_is_detected_before_compiling() {
        let ast = parse_root_expression("(a)\\1", &GrammarOptions::default()).unwrap();
        assert!(uses_backreferences(&ast));
    }

    #[test]
    fn size_limit_rejects_before_full_expansion_completes() {
        let mut ast = parse_root_expression("a{50}", &GrammarOptions::default()).unwrap();
        let capture_count = assign_capture_indices(&mut ast);
        let opts = CompileOptions { case_insensitive: false, size_limit: 5 };
        let err = compile(&ast, capture_count, opts).unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::SizeLimitExceeded);
    }

    #[test]
    fn counted_quantifier_expands_to_mandatory_and_optional_copies() {
        let g = compile_pattern("a{2,3}");
        let char_states = (0..g.len()).filter(|&i| matches!(g.get(i), State::Char { .. })).count();
        assert_eq!(char_states, 3);
    }

    #[test]
    fn backreference_to_undeclared_group_is_rejected() {
        let mut ast = parse_root_expression("(a)\\2", &GrammarOptions::default()).unwrap();
        let capture_count = assign_capture_indices(&mut ast);
        assert_eq!(validate_backreferences(&ast, capture_count), Err(2));
    }

    #[test]
    fn capture_indices_follow_source_order_of_opening_parens() {
        let mut ast = parse_root_expression("(a(b))(c)", &GrammarOptions::default()).unwrap();
        let capture_count = assign_capture_indices(&mut ast);
        assert_eq!(capture_count, 4);
    }
}
