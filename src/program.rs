// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// The compiled representation a `Regex` drives: owns the parsed pattern in
// both forms the two matching engines need (the compiled NFA `Graph` for
// ordinary patterns, the raw AST for backreference patterns), and decides
// which engine a given search runs under. Grounded on regex-rs-style
// `Program`, which plays the same role (`original`, `insts`, `engine:
// Option<MatchEngine>`) -- but this crate's choice of engine is a closed
// fact about the pattern's language class, decided once at compile time,
// rather than regex-rs-style `choose_engine` heuristic weighing input size
// and capture count on every call.

use log::trace;

use crate::ast::AstNode;
use crate::backtrack::Backtracker;
use crate::compile::{self, assign_capture_indices, validate_backreferences, CompileOptions};
use crate::error::{CompileError, CompileErrorKind};
use crate::grammar::{self, GrammarOptions};
use crate::literals::PrefixMatcher;
use crate::nfa::Simulation;
use crate::state::Graph;

/// Builder-style knobs for a pattern: `Regex(pattern, options?)`.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub case_insensitive: bool,
    pub multiline: bool,
    pub dot_matches_line_separators: bool,
    /// Upper bound on the compiled program's state count; turns runaway
    /// `{m,n}` expansion into a compile error rather than unbounded
    /// memory growth.
    pub size_limit: usize,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }
}

/// Not derived: a derived `Default` would give `size_limit: 0`, which
/// `compile::Compiler::alloc` reads as "no state may ever be allocated"
/// rather than "unlimited" -- every non-empty pattern would fail to
/// compile. Mirrors `CompileOptions::default()`'s limit instead.
impl Default for Options {
    fn default() -> Options {
        Options {
            case_insensitive: false,
            multiline: false,
            dot_matches_line_separators: false,
            size_limit: CompileOptions::default().size_limit,
        }
    }
}

/// Which engine a compiled pattern runs under. Decided once, at compile
/// time, from whether the pattern contains a backreference -- not
/// reconsidered per search the way regex-rs-style `MatchEngine` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
    Nfa,
    Backtrack,
}

/// Forces a backreference-free pattern onto one engine or the other,
/// bypassing the usual `uses_backreferences` choice. Exists only so
/// `tests/differential.rs` can run the same pattern through both engines
/// and compare their output; not part of the crate's ordinary surface.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedEngine {
    Nfa,
    Backtrack,
}

#[derive(Debug)]
pub struct Program {
    pub original: String,
    pub capture_count: usize,
    case_insensitive: bool,
    ast: AstNode,
    graph: Option<Graph>,
    prefix: PrefixMatcher,
    engine: Engine,
}

impl Program {
    pub fn new(pattern: &str, options: Options) -> Result<Program, CompileError> {
        Program::build(pattern, options, None)
    }

    /// See [`ForcedEngine`]. Fails with `CompileErrorKind::UnknownBackreference`-style
    /// mismatch only indirectly: forcing `Nfa` on a pattern that uses
    /// backreferences surfaces as a normal compile error from `compile::compile`,
    /// since the graph compiler has no way to lower a backreference node.
    #[doc(hidden)]
    pub fn with_forced_engine(
        pattern: &str,
        options: Options,
        forced: ForcedEngine,
    ) -> Result<Program, CompileError> {
        Program::build(pattern, options, Some(forced))
    }

    fn build(pattern: &str, options: Options, forced: Option<ForcedEngine>) -> Result<Program, CompileError> {
        if pattern.is_empty() {
            return Err(CompileError::new(CompileErrorKind::EmptyPattern, 0));
        }
        let grammar_opts = GrammarOptions {
            multiline: options.multiline,
            dot_matches_line_separators: options.dot_matches_line_separators,
        };
        let mut ast = grammar::parse_root_expression(pattern, &grammar_opts)
            .map_err(|e| CompileError::new(CompileErrorKind::Syntax(e.message), e.offset))?;
        let capture_count = assign_capture_indices(&mut ast);
        if let Err(n) = validate_backreferences(&ast, capture_count) {
            return Err(CompileError::new(CompileErrorKind::UnknownBackreference(n), 0));
        }

        let engine = match forced {
            Some(ForcedEngine::Nfa) => Engine::Nfa,
            Some(ForcedEngine::Backtrack) => Engine::Backtrack,
            None => {
                if compile::uses_backreferences(&ast) {
                    Engine::Backtrack
                } else {
                    Engine::Nfa
                }
            }
        };
        trace!("compiled {:?} under {:?}", pattern, engine);

        let compile_opts =
            CompileOptions { case_insensitive: options.case_insensitive, size_limit: options.size_limit };
        let (graph, prefix) = match engine {
            Engine::Backtrack => (None, PrefixMatcher::None),
            Engine::Nfa => {
                let g = compile::compile(&ast, capture_count, compile_opts)?;
                let prefix = PrefixMatcher::from_graph(&g);
                (Some(g), prefix)
            }
        };

        Ok(Program {
            original: pattern.to_string(),
            capture_count,
            case_insensitive: options.case_insensitive,
            ast,
            graph,
            prefix,
            engine,
        })
    }

    /// Searches `text` for the next match starting at or after `start`.
    /// `previous_match_index` feeds `\G` and is `Some` only when this call
    /// continues an iteration (`find_iter`/`captures_iter`) rather than a
    /// one-shot `find`.
    pub fn search(
        &self,
        text: &str,
        start: usize,
        previous_match_index: Option<usize>,
    ) -> Option<Vec<Option<usize>>> {
        match self.engine {
            Engine::Nfa => {
                let graph = self.graph.as_ref().expect("nfa engine always compiles a graph");
                let search_start = self.prefix.earliest_possible_start(text, start)?;
                trace!("nfa search {:?} from {}", self.original, search_start);
                Simulation::new(graph).search(text, search_start, previous_match_index)
            }
            Engine::Backtrack => {
                trace!("backtracking search {:?} from {}", self.original, start);
                let slot_count = 2 * self.capture_count;
                Backtracker::new(&self.ast, self.case_insensitive).search(text, start, slot_count, previous_match_index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_is_rejected() {
        assert_eq!(Program::new("", Options::new()).unwrap_err().kind, CompileErrorKind::EmptyPattern);
    }

    #[test]
    fn default_options_do_not_reject_ordinary_patterns() {
        Program::new("abc+", Options::default()).expect("size_limit: 0 must not mean zero states allowed");
    }

    #[test]
    fn backreference_pattern_selects_backtracking_engine() {
        let prog = Program::new(r"(a)\1", Options::new()).unwrap();
        assert_eq!(prog.engine, Engine::Backtrack);
    }

    #[test]
    fn ordinary_pattern_selects_nfa_engine() {
        let prog = Program::new("a+", Options::new()).unwrap();
        assert_eq!(prog.engine, Engine::Nfa);
    }

    #[test]
    fn search_finds_a_match_through_the_nfa_engine() {
        let prog = Program::new("b+", Options::new()).unwrap();
        let caps = prog.search("abbc", 0, None).unwrap();
        assert_eq!((caps[0], caps[1]), (Some(1), Some(3)));
    }

    #[test]
    fn search_finds_a_match_through_the_backtracking_engine() {
        let prog = Program::new(r"(\w+)-\1", Options::new()).unwrap();
        let caps = prog.search("id-id", 0, None).unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(5)));
    }
}
