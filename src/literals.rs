// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Extracts a mandatory literal prefix from a compiled NFA graph, the way
// regex-rs-style `BuildPrefixes` walks `Insts` looking for a required
// substring before falling back to the matching engine proper. Scaled down
// from regex-rs-style full `Literals` (which handles byte-range expansion,
// a bespoke Boyer-Moore-Horspool searcher, and a choice between a sparse
// byte set / full Aho-Corasick DFA / compact Aho-Corasick DFA) to just what
// the simulator's fast path needs: skip straight to the next place in the
// haystack a match could possibly start, using `memchr` for a single-byte
// literal and `aho-corasick` for a handful of alternative literal prefixes.

use aho_corasick::AhoCorasick;
use memchr::memchr;

use crate::state::{Graph, State, StateId};

/// Literal prefixes longer than this stop contributing to the search; the
/// chain up to this point is still a correct (if less tight) required
/// prefix.
const PREFIX_LITERAL_LIMIT: usize = 32;

#[derive(Debug, Clone)]
pub enum PrefixMatcher {
    /// No literal prefix could be extracted; every start position is
    /// possible as far as this optimizer is concerned.
    None,
    Literal(String),
    Alternates(AhoCorasick),
}

impl PrefixMatcher {
    /// Walks the graph from its entry state looking for a run of mandatory
    /// `Char` states, or -- if the entry branches immediately -- a literal
    /// prefix common to each branch.
    pub fn from_graph(graph: &Graph) -> PrefixMatcher {
        match required_literals(graph, 0) {
            Some(lits) if lits.len() == 1 => PrefixMatcher::Literal(lits.into_iter().next().unwrap()),
            Some(lits) if lits.len() > 1 => match AhoCorasick::new(&lits) {
                Ok(ac) => PrefixMatcher::Alternates(ac),
                Err(_) => PrefixMatcher::None,
            },
            _ => PrefixMatcher::None,
        }
    }

    /// The earliest byte offset at or after `from` where a match could
    /// possibly begin, or `None` if the prefix rules out the rest of the
    /// text entirely.
    pub fn earliest_possible_start(&self, text: &str, from: usize) -> Option<usize> {
        match self {
            PrefixMatcher::None => Some(from),
            PrefixMatcher::Literal(lit) => {
                if lit.len() == 1 {
                    memchr(lit.as_bytes()[0], text[from..].as_bytes()).map(|i| from + i)
                } else {
                    text[from..].find(lit.as_str()).map(|i| from + i)
                }
            }
            PrefixMatcher::Alternates(ac) => ac.find(&text[from..]).map(|m| from + m.start()),
        }
    }
}

/// Follows `Save`/`Nop` states transparently and collects consecutive,
/// case-sensitive `Char` states into a single literal. A `Split` reached
/// before any character has been consumed is treated as an alternation of
/// required literals (one level deep, not recursively); anything else ends
/// the chain.
fn required_literals(graph: &Graph, start: StateId) -> Option<Vec<String>> {
    let mut id = start;
    let mut prefix = String::new();
    loop {
        match graph.get(id) {
            State::Save { goto, .. } | State::Nop { goto } => id = *goto,
            State::Char { c, case_insensitive: false, goto } => {
                prefix.push(*c);
                id = *goto;
                if prefix.len() >= PREFIX_LITERAL_LIMIT {
                    break;
                }
            }
            State::Split { primary, secondary } if prefix.is_empty() => {
                return alternate_literals(graph, *primary, *secondary);
            }
            _ => break,
        }
    }
    if prefix.is_empty() {
        None
    } else {
        Some(vec![prefix])
    }
}

fn alternate_literals(graph: &Graph, a: StateId, b: StateId) -> Option<Vec<String>> {
    let mut lits = Vec::with_capacity(2);
    for branch in [a, b] {
        match required_literals(graph, branch) {
            Some(mut l) if l.len() == 1 => lits.push(l.pop().unwrap()),
            _ => return None,
        }
    }
    Some(lits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{assign_capture_indices, compile, CompileOptions};
    use crate::grammar::{parse_root_expression, GrammarOptions};

    fn prefix_for(pattern: &str) -> PrefixMatcher {
        let mut ast = parse_root_expression(pattern, &GrammarOptions::default()).unwrap();
        let capture_count = assign_capture_indices(&mut ast);
        let graph = compile(&ast, capture_count, CompileOptions::default()).unwrap();
        PrefixMatcher::from_graph(&graph)
    }

    #[test]
    fn single_literal_prefix_skips_to_first_occurrence() {
        let p = prefix_for("abc");
        assert_eq!(p.earliest_possible_start("xxxabcxx", 0), Some(3));
    }

    #[test]
    fn no_prefix_when_pattern_starts_with_a_class() {
        let p = prefix_for("[a-z]+");
        assert!(matches!(p, PrefixMatcher::None));
    }

    #[test]
    fn alternation_of_literals_finds_either_branch() {
        let p = prefix_for("cat|dog");
        assert_eq!(p.earliest_possible_start("zzzdogzz", 0), Some(3));
    }

    #[test]
    fn missing_literal_reports_no_possible_start() {
        let p = prefix_for("abc");
        assert_eq!(p.earliest_possible_start("xyz", 0), None);
    }
}
