// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// A Pike VM: runs every live thread of the compiled NFA in lockstep over
// the input, one character at a time, so the whole match completes in
// O(n * states) time with no backtracking. Thread lists are sparse sets
// (`Threads` below) exactly as in regex-rs-style engine, which is what
// makes "is this state already scheduled this step" an O(1) check instead
// of a scan.
//
// Capture slots are tracked per-thread during the epsilon closure
// (`add`) using regex-rs-style save-recurse-restore trick: a `Save` state
// temporarily writes into the *shared* scratch array before recursing
// into its successor, then restores the old value on the way back out.
// This avoids allocating a fresh capture vector per thread on every
// step; the array is only really "forked" when a thread survives into
// `nlist`, at which point its captures are copied once.

use crate::cursor::anchor_holds_at;
use crate::state::{Graph, State, StateId};

pub struct Simulation<'g> {
    graph: &'g Graph,
    anchored_at_start: bool,
}

impl<'g> Simulation<'g> {
    pub fn new(graph: &'g Graph) -> Simulation<'g> {
        let anchored_at_start = matches!(
            graph.get(1.min(graph.len().saturating_sub(1))),
            State::Anchor { kind: crate::ast::AnchorKind::StartOfStringOnly, .. }
        );
        Simulation { graph, anchored_at_start }
    }

    /// Searches `text` for a match starting at or after `start`. Returns
    /// the populated capture slots (slot 0/1 are always the whole match)
    /// on success.
    pub fn search(&self, text: &str, start: usize, previous_match_index: Option<usize>) -> Option<Vec<Option<usize>>> {
        let slot_count = self.graph.slot_count();
        let mut clist = Threads::new(self.graph.len(), slot_count);
        let mut nlist = Threads::new(self.graph.len(), slot_count);
        let mut matched_caps: Option<Vec<Option<usize>>> = None;

        let mut pos = start;
        loop {
            if clist.size == 0 {
                if matched_caps.is_some() || (pos > 0 && self.anchored_at_start) {
                    break;
                }
            }
            if clist.size == 0 || (!self.anchored_at_start && matched_caps.is_none()) {
                let mut seed = vec![None; slot_count];
                self.add(&mut clist, &mut seed, 0, text, pos, previous_match_index);
            }

            let next_char_len = text[pos..].chars().next().map_or(0, |c| c.len_utf8());
            let next_pos = pos + next_char_len;

            let mut i = 0;
            while i < clist.size {
                let id = clist.dense[i].id;
                let mut caps = std::mem::take(&mut clist.dense[i].caps);
                if let State::Match = self.graph.get(id) {
                    matched_caps = Some(caps.clone());
                    clist.dense[i].caps = caps;
                    break;
                }
                if let State::Char { c, case_insensitive, goto } = self.graph.get(id) {
                    if char_matches(*c, *case_insensitive, text[pos..].chars().next()) {
                        self.add(&mut nlist, &mut caps, *goto, text, next_pos, previous_match_index);
                    }
                }
                if let State::Set { set, case_insensitive, goto } = self.graph.get(id) {
                    if let Some(ch) = text[pos..].chars().next() {
                        if set.contains(ch, *case_insensitive) {
                            self.add(&mut nlist, &mut caps, *goto, text, next_pos, previous_match_index);
                        }
                    }
                }
                clist.dense[i].caps = caps;
                i += 1;
            }

            if pos >= text.len() {
                break;
            }
            pos = next_pos;
            std::mem::swap(&mut clist, &mut nlist);
            nlist.clear();
        }
        matched_caps
    }

    /// Epsilon closure from `id`, seeding `nlist` with every consuming (or
    /// accepting) state reachable without consuming input. `caps` is the
    /// scratch array threaded through via save/restore.
    #[allow(clippy::too_many_arguments)]
    fn add(
        &self,
        nlist: &mut Threads,
        caps: &mut Vec<Option<usize>>,
        id: StateId,
        text: &str,
        pos: usize,
        previous_match_index: Option<usize>,
    ) {
        if nlist.contains(id) {
            return;
        }
        let slot_index = nlist.add(id, caps);
        match self.graph.get(id) {
            State::Anchor { kind, goto } => {
                if anchor_holds_at(*kind, text, pos, previous_match_index) {
                    self.add(nlist, caps, *goto, text, pos, previous_match_index);
                }
            }
            State::Save { slot, goto } => {
                let old = caps[*slot];
                caps[*slot] = Some(pos);
                self.add(nlist, caps, *goto, text, pos, previous_match_index);
                caps[*slot] = old;
            }
            State::Split { primary, secondary } => {
                self.add(nlist, caps, *primary, text, pos, previous_match_index);
                self.add(nlist, caps, *secondary, text, pos, previous_match_index);
            }
            State::Nop { goto } => {
                self.add(nlist, caps, *goto, text, pos, previous_match_index);
            }
            State::Match | State::Char { .. } | State::Set { .. } => {
                nlist.dense[slot_index].caps.copy_from_slice(caps);
            }
        }
    }
}

fn char_matches(target: char, case_insensitive: bool, actual: Option<char>) -> bool {
    match actual {
        None => false,
        Some(c) if c == target => true,
        Some(c) if case_insensitive => {
            c.to_lowercase().eq(target.to_lowercase()) || c.to_uppercase().eq(target.to_uppercase())
        }
        Some(_) => false,
    }
}

struct ThreadSlot {
    id: StateId,
    caps: Vec<Option<usize>>,
}

/// A sparse set of `StateId`s scheduled for the current or next step, with
/// O(1) membership testing via the `sparse`/`dense` pair (the standard
/// technique: `sparse[id]` is only meaningful when it points back into
/// `dense` at an index `< size` whose own id matches).
struct Threads {
    dense: Vec<ThreadSlot>,
    sparse: Vec<usize>,
    size: usize,
}

impl Threads {
    fn new(num_states: usize, slot_count: usize) -> Threads {
        let dense = (0..num_states).map(|_| ThreadSlot { id: 0, caps: vec![None; slot_count] }).collect();
        Threads { dense, sparse: vec![0; num_states], size: 0 }
    }

    fn add(&mut self, id: StateId, caps: &[Option<usize>]) -> usize {
        let i = self.size;
        self.dense[i].id = id;
        self.dense[i].caps.copy_from_slice(caps);
        self.sparse[id] = i;
        self.size += 1;
        i
    }

    fn contains(&self, id: StateId) -> bool {
        let s = self.sparse[id];
        s < self.size && self.dense[s].id == id
    }

    fn clear(&mut self) {
        self.size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{assign_capture_indices, compile, CompileOptions};
    use crate::grammar::{parse_root_expression, GrammarOptions};

    fn run(pattern: &str, text: &str) -> Option<Vec<Option<usize>>> {
        let mut ast = parse_root_expression(pattern, &GrammarOptions::default()).unwrap();
        let capture_count = assign_capture_indices(&mut ast);
        let graph = compile(&ast, capture_count, CompileOptions::default()).unwrap();
        Simulation::new(&graph).search(text, 0, None)
    }

    #[test]
    fn matches_simple_literal() {
        let caps = run("abc", "xxabcxx").unwrap();
        assert_eq!((caps[0], caps[1]), (Some(2), Some(5)));
    }

    #[test]
    fn greedy_star_consumes_as_much_as_possible() {
        let caps = run("a*", "aaab").unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(3)));
    }

    #[test]
    fn no_match_returns_none() {
        assert!(run("xyz", "abc").is_none());
    }

    #[test]
    fn capture_group_records_its_span() {
        let caps = run("a(b+)c", "abbbc").unwrap();
        assert_eq!((caps[2], caps[3]), (Some(1), Some(4)));
    }

    #[test]
    fn alternation_prefers_the_leftmost_branch() {
        let caps = run("a|ab", "ab").unwrap();
        assert_eq!((caps[0], caps[1]), (Some(0), Some(1)));
    }
}
