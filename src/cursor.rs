// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// A position in the subject string, paired with the capture slots
// recorded so far. Mirrors regex-rs-style `Input`/`InputAt` split (a
// position that knows how to look at its neighboring characters) but
// folds capture state in too, since both matching engines need to carry
// it alongside the position as they advance. Cloning is cheap: the slot
// vector is behind an `Rc` and only copied on actual write
// (`Rc::make_mut`), so forking a cursor at a branch point (every `Split`
// in the simulator, every choice point in the backtracker) doesn't pay
// for a fresh allocation unless that branch actually records a capture.

use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct Cursor<'t> {
    text: &'t str,
    start_index: usize,
    index: usize,
    slots: Rc<Vec<Option<usize>>>,
    previous_match_index: Option<usize>,
}

impl<'t> Cursor<'t> {
    pub fn new(text: &'t str, start_index: usize, slot_count: usize) -> Cursor<'t> {
        Cursor {
            text,
            start_index,
            index: start_index,
            slots: Rc::new(vec![None; slot_count]),
            previous_match_index: None,
        }
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn previous_match_index(&self) -> Option<usize> {
        self.previous_match_index
    }

    pub fn remaining(&self) -> &'t str {
        &self.text[self.index..]
    }

    pub fn current_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn previous_char(&self) -> Option<char> {
        self.text[..self.index].chars().next_back()
    }

    /// A cursor advanced `by` bytes, with everything else unchanged.
    pub fn advanced(&self, by: usize) -> Cursor<'t> {
        let mut next = self.clone();
        next.index += by;
        next
    }

    pub fn slot(&self, i: usize) -> Option<usize> {
        self.slots.get(i).copied().flatten()
    }

    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// A cursor with slot `i` set to the current index, everything else
    /// unchanged. Used when a `Save` state is crossed.
    pub fn with_slot_set(&self, i: usize) -> Cursor<'t> {
        let mut next = self.clone();
        Rc::make_mut(&mut next.slots)[i] = Some(self.index);
        next
    }

    pub fn with_previous_match_index(&self, idx: usize) -> Cursor<'t> {
        let mut next = self.clone();
        next.previous_match_index = Some(idx);
        next
    }

    pub fn at_start_of_text(&self) -> bool {
        self.index == 0
    }

    pub fn at_end_of_text(&self) -> bool {
        self.index == self.text.len()
    }

    pub fn at_start_of_search(&self) -> bool {
        self.index == self.start_index
    }
}

/// Matches the ASCII `[0-9A-Za-z_]` word class `CharSet::word` builds for
/// `\w`/`\W`, so `\b`/`\B` agree with `\w`/`\W` on where a word ends.
pub fn is_word_char(c: Option<char>) -> bool {
    matches!(c, Some(c) if c.is_ascii_alphanumeric() || c == '_')
}

/// Zero-width assertion evaluation, shared by both matching engines.
/// Mirrors regex-rs-style `InstEmptyLook::matches`, generalized from the
/// fixed `StartText`/`EndText`/boundary set to every `AnchorKind`. Takes
/// the raw position rather than a `Cursor` so the NFA simulator (which
/// tracks position without a full `Cursor` per thread) can call it too.
pub fn anchor_holds_at(
    kind: crate::ast::AnchorKind,
    text: &str,
    index: usize,
    previous_match_index: Option<usize>,
) -> bool {
    use crate::ast::AnchorKind::*;
    let previous_char = text[..index].chars().next_back();
    let current_char = text[index..].chars().next();
    match kind {
        StartOfString => index == 0 || previous_char == Some('\n'),
        StartOfStringOnly => index == 0,
        EndOfString => index == text.len() || current_char == Some('\n'),
        EndOfStringOnly => index == text.len(),
        EndOfStringOnlyNotNewline => {
            index == text.len() || (current_char == Some('\n') && index + 1 == text.len())
        }
        WordBoundary => is_word_char(previous_char) ^ is_word_char(current_char),
        NonWordBoundary => !(is_word_char(previous_char) ^ is_word_char(current_char)),
        PreviousMatchEnd => Some(index) == previous_match_index,
    }
}

/// Convenience wrapper over a `Cursor`'s own position.
pub fn anchor_holds(kind: crate::ast::AnchorKind, cursor: &Cursor<'_>) -> bool {
    anchor_holds_at(kind, cursor.text(), cursor.index(), cursor.previous_match_index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AnchorKind;

    #[test]
    fn advancing_preserves_slots() {
        let c = Cursor::new("hello", 0, 2).with_slot_set(0);
        let c2 = c.advanced(3);
        assert_eq!(c2.slot(0), Some(0));
        assert_eq!(c2.index(), 3);
    }

    #[test]
    fn write_does_not_mutate_the_original() {
        let c = Cursor::new("hi", 0, 2);
        let c2 = c.with_slot_set(1);
        assert_eq!(c.slot(1), None);
        assert_eq!(c2.slot(1), Some(0));
    }

    #[test]
    fn start_of_string_only_requires_absolute_start() {
        let c = Cursor::new("ab", 0, 0).advanced(1);
        assert!(!anchor_holds(AnchorKind::StartOfStringOnly, &c));
    }

    #[test]
    fn word_boundary_detects_transition() {
        let c = Cursor::new("a ", 0, 0).advanced(1);
        assert!(anchor_holds(AnchorKind::WordBoundary, &c));
    }

    #[test]
    fn multiline_start_holds_after_newline() {
        let c = Cursor::new("a\nb", 0, 0).advanced(2);
        assert!(anchor_holds(AnchorKind::StartOfString, &c));
        assert!(!anchor_holds(AnchorKind::StartOfStringOnly, &c));
    }
}
