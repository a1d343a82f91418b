// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// The public façade. Everything in this module is a thin wrapper over
// `Program::search` (the engine-dispatching driver) and `for_each_match`
// (this crate's `forMatch`): no matching logic lives here, only the
// iterator/Cow bookkeeping a published crate of this shape always ships
// alongside its core engine.

use std::borrow::Cow;
use std::fmt;

use crate::error::CompileError;
use crate::program::{self, Program};

pub use program::Options;
#[doc(hidden)]
pub use program::ForcedEngine;

/// A compiled pattern, ready to search text with.
pub struct Regex {
    program: Program,
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Regex({:?})", self.program.original)
    }
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Regex, CompileError> {
        Regex::with_options(pattern, Options::new())
    }

    pub fn with_options(pattern: &str, options: Options) -> Result<Regex, CompileError> {
        Ok(Regex { program: Program::new(pattern, options)? })
    }

    /// Forces `pattern` onto a specific engine instead of letting the
    /// compiler pick. Used by the differential test suite to run the same
    /// backreference-free pattern through both the NFA simulator and the
    /// backtracker and compare their output.
    #[doc(hidden)]
    pub fn with_engine(pattern: &str, options: Options, engine: ForcedEngine) -> Result<Regex, CompileError> {
        Ok(Regex { program: Program::with_forced_engine(pattern, options, engine)? })
    }

    /// The original pattern text.
    pub fn as_str(&self) -> &str {
        &self.program.original
    }

    /// Number of capture groups, including the implicit group 0.
    pub fn captures_len(&self) -> usize {
        self.program.capture_count
    }

    /// Invokes `callback` once per non-overlapping, left-to-right match.
    /// `callback` returns `false` to stop early. This is the core driver
    /// every other method on `Regex` is built from.
    pub fn for_each_match<'t>(&self, text: &'t str, mut callback: impl FnMut(Captures<'t>) -> bool) {
        let mut start = 0;
        let mut previous_match_index = None;
        while start <= text.len() {
            let slots = match self.program.search(text, start, previous_match_index) {
                Some(slots) => slots,
                None => break,
            };
            let match_start = slots[0].expect("slot 0 is always set on a match");
            let match_end = slots[1].expect("slot 1 is always set on a match");
            previous_match_index = Some(match_end);
            start = if match_end > match_start { match_end } else { next_char_boundary(text, match_end) };
            if !callback(Captures::new(text, slots)) {
                break;
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        let mut found = false;
        self.for_each_match(text, |_| {
            found = true;
            false
        });
        found
    }

    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        let mut result = None;
        self.for_each_match(text, |caps| {
            result = caps.get(0);
            false
        });
        result
    }

    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        Matches { regex: self, text, start: 0, previous_match_index: None, done: false }
    }

    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        let mut result = None;
        self.for_each_match(text, |caps| {
            result = Some(caps);
            false
        });
        result
    }

    pub fn captures_iter<'r, 't>(&'r self, text: &'t str) -> CapturesIter<'r, 't> {
        CapturesIter { regex: self, text, start: 0, previous_match_index: None, done: false }
    }

    /// Replaces the first match with `replacement`, substituting `$0`..`$9`
    /// with the corresponding capture and `$$` with a literal `$`.
    pub fn replace<'t>(&self, text: &'t str, replacement: &str) -> Cow<'t, str> {
        self.replace_n(text, replacement, 1)
    }

    pub fn replace_all<'t>(&self, text: &'t str, replacement: &str) -> Cow<'t, str> {
        self.replace_n(text, replacement, usize::MAX)
    }

    fn replace_n<'t>(&self, text: &'t str, replacement: &str, limit: usize) -> Cow<'t, str> {
        let mut out = String::new();
        let mut last_end = 0;
        let mut count = 0;
        let mut replaced_any = false;
        self.for_each_match(text, |caps| {
            if count >= limit {
                return false;
            }
            let m = caps.get(0).expect("group 0 always participates");
            out.push_str(&text[last_end..m.start()]);
            expand_replacement(replacement, &caps, &mut out);
            last_end = m.end();
            count += 1;
            replaced_any = true;
            count < limit
        });
        if !replaced_any {
            return Cow::Borrowed(text);
        }
        out.push_str(&text[last_end..]);
        Cow::Owned(out)
    }

    pub fn split<'r, 't>(&'r self, text: &'t str) -> Split<'r, 't> {
        Split { matches: self.find_iter(text), text, last_end: 0, done: false }
    }
}

fn expand_replacement(template: &str, caps: &Captures<'_>, out: &mut String) {
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() {
            match bytes[i + 1] {
                b'$' => {
                    out.push('$');
                    i += 2;
                    continue;
                }
                b'0'..=b'9' => {
                    let n = (bytes[i + 1] - b'0') as usize;
                    if let Some(m) = caps.get(n) {
                        out.push_str(m.as_str());
                    }
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    match text[at..].chars().next() {
        Some(c) => at + c.len_utf8(),
        None => at + 1,
    }
}

/// A single match: its byte range plus a view onto the matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t str,
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    pub fn as_str(&self) -> &'t str {
        &self.text[self.start..self.end]
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

/// The capture groups recorded by one match. Group 0 is the whole match;
/// groups 1.. are in declaration order. A group that did not participate
/// in the match (the untaken side of an alternation, a `?` that matched
/// zero times) is absent, not present-but-empty.
#[derive(Debug, Clone)]
pub struct Captures<'t> {
    text: &'t str,
    slots: Vec<Option<usize>>,
}

impl<'t> Captures<'t> {
    fn new(text: &'t str, slots: Vec<Option<usize>>) -> Captures<'t> {
        Captures { text, slots }
    }

    pub fn get(&self, i: usize) -> Option<Match<'t>> {
        let start = *self.slots.get(2 * i)?;
        let end = *self.slots.get(2 * i + 1)?;
        match (start, end) {
            (Some(s), Some(e)) => Some(Match { text: self.text, start: s, end: e }),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A forward iterator over every non-overlapping match in a string. Pulls
/// one match at a time from `Program::search` rather than eagerly
/// collecting, so the work of the later matches is never paid for by a
/// caller who only consumes the first few.
pub struct Matches<'r, 't> {
    regex: &'r Regex,
    text: &'t str,
    start: usize,
    previous_match_index: Option<usize>,
    done: bool,
}

impl<'r, 't> Iterator for Matches<'r, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        if self.done || self.start > self.text.len() {
            return None;
        }
        let slots = match self.regex.program.search(self.text, self.start, self.previous_match_index) {
            Some(s) => s,
            None => {
                self.done = true;
                return None;
            }
        };
        let start = slots[0].expect("slot 0 is always set on a match");
        let end = slots[1].expect("slot 1 is always set on a match");
        self.previous_match_index = Some(end);
        self.start = if end > start { end } else { next_char_boundary(self.text, end) };
        Some(Match { text: self.text, start, end })
    }
}

pub struct CapturesIter<'r, 't> {
    regex: &'r Regex,
    text: &'t str,
    start: usize,
    previous_match_index: Option<usize>,
    done: bool,
}

impl<'r, 't> Iterator for CapturesIter<'r, 't> {
    type Item = Captures<'t>;

    fn next(&mut self) -> Option<Captures<'t>> {
        if self.done || self.start > self.text.len() {
            return None;
        }
        let slots = match self.regex.program.search(self.text, self.start, self.previous_match_index) {
            Some(s) => s,
            None => {
                self.done = true;
                return None;
            }
        };
        let start = slots[0].expect("slot 0 is always set on a match");
        let end = slots[1].expect("slot 1 is always set on a match");
        self.previous_match_index = Some(end);
        self.start = if end > start { end } else { next_char_boundary(self.text, end) };
        Some(Captures::new(self.text, slots))
    }
}

/// The substrings between consecutive matches.
pub struct Split<'r, 't> {
    matches: Matches<'r, 't>,
    text: &'t str,
    last_end: usize,
    done: bool,
}

impl<'r, 't> Iterator for Split<'r, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        if self.done {
            return None;
        }
        match self.matches.next() {
            Some(m) => {
                let piece = &self.text[self.last_end..m.start()];
                self.last_end = m.end();
                Some(piece)
            }
            None => {
                self.done = true;
                Some(&self.text[self.last_end..])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_match_finds_a_substring() {
        assert!(Regex::new("b+").unwrap().is_match("abbc"));
        assert!(!Regex::new("z+").unwrap().is_match("abbc"));
    }

    #[test]
    fn find_returns_the_leftmost_match() {
        let re = Regex::new("a+").unwrap();
        let m = re.find("xxaaayy").unwrap();
        assert_eq!(m.as_str(), "aaa");
        assert_eq!((m.start(), m.end()), (2, 5));
    }

    #[test]
    fn find_iter_yields_every_non_overlapping_match() {
        let re = Regex::new(r"\d+").unwrap();
        let found: Vec<&str> = re.find_iter("a1 bb22 ccc333").map(|m| m.as_str()).collect();
        assert_eq!(found, vec!["1", "22", "333"]);
    }

    #[test]
    fn captures_exposes_groups_by_index() {
        let re = Regex::new(r"(\w+)@(\w+)").unwrap();
        let caps = re.captures("user@host").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "user");
        assert_eq!(caps.get(2).unwrap().as_str(), "host");
    }

    #[test]
    fn unparticipating_group_is_absent() {
        let re = Regex::new(r"(a)|(b)").unwrap();
        let caps = re.captures("b").unwrap();
        assert!(caps.get(1).is_none());
        assert_eq!(caps.get(2).unwrap().as_str(), "b");
    }

    #[test]
    fn replace_all_substitutes_numbered_groups() {
        let re = Regex::new(r"(\w+)=(\w+)").unwrap();
        assert_eq!(re.replace_all("a=1, b=2", "$2=$1"), "1=a, 2=b");
    }

    #[test]
    fn replace_only_touches_the_first_match_by_default() {
        let re = Regex::new("a").unwrap();
        assert_eq!(re.replace("aaa", "b"), "baa");
    }

    #[test]
    fn replace_without_a_match_borrows_the_input() {
        let re = Regex::new("z").unwrap();
        assert!(matches!(re.replace("abc", "x"), Cow::Borrowed(_)));
    }

    #[test]
    fn split_yields_the_gaps_between_matches() {
        let re = Regex::new(",").unwrap();
        let parts: Vec<&str> = re.split("a,b,c").collect();
        assert_eq!(parts, vec!["a", "b", "c"]);
    }

    #[test]
    fn backreference_pattern_works_through_the_facade() {
        let re = Regex::new(r"(cat|dog)\1").unwrap();
        let m = re.find("catcat dogdog catdog").unwrap();
        assert_eq!(m.as_str(), "catcat");
    }
}
