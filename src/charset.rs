// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// A pluggable character-membership test: the matcher only ever asks a
// `CharSet` "does this scalar value belong to you", so swapping in a
// fuller Unicode category database later is a matter of constructing
// different `CharSet` values, not touching the compiler or matcher.

/// A bracket-expression's worth of character membership, or one of the
/// predefined classes (`\d \w \s` and their negations).
#[derive(Debug, Clone, PartialEq)]
pub struct CharSet {
    /// Inclusive scalar-value ranges, kept sorted and non-overlapping.
    ranges: Vec<(char, char)>,
    /// Predefined classes nested inside a bracket expression (e.g. the
    /// `\D` in `[\D\s]`), unioned with `ranges` before `negated` is
    /// applied. Each subset carries its own negation, so `[^\D]` (negate
    /// the union, where the union's one member already means "not a
    /// digit") correctly means "is a digit".
    subsets: Vec<CharSet>,
    negated: bool,
}

impl CharSet {
    /// Builds a set from arbitrary ranges, sorting and coalescing
    /// overlapping/adjacent ones so `contains` can binary search.
    pub fn from_ranges(mut ranges: Vec<(char, char)>, negated: bool) -> CharSet {
        ranges.sort_by_key(|&(lo, _)| lo);
        let mut merged: Vec<(char, char)> = Vec::with_capacity(ranges.len());
        for (lo, hi) in ranges {
            if let Some(last) = merged.last_mut() {
                if lo as u32 <= (last.1 as u32).saturating_add(1) {
                    if hi > last.1 {
                        last.1 = hi;
                    }
                    continue;
                }
            }
            merged.push((lo, hi));
        }
        CharSet { ranges: merged, subsets: Vec::new(), negated }
    }

    /// Builds a set out of plain ranges plus nested predefined classes
    /// (used for bracket expressions like `[a-z\d]`).
    pub fn from_ranges_and_subsets(
        ranges: Vec<(char, char)>,
        subsets: Vec<CharSet>,
        negated: bool,
    ) -> CharSet {
        let mut set = CharSet::from_ranges(ranges, negated);
        set.subsets = subsets;
        set
    }

    pub fn single(c: char) -> CharSet {
        CharSet::from_ranges(vec![(c, c)], false)
    }

    pub fn digit() -> CharSet {
        CharSet::from_ranges(vec![('0', '9')], false)
    }

    pub fn not_digit() -> CharSet {
        CharSet::from_ranges(vec![('0', '9')], true)
    }

    pub fn word() -> CharSet {
        CharSet::from_ranges(vec![('0', '9'), ('A', 'Z'), ('a', 'z'), ('_', '_')], false)
    }

    pub fn not_word() -> CharSet {
        CharSet::from_ranges(vec![('0', '9'), ('A', 'Z'), ('a', 'z'), ('_', '_')], true)
    }

    pub fn whitespace() -> CharSet {
        CharSet::from_ranges(
            vec![(' ', ' '), ('\t', '\t'), ('\n', '\n'), ('\r', '\r'), ('\x0b', '\x0c')],
            false,
        )
    }

    pub fn not_whitespace() -> CharSet {
        CharSet::from_ranges(
            vec![(' ', ' '), ('\t', '\t'), ('\n', '\n'), ('\r', '\r'), ('\x0b', '\x0c')],
            true,
        )
    }

    fn ranges_contain(&self, c: char) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if c < lo {
                    std::cmp::Ordering::Greater
                } else if c > hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Does this set contain `c`? When `case_insensitive` is set, `c` is
    /// considered a member if either it or one of its simple case
    /// variants (upper/lower, via `char::to_ascii_uppercase`'s Unicode
    /// analogues) falls in range.
    pub fn contains(&self, c: char, case_insensitive: bool) -> bool {
        let own_hit = if case_insensitive {
            self.ranges_contain(c)
                || c.to_lowercase().any(|lc| self.ranges_contain(lc))
                || c.to_uppercase().any(|uc| self.ranges_contain(uc))
        } else {
            self.ranges_contain(c)
        };
        let hit = own_hit || self.subsets.iter().any(|s| s.contains(c, case_insensitive));
        hit != self.negated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_matches_ascii_digits_only() {
        let d = CharSet::digit();
        assert!(d.contains('5', false));
        assert!(!d.contains('a', false));
    }

    #[test]
    fn negation_inverts_membership() {
        let d = CharSet::not_digit();
        assert!(!d.contains('5', false));
        assert!(d.contains('a', false));
    }

    #[test]
    fn case_insensitive_matches_either_case() {
        let set = CharSet::from_ranges(vec![('a', 'a')], false);
        assert!(set.contains('A', true));
        assert!(!set.contains('A', false));
    }

    #[test]
    fn overlapping_ranges_are_coalesced() {
        let set = CharSet::from_ranges(vec![('a', 'c'), ('b', 'd'), ('f', 'f')], false);
        assert!(set.contains('d', false));
        assert!(!set.contains('e', false));
        assert!(set.contains('f', false));
    }

    #[test]
    fn nested_subset_is_unioned_before_negation() {
        // [^\D] == digits only.
        let set = CharSet::from_ranges_and_subsets(vec![], vec![CharSet::not_digit()], true);
        assert!(set.contains('5', false));
        assert!(!set.contains('a', false));
    }
}
