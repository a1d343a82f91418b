// Differential testing: every backreference-free pattern must produce
// identical `fullMatch` sequences whether it's forced onto the NFA
// simulator or the backtracker, per the invariant in spec.md's Testable
// Properties section. A handful of fixed patterns plus randomly generated
// alphabet/length combinations over a small alphabet.

use nfarx::{ForcedEngine, Options, Regex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FIXED_PATTERNS: &[&str] = &[
    "a+",
    "a*b",
    "(a|b)+c?",
    r"\d{2,4}",
    r"[a-z]+\s*\d*",
    "(ab)+",
    "a|ab|abc",
    r"\w+@\w+",
];

fn full_matches(re: &Regex, text: &str) -> Vec<(usize, usize)> {
    re.find_iter(text).map(|m| (m.start(), m.end())).collect()
}

fn assert_engines_agree(pattern: &str, text: &str) {
    let nfa = Regex::with_engine(pattern, Options::new(), ForcedEngine::Nfa)
        .unwrap_or_else(|e| panic!("pattern {:?} failed to compile under the nfa engine: {}", pattern, e));
    let backtrack = Regex::with_engine(pattern, Options::new(), ForcedEngine::Backtrack)
        .unwrap_or_else(|e| panic!("pattern {:?} failed to compile under the backtracking engine: {}", pattern, e));

    let nfa_matches = full_matches(&nfa, text);
    let backtrack_matches = full_matches(&backtrack, text);
    assert_eq!(
        nfa_matches, backtrack_matches,
        "engines disagree on pattern {:?} against {:?}",
        pattern, text
    );
}

#[test]
fn fixed_corpus_agrees_across_engines() {
    let _ = env_logger::try_init();
    let inputs = ["", "a", "aaab", "abcabcabc", "1 12 123 1234 12345", "az9 bz3", "ababab", "a@b ab@cd"];
    for pattern in FIXED_PATTERNS {
        for text in &inputs {
            assert_engines_agree(pattern, text);
        }
    }
}

#[test]
fn random_alphabet_and_length_combinations_agree_across_engines() {
    let _ = env_logger::try_init();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let patterns = ["a+b*", "(a|b){1,3}c", "a.b", "[ab]+", "(a|bb)+"];
    let alphabet = ['a', 'b', 'c'];

    for pattern in patterns {
        for _ in 0..25 {
            let len = rng.gen_range(0..12);
            let text: String = (0..len).map(|_| alphabet[rng.gen_range(0..alphabet.len())]).collect();
            assert_engines_agree(pattern, &text);
        }
    }
}
