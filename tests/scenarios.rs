// The six numbered scenarios, run as integration tests against the
// public façade rather than any engine internals.

use nfarx::{Options, Regex};

fn full_matches(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

#[test]
fn scenario_1_nested_quantifier_with_capture() {
    let re = Regex::new(r"a(b+)c").unwrap();
    let matches: Vec<_> = re.captures_iter("aabbbcdabc").collect();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].get(0).unwrap().as_str(), "abbbc");
    assert_eq!(matches[0].get(1).unwrap().as_str(), "bbb");
    assert_eq!(matches[1].get(0).unwrap().as_str(), "abc");
    assert_eq!(matches[1].get(1).unwrap().as_str(), "b");
}

#[test]
fn scenario_2_starred_alternation() {
    let re = Regex::new(r"(a|b)*").unwrap();
    let caps = re.captures("abba").unwrap();
    assert_eq!(caps.get(0).unwrap().as_str(), "abba");
    assert_eq!(caps.get(1).unwrap().as_str(), "a");
}

#[test]
fn scenario_3_bounded_digit_repetition() {
    let re = Regex::new(r"\d{2,4}").unwrap();
    let found = full_matches(&re, "1 12 123 1234 12345");
    assert_eq!(found, vec!["12", "123", "1234", "1234"]);
}

#[test]
fn scenario_4_multiline_start_anchor() {
    let re = Regex::with_options("^foo", Options { multiline: true, ..Options::new() }).unwrap();
    let found = full_matches(&re, "foo\nbar\nfoobar");
    assert_eq!(found, vec!["foo", "foo"]);
}

#[test]
fn scenario_5_backreference_requires_backtracker() {
    let re = Regex::new(r"(cat|dog)\1").unwrap();
    let matches: Vec<_> = re.captures_iter("catcat dogdog catdog").collect();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].get(0).unwrap().as_str(), "catcat");
    assert_eq!(matches[0].get(1).unwrap().as_str(), "cat");
    assert_eq!(matches[1].get(0).unwrap().as_str(), "dogdog");
    assert_eq!(matches[1].get(1).unwrap().as_str(), "dog");
}

#[test]
fn scenario_6_dot_does_not_cross_newline_by_default() {
    let re = Regex::with_options("a.*b", Options { dot_matches_line_separators: false, ..Options::new() }).unwrap();
    assert!(!re.is_match("a\nxb"));
}
