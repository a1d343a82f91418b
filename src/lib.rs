// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A regular expression engine built around two matching strategies: a
//! Thompson-construction NFA simulated in parallel (linear time, no
//! backreferences) and a continuation-passing backtracker that walks the
//! parsed syntax tree directly (supports backreferences, worst-case
//! exponential). A pattern is compiled once, at which point it is
//! classified into exactly one of the two engines; `Regex::search` never
//! re-weighs that choice per call.
//!
//! ```
//! use nfarx::Regex;
//!
//! let re = Regex::new(r"(\w+)@(\w+)\.com").unwrap();
//! let caps = re.captures("contact: user@example.com").unwrap();
//! assert_eq!(caps.get(1).unwrap().as_str(), "user");
//! ```

mod ast;
mod backtrack;
mod charset;
mod compile;
mod cursor;
mod error;
mod grammar;
mod literals;
mod nfa;
mod parser;
mod program;
mod regex;
mod state;

pub use crate::error::{CompileError, CompileErrorKind};
pub use crate::program::Options;
pub use crate::regex::{Captures, CapturesIter, ForcedEngine, Match, Matches, Regex, Split};
