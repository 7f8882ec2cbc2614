// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This crate provides a backtracking implementation of regular expressions
//! in three grammars: POSIX basic, POSIX extended and ECMA262 (the grammar of
//! JavaScript regular expressions). Unlike the `regex` crate, it supports
//! backreferences and arbitrary lookahead and lookbehind. In return, matching
//! can take exponential time on pathological patterns. Every search is
//! therefore bounded by a recursion limit, and a search that hits it reports
//! [`MatchOutcome::Aborted`] instead of running forever.
//!
//! Patterns are parsed into a compact bytecode which a virtual machine
//! executes against a subject. The program of any regex can be inspected
//! through the `Debug` impl of [`Regex::parser_result`].
//!
//! # First example: find a date
//!
//! ```rust
//! use regex_backtrack::{EcmaScriptOptions, Regex};
//!
//! let re: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$", EcmaScriptOptions::empty());
//! assert!(re.has_match("2014-01-01", None));
//! ```
//!
//! The grammar is a type parameter of [`Regex`] and defaults to ECMA262.
//! A POSIX regex is spelled out:
//!
//! ```rust
//! use regex_backtrack::{PosixBasic, PosixOptions, Regex};
//!
//! let re = Regex::<PosixBasic>::new(r"\(ab\)*c", PosixOptions::empty());
//! assert!(re.has_match("ababc", None));
//! ```
//!
//! # Matching versus searching
//!
//! [`Regex::matches`] runs the regex with the flags it was built with plus
//! the flags given to the call. Unless one of [`RegexOptions::GLOBAL`],
//! [`RegexOptions::MULTILINE`] or stateful matching is in effect, the regex
//! has to match the whole subject. [`Regex::search`] always adds
//! `GLOBAL`, finding every non-overlapping match:
//!
//! ```rust
//! use regex_backtrack::{EcmaScriptOptions, Regex};
//!
//! let re: Regex = Regex::new(r"[a-z]+", EcmaScriptOptions::empty());
//! assert!(!re.has_match("ab cd", None));
//!
//! let result = re.search("ab cd", None);
//! let words: Vec<&str> =
//!     result.matches.iter().filter_map(|m| m.as_str()).collect();
//! assert_eq!(vec!["ab", "cd"], words);
//! ```
//!
//! # Subjects
//!
//! A subject is a [`RegexStringView`]: UTF-8 text, arbitrary bytes (each
//! byte is one character) or UTF-32 text. Match offsets count the code units
//! of the subject.
//!
//! # Replacement
//!
//! ```rust
//! use regex_backtrack::{EcmaScriptOptions, Regex};
//!
//! let re: Regex = Regex::new(r"(\w+)@(\w+)", EcmaScriptOptions::empty());
//! let got = re.replace("mail bob@home now", r"\2 for \1", None);
//! assert_eq!("mail home for bob now", got);
//! ```
//!
//! # Crate features
//!
//! * **unicode** (enabled by default) - Resolves `\p{..}` property escapes
//!   of ECMA262 patterns in Unicode mode.
//! * **logging** - Emits debug and trace messages through the `log` crate.

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

pub use crate::error::{Error, ErrorKind};
pub use crate::expand::escape;
pub use crate::input::RegexStringView;
pub use crate::options::{EcmaScriptOptions, PosixOptions, RegexOptions};
pub use crate::parser::{
    Ecma262, Grammar, GrammarParser, ParserResult, PosixBasic, PosixExtended,
};
pub use crate::re::{
    Match, MatchOutcome, MatchText, Regex, RegexBuilder, RegexResult,
};

#[macro_use]
mod macros;

mod backtrack;
mod char;
mod compile;
mod error;
mod exec;
mod expand;
mod input;
mod inst;
mod lexer;
mod options;
mod parser;
mod re;
mod unicode;
