// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/*!
Parsers for the supported grammars.

Both grammars are recursive descent parsers that emit bytecode directly,
without building a syntax tree first. They share the token cursor, the
bookkeeping for capture groups and loop counters, and the error reporting
in `ParserState`, and implement `Productions` for the actual grammar.
*/

use std::fmt;

use crate::compile::LookAround;
use crate::error::{Error, ErrorKind};
use crate::inst::{ByteCode, CompareArg, Inst};
use crate::lexer::{Lexer, Token, TokenType};
use crate::options::{EcmaScriptOptions, PosixOptions, RegexOptions};

pub(crate) mod ecma;
pub(crate) mod posix;

/// The grammar a pattern is written in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Grammar {
    /// POSIX basic regular expressions, as used by `grep`.
    PosixBasic,
    /// POSIX extended regular expressions, as used by `egrep`.
    PosixExtended,
    /// ECMAScript regular expressions.
    Ecma262,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::PosixBasic {}
    impl Sealed for super::PosixExtended {}
    impl Sealed for super::Ecma262 {}
}

/// A grammar that a [`Regex`](crate::Regex) can be parameterized with.
///
/// This trait is sealed. The implementations are [`PosixBasic`],
/// [`PosixExtended`] and [`Ecma262`].
pub trait GrammarParser:
    sealed::Sealed + Clone + Copy + fmt::Debug + Default + Send + Sync + 'static
{
    /// The option flags that make sense for this grammar.
    type Options: Copy + Default + fmt::Debug + Into<RegexOptions>;

    /// The grammar this parser implements.
    const GRAMMAR: Grammar;
}

/// POSIX basic regular expressions.
#[derive(Clone, Copy, Debug, Default)]
pub struct PosixBasic;

/// POSIX extended regular expressions.
#[derive(Clone, Copy, Debug, Default)]
pub struct PosixExtended;

/// ECMAScript (ECMA262) regular expressions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ecma262;

impl GrammarParser for PosixBasic {
    type Options = PosixOptions;
    const GRAMMAR: Grammar = Grammar::PosixBasic;
}

impl GrammarParser for PosixExtended {
    type Options = PosixOptions;
    const GRAMMAR: Grammar = Grammar::PosixExtended;
}

impl GrammarParser for Ecma262 {
    type Options = EcmaScriptOptions;
    const GRAMMAR: Grammar = Grammar::Ecma262;
}

/// Limits applied while parsing.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Limits {
    pub(crate) nest_limit: u32,
    pub(crate) size_limit: usize,
}

/// Everything a successful (or failed) parse produced.
#[derive(Clone)]
pub struct ParserResult {
    pub(crate) bytecode: ByteCode,
    pub(crate) capture_groups_count: usize,
    pub(crate) named_groups: Vec<(String, Vec<usize>)>,
    pub(crate) match_length_minimum: usize,
    pub(crate) repetition_marks: usize,
    pub(crate) checkpoints: usize,
    pub(crate) options: RegexOptions,
    pub(crate) error: Option<Error>,
}

impl ParserResult {
    /// The number of capture groups, not counting the whole match.
    pub fn capture_groups_count(&self) -> usize {
        self.capture_groups_count
    }

    /// The number of distinct capture group names.
    pub fn named_capture_groups_count(&self) -> usize {
        self.named_groups.len()
    }

    /// The smallest number of characters any match has.
    pub fn match_length_minimum(&self) -> usize {
        self.match_length_minimum
    }

    /// The flags the pattern was compiled with, including those the
    /// grammar implies.
    pub fn options(&self) -> RegexOptions {
        self.options
    }

    /// The first error found in the pattern, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Returns the names of all named groups, along with the indices of
    /// the groups that carry each name.
    pub fn capture_names(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.named_groups.iter().map(|(n, g)| (n.as_str(), g.as_slice()))
    }

    /// The name of capture group `group`, if it has one.
    pub fn capture_name(&self, group: usize) -> Option<&str> {
        self.named_groups
            .iter()
            .find(|(_, groups)| groups.contains(&group))
            .map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for ParserResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ParserResult")
            .field("capture_groups_count", &self.capture_groups_count)
            .field("named_groups", &self.named_groups)
            .field("match_length_minimum", &self.match_length_minimum)
            .field("options", &self.options)
            .field("error", &self.error)
            .finish()?;
        write!(f, "\n{:?}", self.bytecode)
    }
}

/// Parses `pattern` with the given grammar.
pub(crate) fn parse(
    grammar: Grammar,
    pattern: &str,
    options: RegexOptions,
    limits: Limits,
) -> ParserResult {
    let result = match grammar {
        Grammar::PosixBasic => {
            posix::PosixBasicParser::new(pattern, options, limits).parse()
        }
        Grammar::PosixExtended => {
            posix::PosixExtendedParser::new(pattern, options, limits).parse()
        }
        Grammar::Ecma262 => {
            let options = options | RegexOptions::INTERNAL_CONSIDER_NEWLINE;
            ecma::Ecma262Parser::new(pattern, options, limits).parse()
        }
    };
    if let Some(ref _err) = result.error {
        debug!(
            "failed to parse {:?} pattern {:?}: {:?} at column {}",
            grammar,
            pattern,
            _err.kind(),
            _err.column(),
        );
    } else {
        debug!(
            "parsed {:?} pattern {:?}: {} instructions, {} groups",
            grammar,
            pattern,
            result.bytecode.len(),
            result.capture_groups_count,
        );
        trace!("program for {:?}:\n{:?}", pattern, result.bytecode);
    }
    result
}

/// The number of characters a sub-expression can match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Length {
    pub(crate) min: usize,
    /// `None` when there is no upper bound.
    pub(crate) max: Option<usize>,
}

impl Length {
    pub(crate) const ZERO: Length = Length { min: 0, max: Some(0) };

    pub(crate) fn exact(n: usize) -> Length {
        Length { min: n, max: Some(n) }
    }

    pub(crate) fn at_least(n: usize) -> Length {
        Length { min: n, max: None }
    }

    /// The length of `self` followed by `next`.
    pub(crate) fn then(self, next: Length) -> Length {
        Length {
            min: self.min.saturating_add(next.min),
            max: match (self.max, next.max) {
                (Some(a), Some(b)) => a.checked_add(b),
                _ => None,
            },
        }
    }

    /// The length of either `self` or `other`.
    pub(crate) fn or(self, other: Length) -> Length {
        Length {
            min: self.min.min(other.min),
            max: match (self.max, other.max) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            },
        }
    }

    /// The length of `min` to `max` repetitions of `self`.
    pub(crate) fn repeat(self, min: usize, max: Option<usize>) -> Length {
        Length {
            min: self.min.saturating_mul(min),
            max: match (self.max, max) {
                (Some(0), _) => Some(0),
                (Some(a), Some(b)) => a.checked_mul(b),
                _ => None,
            },
        }
    }
}

/// A compiled sub-expression and how much it can match.
pub(crate) type Fragment = (ByteCode, Length);

#[derive(Clone, Debug)]
struct NamedGroup {
    name: String,
    /// Every group with this name, along with the alternation branches
    /// leading to it.
    members: Vec<(usize, Vec<(usize, usize)>)>,
}

/// The state shared by all grammars: the token cursor and everything that
/// is counted or named while parsing.
#[derive(Debug)]
pub(crate) struct ParserState<'p> {
    lexer: Lexer<'p>,
    token: Token<'p>,
    in_class: bool,
    options: RegexOptions,
    limits: Limits,
    depth: u32,
    capture_groups_count: usize,
    named_groups: Vec<NamedGroup>,
    /// The (disjunction, branch) pairs enclosing the current position.
    alternative_path: Vec<(usize, usize)>,
    disjunctions: usize,
    repetition_marks: usize,
    checkpoints: usize,
}

impl<'p> ParserState<'p> {
    pub(crate) fn new(
        pattern: &'p str,
        options: RegexOptions,
        limits: Limits,
    ) -> ParserState<'p> {
        let mut lexer = Lexer::new(pattern);
        let token = lexer.next();
        let mut state = ParserState {
            lexer,
            token,
            in_class: false,
            options,
            limits,
            depth: 0,
            capture_groups_count: 0,
            named_groups: vec![],
            alternative_path: vec![],
            disjunctions: 0,
            repetition_marks: 0,
            checkpoints: 0,
        };
        state.skip_trivia();
        state
    }

    pub(crate) fn options(&self) -> RegexOptions {
        self.options
    }

    pub(crate) fn has(&self, flag: RegexOptions) -> bool {
        self.options.contains(flag)
    }

    pub(crate) fn size_limit(&self) -> usize {
        self.limits.size_limit
    }

    pub(crate) fn pattern(&self) -> &'p str {
        self.lexer.pattern()
    }

    /// The current (not yet consumed) token.
    pub(crate) fn token(&self) -> Token<'p> {
        self.token
    }

    pub(crate) fn done(&self) -> bool {
        self.token.is_eof()
    }

    pub(crate) fn check(&self, kind: TokenType) -> bool {
        self.token.kind() == kind
    }

    /// Returns true iff the current token is exactly the character `c`
    /// (and not an escape sequence ending in it).
    pub(crate) fn check_char(&self, c: char) -> bool {
        self.token.kind() != TokenType::EscapeSequence
            && self.token.first() == Some(c)
    }

    /// Consumes the current token and reads the next one, skipping white
    /// space and comments in extended mode.
    pub(crate) fn consume(&mut self) -> Token<'p> {
        let token = self.token;
        self.token = self.lexer.next();
        self.skip_trivia();
        token
    }

    /// Consumes the current token and reads the next one as is. Used after
    /// a backslash and inside of multi character constructs.
    pub(crate) fn consume_raw(&mut self) -> Token<'p> {
        let token = self.token;
        self.token = self.lexer.next();
        token
    }

    /// Consumes a token of the given kind or fails with `kind`.
    pub(crate) fn expect(
        &mut self,
        ty: TokenType,
        kind: ErrorKind,
    ) -> Result<Token<'p>, Error> {
        if !self.check(ty) {
            return Err(self.error(kind));
        }
        Ok(self.consume())
    }

    /// Consumes the characters of `s` if the pattern continues with them,
    /// one token per character. Otherwise nothing is consumed.
    pub(crate) fn try_skip(&mut self, s: &str) -> bool {
        let start = self.token;
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if !self.check_char(c) || self.token.text().chars().count() != 1 {
                self.rewind(start);
                return false;
            }
            if chars.peek().is_some() {
                self.consume_raw();
            } else {
                self.consume();
            }
        }
        true
    }

    /// Makes `token` the current token again.
    pub(crate) fn rewind(&mut self, token: Token<'p>) {
        let distance = self.lexer.distance_from(token.position());
        self.lexer.back(distance);
        self.token = self.lexer.next();
    }

    /// Splits an escape sequence token into a backslash and whatever
    /// follows it, making the character after the backslash the current
    /// token.
    pub(crate) fn split_escape(&mut self) {
        let distance = self.lexer.distance_from(self.token.position() + 1);
        self.lexer.back(distance);
        self.token = self.lexer.next();
    }

    /// Enters or leaves a character class. Inside of one, white space is
    /// significant even in extended mode.
    pub(crate) fn set_in_class(&mut self, yes: bool) {
        self.in_class = yes;
    }

    pub(crate) fn in_class(&self) -> bool {
        self.in_class
    }

    fn skip_trivia(&mut self) {
        if self.in_class || !self.has(RegexOptions::EXTENDED) {
            return;
        }
        loop {
            if self.token.kind() != TokenType::Char {
                return;
            }
            match self.token.first() {
                Some(c) if c.is_whitespace() => {
                    self.token = self.lexer.next();
                }
                Some('#') => loop {
                    self.token = self.lexer.next();
                    if self.token.is_eof() {
                        return;
                    }
                    if self.token.first() == Some('\n') {
                        self.token = self.lexer.next();
                        break;
                    }
                },
                _ => return,
            }
        }
    }

    /// Reads up to `max_digits` digits in `radix` without skipping
    /// anything in between. Returns the value (saturated to `u32::MAX`)
    /// and the number of digits read, or `None` if there were none.
    pub(crate) fn read_digits(
        &mut self,
        radix: u32,
        max_digits: usize,
    ) -> Option<(u32, usize)> {
        let mut value: u32 = 0;
        let mut count = 0;
        while count < max_digits {
            let digit = match self.token.kind() {
                TokenType::Char => self.token.first().and_then(|c| c.to_digit(radix)),
                _ => None,
            };
            let digit = match digit {
                None => break,
                Some(digit) => digit,
            };
            value = value.saturating_mul(radix).saturating_add(digit);
            count += 1;
            self.consume_raw();
        }
        self.skip_trivia();
        if count == 0 {
            None
        } else {
            Some((value, count))
        }
    }

    /// Builds an error pointing at the current token.
    pub(crate) fn error(&self, kind: ErrorKind) -> Error {
        self.error_at(kind, self.token)
    }

    pub(crate) fn error_at(&self, kind: ErrorKind, token: Token<'p>) -> Error {
        let column = self
            .pattern()
            .get(..token.position())
            .map_or(0, |s| s.chars().count());
        Error::new(kind, column, token.text())
    }

    /// Increments the nesting depth, failing once it exceeds the nest
    /// limit.
    pub(crate) fn enter(&mut self) -> Result<(), Error> {
        if self.depth >= self.limits.nest_limit {
            return Err(self.error(ErrorKind::ReachedMaxRecursion));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Starts a new disjunction; subsequent groups are in its first branch.
    pub(crate) fn begin_disjunction(&mut self) {
        let id = self.disjunctions;
        self.disjunctions += 1;
        self.alternative_path.push((id, 0));
    }

    /// Moves on to the next branch of the innermost disjunction.
    pub(crate) fn next_branch(&mut self) {
        if let Some(last) = self.alternative_path.last_mut() {
            last.1 += 1;
        }
    }

    pub(crate) fn end_disjunction(&mut self) {
        self.alternative_path.pop();
    }

    /// Allocates the index of the next capture group.
    pub(crate) fn new_group(&mut self) -> usize {
        self.capture_groups_count += 1;
        self.capture_groups_count
    }

    pub(crate) fn capture_groups_count(&self) -> usize {
        self.capture_groups_count
    }

    pub(crate) fn next_checkpoint(&mut self) -> usize {
        self.checkpoints += 1;
        self.checkpoints - 1
    }

    pub(crate) fn next_repetition_mark(&mut self) -> usize {
        self.repetition_marks += 1;
        self.repetition_marks - 1
    }

    /// Returns the id of `name`, registering it if it was never seen.
    pub(crate) fn name_id(&mut self, name: &str) -> usize {
        match self.named_groups.iter().position(|g| g.name == name) {
            Some(id) => id,
            None => {
                self.named_groups
                    .push(NamedGroup { name: name.to_string(), members: vec![] });
                self.named_groups.len() - 1
            }
        }
    }

    /// Records that `group` is named `name`. A name may only be reused in
    /// a different branch of the same alternation.
    pub(crate) fn register_name(
        &mut self,
        name: &str,
        group: usize,
        token: Token<'p>,
    ) -> Result<usize, Error> {
        let id = self.name_id(name);
        let path = self.alternative_path.clone();
        let exclusive = |other: &[(usize, usize)]| {
            path.iter()
                .zip(other)
                .find(|(a, b)| a != b)
                .map_or(false, |(a, b)| a.0 == b.0)
        };
        if !self.named_groups[id].members.iter().all(|(_, p)| exclusive(p.as_slice())) {
            return Err(self.error_at(ErrorKind::DuplicateNamedCapture, token));
        }
        self.named_groups[id].members.push((group, path));
        Ok(id)
    }

    /// Returns an error if `c` is an ASCII letter and the `Extra` flag
    /// forbids escaping it.
    pub(crate) fn check_extra_escape(
        &self,
        c: char,
        token: Token<'p>,
    ) -> Result<(), Error> {
        if self.has(RegexOptions::EXTRA) && c.is_ascii_alphabetic() {
            let kind = if self.in_class {
                ErrorKind::InvalidCharacterClassEscape
            } else {
                ErrorKind::InvalidPattern
            };
            return Err(self.error_at(kind, token));
        }
        Ok(())
    }

    fn finish(
        self,
        bytecode: ByteCode,
        length: Length,
        error: Option<Error>,
    ) -> ParserResult {
        ParserResult {
            bytecode,
            capture_groups_count: self.capture_groups_count,
            named_groups: self
                .named_groups
                .into_iter()
                .filter(|g| !g.members.is_empty())
                .map(|g| (g.name, g.members.into_iter().map(|m| m.0).collect()))
                .collect(),
            match_length_minimum: length.min,
            repetition_marks: self.repetition_marks,
            checkpoints: self.checkpoints,
            options: self.options,
            error,
        }
    }
}

/// A grammar, written as a set of productions over a `ParserState`.
pub(crate) trait Productions<'p>: Sized {
    fn state(&mut self) -> &mut ParserState<'p>;

    fn into_state(self) -> ParserState<'p>;

    /// Parses the whole pattern, leaving the end of the pattern as the
    /// current token on success.
    fn parse_internal(&mut self) -> Result<Fragment, Error>;

    /// Parses the whole pattern and assembles the final program.
    fn parse(mut self) -> ParserResult {
        let result = self.parse_internal().and_then(|(code, length)| {
            let state = self.state();
            if !state.done() {
                let kind = if state.check(TokenType::RightParen) {
                    ErrorKind::MismatchingParen
                } else {
                    ErrorKind::InvalidPattern
                };
                return Err(state.error(kind));
            }
            if code.len() >= state.size_limit() {
                return Err(state.error(ErrorKind::InvalidBraceContent));
            }
            Ok((code, length))
        });
        let state = self.into_state();
        match result {
            Ok((mut code, length)) => {
                code.push(Inst::Exit);
                state.finish(code, length, None)
            }
            Err(err) => state.finish(ByteCode::new(), Length::ZERO, Some(err)),
        }
    }
}

/// Builds a single `Compare` matching `args`.
pub(crate) fn compare(args: &[CompareArg]) -> ByteCode {
    let mut code = ByteCode::new();
    code.push_compare(args);
    code
}

/// Builds the `Compare` of a bracket expression into `code`, which may
/// already hold tables the members point to.
///
/// Two or more ranges are merged into one sorted lookup table. Negated and
/// grouped members are kept together with whatever they apply to.
pub(crate) fn bracket(mut code: ByteCode, args: &[CompareArg]) -> ByteCode {
    let mut ranges = vec![];
    let mut members = vec![];
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            CompareArg::CharRange(start, end) => {
                ranges.push((start, end));
                i += 1;
            }
            CompareArg::TemporaryInverse | CompareArg::And | CompareArg::Or => {
                let end = member_end(args, i);
                members.extend_from_slice(&args[i..end]);
                i = end;
            }
            arg => {
                members.push(arg);
                i += 1;
            }
        }
    }
    match ranges.len() {
        0 => {}
        1 => members.push(CompareArg::CharRange(ranges[0].0, ranges[0].1)),
        _ => {
            let table = code.add_table(&merge_ranges(ranges));
            members.push(CompareArg::LookupTable(table));
        }
    }
    code.push_compare(&members);
    code
}

/// Returns the index just past the member of a class that starts at `i`,
/// including a leading negation and a whole `And`/`Or` group.
fn member_end(args: &[CompareArg], mut i: usize) -> usize {
    while args.get(i) == Some(&CompareArg::TemporaryInverse) {
        i += 1;
    }
    match args.get(i) {
        Some(CompareArg::And) | Some(CompareArg::Or) => {}
        Some(_) => return i + 1,
        None => return i,
    }
    let mut depth = 0;
    while i < args.len() {
        match args[i] {
            CompareArg::And | CompareArg::Or => depth += 1,
            CompareArg::EndAndOr => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    i
}

/// Sorts inclusive ranges and merges the ones that overlap or touch.
fn merge_ranges(mut ranges: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    ranges.sort_unstable();
    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1.saturating_add(1) => {
                last.1 = last.1.max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Builds a single instruction program.
pub(crate) fn single(inst: Inst) -> ByteCode {
    let mut code = ByteCode::new();
    code.push(inst);
    code
}

/// Builds a comparison against a literal run of characters.
pub(crate) fn literal(chars: &[u32]) -> ByteCode {
    let mut code = ByteCode::new();
    if let [c] = *chars {
        code.push_compare(&[CompareArg::Char(c)]);
    } else {
        let s = code.add_string(chars);
        code.push_compare(&[CompareArg::String(s)]);
    }
    code
}

/// Returns true iff quantifiers should be greedy, given whether the lazy
/// marker `?` followed the quantifier.
pub(crate) fn is_greedy(options: RegexOptions, lazy_marker: bool) -> bool {
    options.contains(RegexOptions::UNGREEDY) == lazy_marker
}

/// Folds the branches of a disjunction into nested alternations, leftmost
/// branch first.
pub(crate) fn alternatives(mut branches: Vec<Fragment>) -> Fragment {
    let (mut code, mut length) =
        branches.pop().unwrap_or((ByteCode::new(), Length::ZERO));
    while let Some((left, left_length)) = branches.pop() {
        code = ByteCode::alternation(left, code);
        length = left_length.or(length);
    }
    (code, length)
}

/// Wraps `body` in a repetition of `min` to `max` iterations. Capture
/// groups inside of `body` are reset at the start of each iteration.
pub(crate) fn repeat<'p>(
    state: &mut ParserState<'p>,
    (mut body, length): Fragment,
    min: usize,
    max: Option<usize>,
    greedy: bool,
    token: Token<'p>,
) -> Result<Fragment, Error> {
    body.clear_captures_on_entry();
    let code = match (min, max) {
        (0, None) => {
            ByteCode::repetition_any(body, greedy, state.next_checkpoint())
        }
        (1, None) => ByteCode::repetition_one_or_more(
            body,
            greedy,
            state.next_checkpoint(),
        ),
        (0, Some(1)) => ByteCode::repetition_zero_or_one(body, greedy),
        (1, Some(1)) => body,
        _ => {
            let mark = state.next_repetition_mark();
            let checkpoint = state.next_checkpoint();
            ByteCode::repetition_min_max(
                body,
                min,
                max,
                greedy,
                mark,
                checkpoint,
                state.size_limit(),
            )
            .ok_or_else(|| state.error_at(ErrorKind::InvalidBraceContent, token))?
        }
    };
    Ok((code, length.repeat(min, max)))
}

/// Parses the inside of an interval, `m`, `m,`, `m,n` or `,n`, up to and
/// including the closing brace. The opening brace is already consumed.
///
/// In the basic grammar the closing brace is written `\}`.
pub(crate) fn interval<'p>(
    state: &mut ParserState<'p>,
    basic: bool,
) -> Result<(usize, Option<usize>), Error> {
    let min = state.read_digits(10, usize::MAX);
    let (min, max) = if state.check(TokenType::Comma) {
        state.consume_raw();
        let max = state.read_digits(10, usize::MAX);
        if min.is_none() && max.is_none() && !basic {
            return Err(state.error(ErrorKind::InvalidBraceContent));
        }
        (min.map_or(0, |m| m.0), max.map(|m| m.0 as usize))
    } else {
        match min {
            None => return Err(state.error(ErrorKind::InvalidBraceContent)),
            Some((m, _)) => (m, Some(m as usize)),
        }
    };
    let closed = if basic {
        if state.check_char('\\') {
            let backslash = state.token();
            state.consume_raw();
            if state.check(TokenType::RightCurly) {
                true
            } else {
                state.rewind(backslash);
                false
            }
        } else {
            false
        }
    } else {
        state.check(TokenType::RightCurly)
    };
    if !closed {
        let kind = if state.done() {
            ErrorKind::MismatchingBrace
        } else {
            ErrorKind::InvalidBraceContent
        };
        return Err(state.error(kind));
    }
    state.consume();
    let min = min as usize;
    if max.map_or(false, |max| max < min) {
        return Err(state.error(ErrorKind::InvalidBraceContent));
    }
    Ok((min, max))
}

/// Wraps a parsed lookaround body. Lookbehind bodies need a bounded
/// length.
pub(crate) fn lookaround<'p>(
    state: &mut ParserState<'p>,
    kind: LookAround,
    (body, length): Fragment,
    open: Token<'p>,
) -> Result<Fragment, Error> {
    let behind = matches!(kind, LookAround::Behind | LookAround::NegatedBehind);
    let (min, max) = match (behind, length.max) {
        (false, _) => (0, 0),
        (true, None) => {
            return Err(state.error_at(ErrorKind::InvalidPattern, open))
        }
        (true, Some(max)) => (length.min, max),
    };
    if max.saturating_sub(min) > state.size_limit() {
        return Err(state.error_at(ErrorKind::InvalidPattern, open));
    }
    let checkpoint = if min != max { state.next_checkpoint() } else { 0 };
    let code = ByteCode::lookaround(body, kind, min, max, checkpoint);
    Ok((code, Length::ZERO))
}

/// Reads a capture group name up to and including the closing `>`.
pub(crate) fn group_name<'p>(
    state: &mut ParserState<'p>,
) -> Result<(String, Token<'p>), Error> {
    let start = state.token();
    let mut name = String::new();
    loop {
        let token = state.token();
        if token.is_eof() {
            return Err(state.error(ErrorKind::InvalidNameForCaptureGroup));
        }
        if token.kind() == TokenType::Char && token.first() == Some('>') {
            break;
        }
        let valid = token.kind() == TokenType::Char
            && token.first().map_or(false, |c| {
                c == '_'
                    || c == '$'
                    || c.is_alphabetic()
                    || (!name.is_empty() && c.is_alphanumeric())
            });
        if !valid {
            return Err(state.error(ErrorKind::InvalidNameForCaptureGroup));
        }
        name.push_str(token.text());
        state.consume_raw();
    }
    if name.is_empty() {
        return Err(state.error(ErrorKind::InvalidNameForCaptureGroup));
    }
    state.consume();
    Ok((name, start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> Limits {
        Limits { nest_limit: 250, size_limit: 10_000 }
    }

    #[test]
    fn try_skip_rewinds() {
        let mut state =
            ParserState::new("(?x", RegexOptions::empty(), limits());
        assert!(!state.try_skip("(?:"));
        assert!(state.check(TokenType::LeftParen));
        assert!(state.try_skip("(?"));
        assert_eq!("x", state.token().text());
    }

    #[test]
    fn extended_skips_comments() {
        let mut state =
            ParserState::new(" a # note\n b", RegexOptions::EXTENDED, limits());
        assert_eq!("a", state.consume().text());
        assert_eq!("b", state.consume().text());
        assert!(state.done());
    }

    #[test]
    fn error_columns_count_chars() {
        let mut state =
            ParserState::new("δδx", RegexOptions::empty(), limits());
        state.consume();
        state.consume();
        let err = state.error(ErrorKind::InvalidPattern);
        assert_eq!(2, err.column());
        assert_eq!("x", err.token());
    }

    #[test]
    fn duplicate_names() {
        let mut state =
            ParserState::new("", RegexOptions::empty(), limits());
        let token = state.token();
        state.begin_disjunction();
        state.register_name("a", 1, token).unwrap();
        state.next_branch();
        state.register_name("a", 2, token).unwrap();
        state.begin_disjunction();
        state.register_name("b", 3, token).unwrap();
        let err = state.register_name("b", 4, token).unwrap_err();
        assert_eq!(ErrorKind::DuplicateNamedCapture, err.kind());
        // Still within the second branch of the outer disjunction.
        let err = state.register_name("a", 5, token).unwrap_err();
        assert_eq!(ErrorKind::DuplicateNamedCapture, err.kind());
    }

    #[test]
    fn read_digits_saturates() {
        let mut state = ParserState::new(
            "99999999999999x",
            RegexOptions::empty(),
            limits(),
        );
        assert_eq!(Some((u32::MAX, 14)), state.read_digits(10, usize::MAX));
        assert_eq!(None, state.read_digits(10, usize::MAX));
    }

    #[test]
    fn length_arithmetic() {
        let a = Length::exact(2).or(Length::exact(4));
        assert_eq!(Length { min: 2, max: Some(4) }, a);
        assert_eq!(Length { min: 4, max: Some(12) }, a.repeat(2, Some(3)));
        assert_eq!(None, a.repeat(0, None).max);
        assert_eq!(Some(0), Length::ZERO.repeat(1, None).max);
        assert_eq!(Length::at_least(3), Length::exact(1).then(Length::at_least(2)));
    }

    #[test]
    fn greediness() {
        assert!(is_greedy(RegexOptions::empty(), false));
        assert!(!is_greedy(RegexOptions::empty(), true));
        assert!(!is_greedy(RegexOptions::UNGREEDY, false));
        assert!(is_greedy(RegexOptions::UNGREEDY, true));
    }

    /// Returns the argument list of the only `Compare` in `code`.
    fn compare_args(code: &ByteCode) -> Vec<CompareArg> {
        match code.insts() {
            [Inst::Compare { args }] => code.args(*args).to_vec(),
            insts => panic!("expected a single compare, got {:?}", insts),
        }
    }

    #[test]
    fn bracket_merges_ranges_into_a_table() {
        let code = bracket(
            ByteCode::new(),
            &[
                CompareArg::CharRange('x' as u32, 'z' as u32),
                CompareArg::Char('_' as u32),
                CompareArg::CharRange('a' as u32, 'c' as u32),
                CompareArg::CharRange('d' as u32, 'f' as u32),
            ],
        );
        let args = compare_args(&code);
        assert_eq!(2, args.len());
        assert_eq!(CompareArg::Char('_' as u32), args[0]);
        let table = match args[1] {
            CompareArg::LookupTable(t) => code.table(t).to_vec(),
            arg => panic!("expected a lookup table, got {:?}", arg),
        };
        assert_eq!(vec![(0x61, 0x66), (0x78, 0x7A)], table);
    }

    #[test]
    fn bracket_keeps_a_single_range() {
        let args = [CompareArg::Inverse, CompareArg::CharRange(0x30, 0x39)];
        assert_eq!(args.to_vec(), compare_args(&bracket(ByteCode::new(), &args)));
    }

    #[test]
    fn bracket_keeps_groups_together() {
        let args = [
            CompareArg::CharRange(0x30, 0x39),
            CompareArg::TemporaryInverse,
            CompareArg::Or,
            CompareArg::CharRange(0x61, 0x7A),
            CompareArg::Char(0x17F),
            CompareArg::EndAndOr,
            CompareArg::CharRange(0x41, 0x5A),
        ];
        let code = bracket(ByteCode::new(), &args);
        let got = compare_args(&code);
        assert_eq!(&args[1..6], &got[..5]);
        assert!(matches!(got[5], CompareArg::LookupTable(_)));
        assert_eq!(6, got.len());
    }

    #[test]
    fn ranges_merge_when_they_touch() {
        let merged = merge_ranges(vec![(10, 20), (0, 3), (21, 25), (2, 5), (30, 30)]);
        assert_eq!(vec![(0, 5), (10, 25), (30, 30)], merged);
    }
}
