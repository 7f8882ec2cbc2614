// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::Error;
use crate::exec::{SearchOutput, Searcher};
use crate::expand::expand;
use crate::input::RegexStringView;
use crate::inst::Inst;
use crate::options::{EcmaScriptOptions, RegexOptions};
use crate::parser::{self, Ecma262, GrammarParser, Limits, ParserResult};

const DEFAULT_RECURSION_LIMIT: usize = 5000;
const DEFAULT_NEST_LIMIT: u32 = 250;
const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20) / std::mem::size_of::<Inst>();

/// The text of a match, in the flavor of the subject it was found in.
///
/// The text borrows from the subject unless the match was made with
/// [`RegexOptions::STRING_COPY_MATCHES`] or turned into an owned value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MatchText<'h> {
    Bytes(Cow<'h, [u8]>),
    Utf8(Cow<'h, str>),
    Utf32(Cow<'h, [char]>),
}

impl<'h> MatchText<'h> {
    fn new(view: RegexStringView<'h>, copy: bool) -> MatchText<'h> {
        match view {
            RegexStringView::Bytes(b) if copy => MatchText::Bytes(Cow::Owned(b.to_vec())),
            RegexStringView::Bytes(b) => MatchText::Bytes(Cow::Borrowed(b)),
            RegexStringView::Utf8(s) if copy => MatchText::Utf8(Cow::Owned(s.to_string())),
            RegexStringView::Utf8(s) => MatchText::Utf8(Cow::Borrowed(s)),
            RegexStringView::Utf32(cs) if copy => MatchText::Utf32(Cow::Owned(cs.to_vec())),
            RegexStringView::Utf32(cs) => MatchText::Utf32(Cow::Borrowed(cs)),
        }
    }

    /// Returns a view of this text.
    pub fn view(&self) -> RegexStringView<'_> {
        match *self {
            MatchText::Bytes(ref b) => RegexStringView::Bytes(b),
            MatchText::Utf8(ref s) => RegexStringView::Utf8(s),
            MatchText::Utf32(ref cs) => RegexStringView::Utf32(cs),
        }
    }

    /// Returns this text as a string, replacing invalid UTF-8 with
    /// U+FFFD.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        self.view().to_string_lossy()
    }

    fn is_owned(&self) -> bool {
        matches!(
            *self,
            MatchText::Bytes(Cow::Owned(_))
                | MatchText::Utf8(Cow::Owned(_))
                | MatchText::Utf32(Cow::Owned(_))
        )
    }

    fn into_owned(self) -> MatchText<'static> {
        match self {
            MatchText::Bytes(b) => MatchText::Bytes(Cow::Owned(b.into_owned())),
            MatchText::Utf8(s) => MatchText::Utf8(Cow::Owned(s.into_owned())),
            MatchText::Utf32(cs) => MatchText::Utf32(Cow::Owned(cs.into_owned())),
        }
    }
}

/// A single match of a regex or one of its capture groups.
///
/// Offsets count code units of the subject: bytes for byte and UTF-8
/// subjects, characters for UTF-32 subjects.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Match<'h> {
    text: MatchText<'h>,
    line: usize,
    column: usize,
    global_offset: usize,
}

impl<'h> Match<'h> {
    fn new(
        line_view: RegexStringView<'h>,
        (start, end): (usize, usize),
        line: usize,
        line_offset: usize,
        copy: bool,
    ) -> Match<'h> {
        Match {
            text: MatchText::new(line_view.substring(start, end), copy),
            line,
            column: start,
            global_offset: line_offset + start,
        }
    }

    /// The text that matched.
    pub fn text(&self) -> &MatchText<'h> {
        &self.text
    }

    /// The index of the line this match was found in. Always `0` unless
    /// the subject was matched line by line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The offset of this match within its line.
    pub fn column(&self) -> usize {
        self.column
    }

    /// The offset of this match within the whole subject.
    pub fn global_offset(&self) -> usize {
        self.global_offset
    }

    pub fn start(&self) -> usize {
        self.global_offset
    }

    pub fn end(&self) -> usize {
        self.global_offset + self.len()
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// The length of this match in code units.
    pub fn len(&self) -> usize {
        self.text.view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the matched text if it is valid UTF-8 (or a UTF-8 subject).
    /// UTF-32 matches return `None`; use [`MatchText::to_string_lossy`].
    pub fn as_str(&self) -> Option<&str> {
        match self.text {
            MatchText::Utf8(ref s) => Some(s),
            MatchText::Bytes(ref b) => std::str::from_utf8(b).ok(),
            MatchText::Utf32(_) => None,
        }
    }

    /// Returns the matched bytes of a byte or UTF-8 subject.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self.text {
            MatchText::Bytes(ref b) => Some(b),
            MatchText::Utf8(ref s) => Some(s.as_bytes()),
            MatchText::Utf32(_) => None,
        }
    }

    pub fn view(&self) -> RegexStringView<'_> {
        self.text.view()
    }

    /// Returns true iff the text of this match no longer borrows from the
    /// subject.
    pub fn is_owned(&self) -> bool {
        self.text.is_owned()
    }

    /// Copies the matched text so that the match outlives the subject.
    pub fn into_owned(self) -> Match<'static> {
        Match {
            text: self.text.into_owned(),
            line: self.line,
            column: self.column,
            global_offset: self.global_offset,
        }
    }
}

/// How a search ended.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatchOutcome {
    Matched,
    NoMatch,
    /// The search exceeded the recursion limit before it could decide.
    /// This does not mean that there is no match.
    Aborted,
}

/// The result of matching a regex against a subject.
#[derive(Clone, Debug)]
pub struct RegexResult<'h> {
    /// True iff `outcome` is `Matched`.
    pub success: bool,
    pub outcome: MatchOutcome,
    /// The number of matches.
    pub count: usize,
    pub matches: Vec<Match<'h>>,
    /// For every match, the match of each capture group, starting with
    /// group `1`. Trailing groups that did not participate are left out
    /// unless [`RegexOptions::SKIP_TRIM_EMPTY_MATCHES`] is set.
    pub capture_group_matches: Vec<Vec<Option<Match<'h>>>>,
    /// For every match, the match of each named group that participated.
    pub named_capture_group_matches: Vec<HashMap<String, Match<'h>>>,
    /// The number of VM instructions executed.
    pub operations: usize,
    pub n_capture_groups: usize,
    pub n_named_capture_groups: usize,
}

impl<'h> RegexResult<'h> {
    fn empty(prog: &ParserResult) -> RegexResult<'h> {
        RegexResult {
            success: false,
            outcome: MatchOutcome::NoMatch,
            count: 0,
            matches: vec![],
            capture_group_matches: vec![],
            named_capture_group_matches: vec![],
            operations: 0,
            n_capture_groups: prog.capture_groups_count,
            n_named_capture_groups: prog.named_groups.len(),
        }
    }

    fn from_search(
        prog: &ParserResult,
        out: SearchOutput<'h>,
        options: RegexOptions,
    ) -> RegexResult<'h> {
        let copy = options.contains(RegexOptions::STRING_COPY_MATCHES);
        let skip = options.contains(RegexOptions::SKIP_SUB_EXPR_RESULTS);
        let keep_empty = options.contains(RegexOptions::SKIP_TRIM_EMPTY_MATCHES);
        let mut result = RegexResult::empty(prog);
        result.operations = out.operations;
        result.outcome = if out.aborted {
            MatchOutcome::Aborted
        } else if out.matches.is_empty() {
            MatchOutcome::NoMatch
        } else {
            MatchOutcome::Matched
        };
        result.success = result.outcome == MatchOutcome::Matched;
        for raw in out.matches {
            let group = |g: usize| {
                let span = raw.captures.get(g).copied().flatten()?;
                Some(Match::new(raw.view, span, raw.line, raw.line_offset, copy))
            };
            let mut groups = vec![];
            let mut named = HashMap::new();
            if !skip {
                groups = (1..=prog.capture_groups_count).map(group).collect();
                if !keep_empty {
                    while matches!(groups.last(), Some(None)) {
                        groups.pop();
                    }
                }
                for (name, members) in prog.named_groups.iter() {
                    if let Some(m) = members.iter().find_map(|&g| group(g)) {
                        named.insert(name.clone(), m);
                    }
                }
            }
            result.matches.push(Match::new(
                raw.view,
                (raw.start, raw.end),
                raw.line,
                raw.line_offset,
                copy,
            ));
            result.capture_group_matches.push(groups);
            result.named_capture_group_matches.push(named);
        }
        result.count = result.matches.len();
        result
    }
}

/// A compiled regular expression in grammar `G`.
///
/// Compiling never panics. If the pattern is invalid, the error is kept
/// on the `Regex` (see [`Regex::error`]) and every match operation returns
/// an empty result. Use [`Regex::try_new`] or [`RegexBuilder::build`] to
/// get the error up front instead.
///
/// A `Regex` carries a start offset for stateful matching (see
/// [`RegexOptions::INTERNAL_STATEFUL`]). Concurrent stateful matches on the
/// same value race on that offset; clone the regex (which starts with a
/// fresh offset) to scan several subjects at once.
///
/// # Example
///
/// ```rust
/// use regex_backtrack::{EcmaScriptOptions, Regex};
///
/// let re: Regex = Regex::new(r"(?<year>\d{4})-(\d{2})", EcmaScriptOptions::empty());
/// let result = re.search("born 1969-07", None);
/// assert!(result.success);
/// assert_eq!(Some("1969-07"), result.matches[0].as_str());
/// assert_eq!(5, result.matches[0].start());
/// let year = &result.named_capture_group_matches[0]["year"];
/// assert_eq!(Some("1969"), year.as_str());
/// ```
pub struct Regex<G: GrammarParser = Ecma262> {
    pattern: Arc<str>,
    prog: Arc<ParserResult>,
    recursion_limit: usize,
    start_offset: AtomicUsize,
    grammar: PhantomData<G>,
}

impl<G: GrammarParser> Clone for Regex<G> {
    fn clone(&self) -> Regex<G> {
        Regex {
            pattern: self.pattern.clone(),
            prog: self.prog.clone(),
            recursion_limit: self.recursion_limit,
            start_offset: AtomicUsize::new(0),
            grammar: PhantomData,
        }
    }
}

impl<G: GrammarParser> fmt::Display for Regex<G> {
    /// Shows the original regular expression.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<G: GrammarParser> fmt::Debug for Regex<G> {
    /// Shows the original regular expression.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Regex<Ecma262> {
    type Err = Error;

    /// Attempts to parse a string into an ECMA262 regular expression.
    fn from_str(s: &str) -> Result<Regex<Ecma262>, Error> {
        Regex::try_new(s, EcmaScriptOptions::empty())
    }
}

impl<G: GrammarParser> Regex<G> {
    /// Compiles `pattern` with the given default flags.
    ///
    /// This never fails. If the pattern is invalid, [`Regex::error`]
    /// returns the error and nothing ever matches.
    pub fn new(pattern: &str, options: G::Options) -> Regex<G> {
        let mut builder = RegexBuilder::new(pattern);
        builder.options(options);
        builder.compile()
    }

    /// Compiles `pattern` with the given default flags, failing if it is
    /// invalid.
    pub fn try_new(pattern: &str, options: G::Options) -> Result<Regex<G>, Error> {
        let mut builder = RegexBuilder::new(pattern);
        builder.options(options);
        builder.build()
    }

    /// Returns the original pattern.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The flags the pattern was compiled with, including those implied by
    /// the grammar.
    pub fn options(&self) -> RegexOptions {
        self.prog.options
    }

    /// The error that made the pattern invalid, if any.
    pub fn error(&self) -> Option<&Error> {
        self.prog.error.as_ref()
    }

    /// Renders the error of an invalid pattern, pointing at the offending
    /// token. `message` replaces the canonical message of the error.
    pub fn error_string(&self, message: Option<&str>) -> String {
        match self.prog.error {
            None => message.unwrap_or("No error").to_string(),
            Some(ref err) => err.render(&self.pattern, message),
        }
    }

    pub fn capture_groups_count(&self) -> usize {
        self.prog.capture_groups_count
    }

    pub fn named_capture_groups_count(&self) -> usize {
        self.prog.named_groups.len()
    }

    /// Returns every group name along with the groups that carry it.
    pub fn capture_names(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.prog.capture_names()
    }

    /// Returns everything the parser produced, including the compiled
    /// program (shown by its `Debug` impl).
    pub fn parser_result(&self) -> &ParserResult {
        &self.prog
    }

    /// The offset where the next stateful match starts.
    pub fn start_offset(&self) -> usize {
        self.start_offset.load(Ordering::Relaxed)
    }

    pub fn set_start_offset(&self, offset: usize) {
        self.start_offset.store(offset, Ordering::Relaxed);
    }

    /// Matches `view` with the default flags plus `options`.
    ///
    /// Without [`RegexOptions::GLOBAL`], [`RegexOptions::MULTILINE`] or
    /// stateful matching, the whole subject has to match.
    pub fn matches<'h>(
        &self,
        view: impl Into<RegexStringView<'h>>,
        options: impl Into<Option<G::Options>>,
    ) -> RegexResult<'h> {
        let view = view.into();
        let options = call_options::<G>(options.into());
        let searcher = Searcher::new(&self.prog, options, self.recursion_limit);
        let lines = if searcher.splits_lines() {
            view.lines()
        } else {
            vec![view]
        };
        self.run(&searcher, &lines)
    }

    /// Matches the lines of a subject that the caller has already split.
    /// The lines are assumed to be separated by one code unit each.
    pub fn match_views<'h>(
        &self,
        views: &[RegexStringView<'h>],
        options: impl Into<Option<G::Options>>,
    ) -> RegexResult<'h> {
        let options = call_options::<G>(options.into());
        let searcher = Searcher::new(&self.prog, options, self.recursion_limit);
        self.run(&searcher, views)
    }

    /// Finds all matches anywhere in `view`.
    ///
    /// This is [`Regex::matches`] with [`RegexOptions::GLOBAL`] added. If
    /// both [`RegexOptions::MATCH_NOT_BEGIN_OF_LINE`] and
    /// [`RegexOptions::MATCH_NOT_END_OF_LINE`] are set, both are dropped.
    pub fn search<'h>(
        &self,
        view: impl Into<RegexStringView<'h>>,
        options: impl Into<Option<G::Options>>,
    ) -> RegexResult<'h> {
        let view = view.into();
        let mut options =
            self.prog.options | call_options::<G>(options.into()) | RegexOptions::GLOBAL;
        let not_line = RegexOptions::MATCH_NOT_BEGIN_OF_LINE
            | RegexOptions::MATCH_NOT_END_OF_LINE;
        if options.contains(not_line) {
            options.remove(not_line);
        }
        let searcher =
            Searcher::with_options(&self.prog, options, self.recursion_limit);
        let lines = if searcher.splits_lines() {
            view.lines()
        } else {
            vec![view]
        };
        self.run(&searcher, &lines)
    }

    /// Returns true iff [`Regex::matches`] would succeed, without
    /// materializing any capture groups.
    pub fn has_match<'h>(
        &self,
        view: impl Into<RegexStringView<'h>>,
        options: impl Into<Option<G::Options>>,
    ) -> bool {
        let view = view.into();
        let options = call_options::<G>(options.into())
            | RegexOptions::SKIP_SUB_EXPR_RESULTS
            | RegexOptions::SINGLE_MATCH;
        let searcher = Searcher::new(&self.prog, options, self.recursion_limit);
        let lines = if searcher.splits_lines() {
            view.lines()
        } else {
            vec![view]
        };
        self.run(&searcher, &lines).success
    }

    /// Replaces every match found by [`Regex::search`] with `replacement`,
    /// in which `\N` stands for capture group `N`, `\0` for the whole match
    /// and `\\` for a backslash.
    ///
    /// With [`RegexOptions::SINGLE_MATCH`] only the first match is
    /// replaced.
    pub fn replace<'h>(
        &self,
        view: impl Into<RegexStringView<'h>>,
        replacement: &str,
        options: impl Into<Option<G::Options>>,
    ) -> String {
        let view = view.into();
        let result = self.search(view, options);
        if !result.success {
            return view.to_string_lossy().into_owned();
        }
        let mut out = String::new();
        let mut last = 0;
        for (i, m) in result.matches.iter().enumerate() {
            out.push_str(&view.substring(last, m.start()).to_string_lossy());
            last = m.end();
            let mut groups = vec![Some(m.text().to_string_lossy())];
            if let Some(caps) = result.capture_group_matches.get(i) {
                groups.extend(
                    caps.iter()
                        .map(|c| c.as_ref().map(|c| c.text().to_string_lossy())),
                );
            }
            expand(replacement, &groups, result.n_capture_groups, &mut out);
        }
        out.push_str(&view.substring(last, view.len()).to_string_lossy());
        out
    }

    fn run<'h>(
        &self,
        searcher: &Searcher<'_>,
        lines: &[RegexStringView<'h>],
    ) -> RegexResult<'h> {
        if let Some(ref _err) = self.prog.error {
            debug!("not matching invalid pattern {:?}: {}", self.pattern, _err);
            return RegexResult::empty(&self.prog);
        }
        let options = searcher.options();
        let stateful = options.contains(RegexOptions::INTERNAL_STATEFUL);
        let start = if stateful { self.start_offset() } else { 0 };
        let out = searcher.search(lines, start);
        if stateful {
            self.set_start_offset(out.next_offset);
        }
        RegexResult::from_search(&self.prog, out, options)
    }
}

fn call_options<G: GrammarParser>(options: Option<G::Options>) -> RegexOptions {
    options.map_or(RegexOptions::empty(), Into::into)
}

/// A configurable builder for a regular expression.
///
/// A builder can be used to configure the default flags of a regex and
/// the limits it is compiled and matched with.
#[derive(Clone, Debug)]
pub struct RegexBuilder<G: GrammarParser = Ecma262> {
    pattern: String,
    options: RegexOptions,
    recursion_limit: usize,
    limits: Limits,
    grammar: PhantomData<G>,
}

impl<G: GrammarParser> RegexBuilder<G> {
    /// Create a new regular expression builder with the given pattern.
    ///
    /// If the pattern is invalid, then an error will be returned when
    /// `build` is called.
    pub fn new(pattern: &str) -> RegexBuilder<G> {
        RegexBuilder {
            pattern: pattern.to_string(),
            options: RegexOptions::empty(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            limits: Limits {
                nest_limit: DEFAULT_NEST_LIMIT,
                size_limit: DEFAULT_SIZE_LIMIT,
            },
            grammar: PhantomData,
        }
    }

    /// Consume the builder and compile the regular expression.
    pub fn build(&self) -> Result<Regex<G>, Error> {
        let re = self.compile();
        match re.prog.error {
            Some(ref err) => Err(err.clone()),
            None => Ok(re),
        }
    }

    fn compile(&self) -> Regex<G> {
        let prog =
            parser::parse(G::GRAMMAR, &self.pattern, self.options, self.limits);
        Regex {
            pattern: Arc::from(self.pattern.as_str()),
            prog: Arc::new(prog),
            recursion_limit: self.recursion_limit,
            start_offset: AtomicUsize::new(0),
            grammar: PhantomData,
        }
    }

    /// Set the default flags of the regex. Flags passed to a match call are
    /// added to these.
    pub fn options(&mut self, options: G::Options) -> &mut RegexBuilder<G> {
        self.options = options.into();
        self
    }

    /// Set how deep the matcher may nest alternatives before it gives up
    /// and reports [`MatchOutcome::Aborted`].
    ///
    /// The default is `5000`.
    pub fn recursion_limit(&mut self, limit: usize) -> &mut RegexBuilder<G> {
        self.recursion_limit = limit;
        self
    }

    /// Set the nesting limit for the parser.
    ///
    /// Groups and alternations nested deeper than this fail with
    /// [`ErrorKind::ReachedMaxRecursion`](crate::ErrorKind::ReachedMaxRecursion).
    /// The default is `250`.
    pub fn nest_limit(&mut self, limit: u32) -> &mut RegexBuilder<G> {
        self.limits.nest_limit = limit;
        self
    }

    /// Set the approximate size limit of the compiled program, in
    /// instructions.
    ///
    /// Only large counted repetitions can realistically exceed it; they
    /// fail with
    /// [`ErrorKind::InvalidBraceContent`](crate::ErrorKind::InvalidBraceContent).
    pub fn size_limit(&mut self, limit: usize) -> &mut RegexBuilder<G> {
        self.limits.size_limit = limit;
        self
    }
}
