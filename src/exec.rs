// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::backtrack::{Backtrack, Span};
use crate::input::RegexStringView;
use crate::options::RegexOptions;
use crate::parser::ParserResult;

/// A match as found by the driver, before its text is materialized.
#[derive(Clone, Debug)]
pub(crate) struct RawMatch<'h> {
    /// The line the match was found in.
    pub(crate) view: RegexStringView<'h>,
    /// The index of that line.
    pub(crate) line: usize,
    /// The offset of that line in the whole subject.
    pub(crate) line_offset: usize,
    pub(crate) start: usize,
    pub(crate) end: usize,
    /// Capture group spans relative to `view`. Index `0` is unused.
    pub(crate) captures: Vec<Option<Span>>,
}

/// Everything a search produced.
#[derive(Clone, Debug)]
pub(crate) struct SearchOutput<'h> {
    pub(crate) matches: Vec<RawMatch<'h>>,
    /// The search hit the recursion limit; `matches` holds whatever was
    /// found before that.
    pub(crate) aborted: bool,
    pub(crate) operations: usize,
    /// Where a stateful search continues next time.
    pub(crate) next_offset: usize,
}

/// Searcher drives the VM over the start offsets of each line of a
/// subject, according to the search flags.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Searcher<'r> {
    prog: &'r ParserResult,
    options: RegexOptions,
    recursion_limit: usize,
}

impl<'r> Searcher<'r> {
    /// `options` are added to the flags the program was compiled with.
    pub(crate) fn new(
        prog: &'r ParserResult,
        options: RegexOptions,
        recursion_limit: usize,
    ) -> Searcher<'r> {
        Searcher::with_options(prog, prog.options | options, recursion_limit)
    }

    /// Like `new`, but `options` replace the compiled flags entirely.
    pub(crate) fn with_options(
        prog: &'r ParserResult,
        options: RegexOptions,
        recursion_limit: usize,
    ) -> Searcher<'r> {
        Searcher { prog, options, recursion_limit }
    }

    /// The flags this searcher runs with.
    pub(crate) fn options(&self) -> RegexOptions {
        self.options
    }

    fn has(&self, flag: RegexOptions) -> bool {
        self.options.contains(flag)
    }

    /// Returns true iff the subject should be split into lines, each of
    /// which is searched on its own.
    pub(crate) fn splits_lines(&self) -> bool {
        self.has(RegexOptions::MULTILINE)
            && !self.has(RegexOptions::INTERNAL_CONSIDER_NEWLINE)
    }

    /// Searches `lines`, which are the lines of one subject separated by a
    /// single code unit each, starting at the subject offset `start`.
    pub(crate) fn search<'h>(
        &self,
        lines: &[RegexStringView<'h>],
        start: usize,
    ) -> SearchOutput<'h> {
        let global = self.has(RegexOptions::GLOBAL);
        let multiline = self.has(RegexOptions::MULTILINE);
        let stateful = self.has(RegexOptions::INTERNAL_STATEFUL);
        let sticky = self.has(RegexOptions::STICKY);
        let single = self.has(RegexOptions::SINGLE_MATCH);
        // A plain match has to cover the whole subject.
        let anchored = !global && !multiline && !stateful;
        let min = self.prog.match_length_minimum;
        debug!(
            "searching {} line(s) from offset {} with {:?}",
            lines.len(),
            start,
            self.options
        );

        let mut out = SearchOutput {
            matches: vec![],
            aborted: false,
            operations: 0,
            next_offset: 0,
        };
        let mut line_offset = 0;
        'lines: for (index, &view) in lines.iter().enumerate() {
            let offset = line_offset;
            line_offset += view.len() + 1;
            if start > offset + view.len() {
                continue;
            }
            let mut options = self.options;
            if index > 0 {
                options.remove(RegexOptions::MATCH_NOT_BEGIN_OF_LINE);
            }
            if index + 1 < lines.len() {
                options.remove(RegexOptions::MATCH_NOT_END_OF_LINE);
            }
            let mut vm = Backtrack::new(self.prog, view, options, self.recursion_limit);
            let operations = out.operations;
            let mut pos = start.saturating_sub(offset);
            while pos <= view.len() && view.len() - pos >= min {
                trace!("trying line {} at offset {}", index, pos);
                let result = vm.exec(pos, anchored);
                out.operations = operations + vm.operations();
                let found = match result {
                    Err(_) => {
                        debug!("search aborted at line {} offset {}", index, pos);
                        out.aborted = true;
                        break 'lines;
                    }
                    Ok(None) => {
                        if anchored || sticky {
                            break;
                        }
                        pos = view.next_boundary(pos);
                        continue;
                    }
                    Ok(Some(found)) => found,
                };
                out.next_offset = offset + found.end;
                let next = if found.end == pos {
                    view.next_boundary(pos)
                } else {
                    found.end
                };
                out.matches.push(RawMatch {
                    view,
                    line: index,
                    line_offset: offset,
                    start: pos,
                    end: found.end,
                    captures: found.captures,
                });
                if single || stateful || anchored {
                    break 'lines;
                }
                if !global {
                    continue 'lines;
                }
                pos = next;
            }
        }
        if out.matches.is_empty() {
            out.next_offset = 0;
        }
        debug!(
            "found {} match(es) in {} operations",
            out.matches.len(),
            out.operations
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, Grammar, Limits};

    fn compile(pattern: &str, options: RegexOptions) -> ParserResult {
        let limits = Limits { nest_limit: 250, size_limit: 10_000 };
        parse(Grammar::Ecma262, pattern, options, limits)
    }

    fn spans(pattern: &str, options: RegexOptions, subject: &str) -> Vec<(usize, usize)> {
        let prog = compile(pattern, options);
        let searcher = Searcher::new(&prog, RegexOptions::empty(), 5000);
        let lines = if searcher.splits_lines() {
            RegexStringView::from(subject).lines()
        } else {
            vec![subject.into()]
        };
        searcher
            .search(&lines, 0)
            .matches
            .iter()
            .map(|m| (m.line_offset + m.start, m.line_offset + m.end))
            .collect()
    }

    #[test]
    fn plain_match_is_anchored() {
        assert_eq!(vec![(0, 3)], spans("a+", RegexOptions::empty(), "aaa"));
        assert!(spans("a", RegexOptions::empty(), "ba").is_empty());
        assert!(spans("a", RegexOptions::empty(), "ab").is_empty());
    }

    #[test]
    fn global_scans_every_offset() {
        let got = spans("a", RegexOptions::GLOBAL, "banana");
        assert_eq!(vec![(1, 2), (3, 4), (5, 6)], got);
    }

    #[test]
    fn empty_matches_advance() {
        let got = spans("a*", RegexOptions::GLOBAL, "baa");
        assert_eq!(vec![(0, 0), (1, 3), (3, 3)], got);
    }

    #[test]
    fn single_match_stops_early() {
        let options = RegexOptions::GLOBAL | RegexOptions::SINGLE_MATCH;
        assert_eq!(vec![(1, 2)], spans("a", options, "banana"));
    }

    #[test]
    fn sticky_needs_adjacent_matches() {
        let options = RegexOptions::GLOBAL | RegexOptions::STICKY;
        assert_eq!(vec![(0, 1), (1, 2)], spans("a", options, "aaba"));
        assert!(spans("a", options, "baa").is_empty());
    }

    #[test]
    fn minimum_length_cuts_the_scan_short() {
        let prog = compile("abc", RegexOptions::GLOBAL);
        let searcher = Searcher::new(&prog, RegexOptions::empty(), 5000);
        let out = searcher.search(&["xxxx".into()], 0);
        assert!(out.matches.is_empty());
        // Offsets 0 and 1 are tried, 2 is too close to the end.
        assert_eq!(2, out.operations);
    }

    #[test]
    fn lines_are_searched_separately() {
        let prog = parse(
            Grammar::PosixExtended,
            "^b",
            RegexOptions::MULTILINE,
            Limits { nest_limit: 250, size_limit: 10_000 },
        );
        let searcher = Searcher::new(&prog, RegexOptions::empty(), 5000);
        assert!(searcher.splits_lines());
        let lines = RegexStringView::from("ab\nbc\nb").lines();
        let out = searcher.search(&lines, 0);
        let got: Vec<(usize, usize)> =
            out.matches.iter().map(|m| (m.line, m.line_offset + m.start)).collect();
        assert_eq!(vec![(1, 3), (2, 6)], got);
    }

    #[test]
    fn stateful_resumes_and_resets() {
        let prog = compile("a", RegexOptions::INTERNAL_STATEFUL);
        let searcher = Searcher::new(&prog, RegexOptions::empty(), 5000);
        let subject: [RegexStringView; 1] = ["aba".into()];
        let out = searcher.search(&subject, 0);
        assert_eq!(1, out.next_offset);
        let out = searcher.search(&subject, 1);
        assert_eq!(3, out.next_offset);
        let out = searcher.search(&subject, 3);
        assert!(out.matches.is_empty());
        assert_eq!(0, out.next_offset);
    }

    #[test]
    fn aborted_searches_are_flagged() {
        let prog = compile("(?:ab??){20}c", RegexOptions::GLOBAL);
        let searcher = Searcher::new(&prog, RegexOptions::empty(), 8);
        let subject = "a".repeat(30);
        let out = searcher.search(&[subject.as_str().into()], 0);
        assert!(out.aborted);
        assert!(out.matches.is_empty());
    }
}
