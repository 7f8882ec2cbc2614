// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// This is the backtracking matching engine. Unlike a bounded backtracker it
// never remembers which (instruction, position) pairs it has visited: back
// references, lookarounds and counted loops make the state of a thread much
// bigger than that pair. Instead, every pending alternative is a full copy
// of the thread's state, kept on an explicit stack.
//
// A fork pushes one continuation and carries on with the other. Popping
// replays the most recently pushed continuation first, which gives the
// same search order as recursing into the preferred branch and falling
// back to the other one on failure. The depth of that (virtual) recursion
// is tracked per thread, and a search that goes deeper than the recursion
// limit is aborted rather than reported as a non-match.

use crate::char::Char;
use crate::input::RegexStringView;
use crate::inst::{
    Boundary, CharClass, CompareArg, Inst, InstPtr, JumpForm, PoolRange,
};
use crate::options::RegexOptions;
use crate::parser::ParserResult;
use crate::unicode;

/// The search went deeper than the recursion limit, or ran into malformed
/// bytecode. Either way, it is not known whether there is a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Aborted;

/// A span in the subject, in code units.
pub(crate) type Span = (usize, usize);

/// The outcome of a successful run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Found {
    /// Where the match ended.
    pub(crate) end: usize,
    /// The span of every capture group, indexed by group number. Index `0`
    /// is never set; the caller knows where the match started.
    pub(crate) captures: Vec<Option<Span>>,
}

/// A position pushed by `Save`, along with the height of the backtrack
/// stack at that time.
#[derive(Clone, Copy, Debug)]
struct SavePoint {
    pos: usize,
    frames: usize,
}

/// Everything a thread of execution owns. Forks copy all of it.
#[derive(Clone, Debug)]
struct MatchState {
    ip: InstPtr,
    pos: usize,
    depth: usize,
    capture_left: Vec<Option<usize>>,
    captures: Vec<Option<Span>>,
    repetition_marks: Vec<u32>,
    /// The position and fork depth at the start of each loop iteration.
    checkpoints: Vec<Option<(usize, usize)>>,
    saved: Vec<SavePoint>,
}

enum Step {
    Continue,
    Fail,
    Exit,
}

/// A backtracking matching engine for one subject.
///
/// The backtrack stack is reused across calls to `exec`, so the driver
/// creates one engine per subject and runs it at every start offset.
#[derive(Debug)]
pub(crate) struct Backtrack<'r, 'h> {
    prog: &'r ParserResult,
    input: RegexStringView<'h>,
    options: RegexOptions,
    recursion_limit: usize,
    track_captures: bool,
    stack: Vec<MatchState>,
    operations: usize,
}

impl<'r, 'h> Backtrack<'r, 'h> {
    /// `options` are the flags the search runs with, which include the ones
    /// the program was compiled with.
    pub(crate) fn new(
        prog: &'r ParserResult,
        input: RegexStringView<'h>,
        options: RegexOptions,
        recursion_limit: usize,
    ) -> Backtrack<'r, 'h> {
        // Back references need the spans even if nobody asked for them.
        let track_captures = !options
            .contains(RegexOptions::SKIP_SUB_EXPR_RESULTS)
            || prog.bytecode.has_backreferences();
        Backtrack {
            prog,
            input,
            options,
            recursion_limit,
            track_captures,
            stack: vec![],
            operations: 0,
        }
    }

    /// The number of instructions executed so far, over all runs.
    pub(crate) fn operations(&self) -> usize {
        self.operations
    }

    /// Runs the program starting at `start`.
    ///
    /// With `must_end` set, a match only counts if it ends at the end of
    /// the subject; other ends are backtracked out of like any other
    /// failure.
    pub(crate) fn exec(
        &mut self,
        start: usize,
        must_end: bool,
    ) -> Result<Option<Found>, Aborted> {
        self.stack.clear();
        let groups = self.prog.capture_groups_count + 1;
        let mut state = MatchState {
            ip: 0,
            pos: start,
            depth: 0,
            capture_left: vec![None; groups],
            captures: vec![None; groups],
            repetition_marks: vec![0; self.prog.repetition_marks],
            checkpoints: vec![None; self.prog.checkpoints],
            saved: vec![],
        };
        loop {
            self.operations += 1;
            match self.step(&mut state, must_end)? {
                Step::Continue => {}
                Step::Exit => {
                    trace!("match from {} to {}", start, state.pos);
                    return Ok(Some(Found {
                        end: state.pos,
                        captures: state.captures,
                    }));
                }
                Step::Fail => match self.stack.pop() {
                    None => return Ok(None),
                    Some(next) => state = next,
                },
            }
        }
    }

    fn step(
        &mut self,
        state: &mut MatchState,
        must_end: bool,
    ) -> Result<Step, Aborted> {
        let inst = match self.prog.bytecode.get(state.ip) {
            None => return Err(Aborted),
            Some(inst) => *inst,
        };
        let target = inst.target(state.ip);
        match inst {
            Inst::Compare { args } => match self.compare(state, args) {
                None => return Ok(Step::Fail),
                Some(pos) => state.pos = pos,
            },
            Inst::Jump { .. } => {
                state.ip = target.ok_or(Aborted)?;
                return Ok(Step::Continue);
            }
            Inst::ForkJump { .. } => {
                self.fork(state, JumpForm::ForkJump, target.ok_or(Aborted)?)?;
                return Ok(Step::Continue);
            }
            Inst::ForkStay { .. } => {
                self.fork(state, JumpForm::ForkStay, target.ok_or(Aborted)?)?;
                return Ok(Step::Continue);
            }
            Inst::Save => {
                state.saved.push(SavePoint {
                    pos: state.pos,
                    frames: self.stack.len(),
                });
            }
            Inst::Restore => {
                let point = state.saved.pop().ok_or(Aborted)?;
                state.pos = point.pos;
                // Lookarounds are atomic: once the body matched, nothing
                // inside of it is retried.
                self.stack.truncate(point.frames);
            }
            Inst::GoBack { count } => match self.input.back(state.pos, count) {
                None => return Ok(Step::Fail),
                Some(pos) => state.pos = pos,
            },
            Inst::CheckBegin => {
                if !self.is_line_start(state.pos) {
                    return Ok(Step::Fail);
                }
            }
            Inst::CheckEnd => {
                if !self.is_line_end(state.pos) {
                    return Ok(Step::Fail);
                }
            }
            Inst::CheckBoundary { kind } => {
                let before = self.input.previous_char(state.pos).is_word_char();
                let after = self.input.at(state.pos).char().is_word_char();
                let at_boundary = before != after;
                if at_boundary != (kind == Boundary::Word) {
                    return Ok(Step::Fail);
                }
            }
            Inst::SaveLeftCaptureGroup { group } => {
                if self.track_captures {
                    *state.capture_left.get_mut(group).ok_or(Aborted)? =
                        Some(state.pos);
                }
            }
            Inst::SaveRightCaptureGroup { group }
            | Inst::SaveRightNamedCaptureGroup { group, .. } => {
                if self.track_captures {
                    let left = *state.capture_left.get(group).ok_or(Aborted)?;
                    match left {
                        Some(left) if left <= state.pos => {
                            state.captures[group] = Some((left, state.pos));
                        }
                        _ => return Ok(Step::Fail),
                    }
                }
            }
            Inst::ClearCaptureGroup { group } => {
                if self.track_captures {
                    *state.captures.get_mut(group).ok_or(Aborted)? = None;
                    state.capture_left[group] = None;
                }
            }
            Inst::Repeat { count, id, .. } => {
                let mark = state.repetition_marks.get_mut(id).ok_or(Aborted)?;
                if *mark + 1 >= count {
                    *mark = 0;
                } else {
                    *mark += 1;
                    state.ip = target.ok_or(Aborted)?;
                    return Ok(Step::Continue);
                }
            }
            Inst::ResetRepeat { id } => {
                *state.repetition_marks.get_mut(id).ok_or(Aborted)? = 0;
            }
            Inst::Checkpoint { id } => {
                *state.checkpoints.get_mut(id).ok_or(Aborted)? =
                    Some((state.pos, state.depth));
            }
            Inst::JumpNonEmpty { checkpoint, form, .. } => {
                let mark = *state.checkpoints.get(checkpoint).ok_or(Aborted)?;
                if mark.map(|(pos, _)| pos) != Some(state.pos) {
                    // An iteration that made progress no longer counts
                    // the forks it went through.
                    if let Some((_, depth)) = mark {
                        state.depth = depth;
                    }
                    let target = target.ok_or(Aborted)?;
                    match form {
                        JumpForm::Jump => state.ip = target,
                        form => self.fork(state, form, target)?,
                    }
                    return Ok(Step::Continue);
                }
            }
            Inst::FailForks => {
                let point = state.saved.last().ok_or(Aborted)?;
                self.stack.truncate(point.frames);
                return Ok(Step::Fail);
            }
            Inst::Exit => {
                if must_end && state.pos != self.input.len() {
                    return Ok(Step::Fail);
                }
                return Ok(Step::Exit);
            }
        }
        state.ip += 1;
        Ok(Step::Continue)
    }

    /// Splits the current thread in two. The continuation that is tried
    /// first keeps running in `state`.
    fn fork(
        &mut self,
        state: &mut MatchState,
        form: JumpForm,
        target: InstPtr,
    ) -> Result<(), Aborted> {
        let depth = state.depth + 1;
        if depth > self.recursion_limit {
            debug!(
                "recursion limit {} reached at instruction {}",
                self.recursion_limit, state.ip
            );
            return Err(Aborted);
        }
        let mut other = state.clone();
        if let JumpForm::ForkJump = form {
            other.ip = state.ip + 1;
            state.ip = target;
            state.depth = depth;
        } else {
            other.ip = target;
            other.depth = depth;
            state.ip += 1;
        }
        self.stack.push(other);
        Ok(())
    }

    fn is_line_start(&self, pos: usize) -> bool {
        if pos == 0 {
            return !self.has(RegexOptions::MATCH_NOT_BEGIN_OF_LINE);
        }
        self.has(RegexOptions::MULTILINE)
            && self.has(RegexOptions::INTERNAL_CONSIDER_NEWLINE)
            && self.input.previous_char(pos).is_line_terminator(true)
    }

    fn is_line_end(&self, pos: usize) -> bool {
        if pos >= self.input.len() {
            return !self.has(RegexOptions::MATCH_NOT_END_OF_LINE);
        }
        self.has(RegexOptions::MULTILINE)
            && self.has(RegexOptions::INTERNAL_CONSIDER_NEWLINE)
            && self.input.at(pos).char().is_line_terminator(true)
    }

    fn has(&self, flag: RegexOptions) -> bool {
        self.options.contains(flag)
    }

    fn insensitive(&self) -> bool {
        self.has(RegexOptions::INSENSITIVE)
    }

    /// Matches the comparator list `args` at the current position,
    /// returning the position after whatever matched.
    fn compare(&self, state: &MatchState, args: PoolRange) -> Option<usize> {
        let args = self.prog.bytecode.args(args);
        let pos = state.pos;
        let unicode = self.input.is_unicode();
        match args.first() {
            Some(&CompareArg::String(s)) => {
                let needle = self.prog.bytecode.string(s).iter().map(|&c| Char::from(c));
                return self.input.starts_with_at(pos, needle, self.insensitive(), unicode);
            }
            Some(&CompareArg::Reference(group)) => {
                let span = state.captures.get(group).copied().flatten();
                return self.match_span(pos, span);
            }
            Some(&CompareArg::NamedReference(id)) => {
                let span = self.prog.named_groups.get(id).and_then(|(_, groups)| {
                    groups
                        .iter()
                        .find_map(|&g| state.captures.get(g).copied().flatten())
                });
                return self.match_span(pos, span);
            }
            _ => {}
        }
        let at = self.input.at(pos);
        if at.is_end() {
            return None;
        }
        let inverse = args.iter().filter(|a| **a == CompareArg::Inverse).count() % 2 == 1;
        let (_, matched) = self.members(args, 0, false, at.char());
        if matched != inverse {
            Some(at.next_pos())
        } else {
            None
        }
    }

    /// Matches whatever a capture group matched. A group that did not
    /// participate matches the empty string.
    fn match_span(&self, pos: usize, span: Option<Span>) -> Option<usize> {
        match span {
            None => Some(pos),
            Some((start, end)) => {
                let text = self.input.substring(start, end);
                self.input.starts_with_at(
                    pos,
                    text.chars(),
                    self.insensitive(),
                    self.input.is_unicode(),
                )
            }
        }
    }

    /// Evaluates the members of an `And` (`all`) or `Or` group starting
    /// at `i`, up to and including its `EndAndOr`. The top level list is
    /// an `Or` without the markers.
    fn members(
        &self,
        args: &[CompareArg],
        mut i: usize,
        all: bool,
        c: Char,
    ) -> (usize, bool) {
        let mut result = all;
        let mut negate_next = false;
        while i < args.len() {
            let hit = match args[i] {
                CompareArg::EndAndOr => return (i + 1, result),
                CompareArg::Inverse => {
                    i += 1;
                    continue;
                }
                CompareArg::TemporaryInverse => {
                    negate_next = true;
                    i += 1;
                    continue;
                }
                CompareArg::And | CompareArg::Or => {
                    let (next, hit) = self.members(
                        args,
                        i + 1,
                        args[i] == CompareArg::And,
                        c,
                    );
                    i = next;
                    hit
                }
                arg => {
                    i += 1;
                    self.matches(arg, c)
                }
            };
            let hit = hit != negate_next;
            negate_next = false;
            result = if all { result && hit } else { result || hit };
        }
        (i, result)
    }

    fn matches(&self, arg: CompareArg, c: Char) -> bool {
        let insensitive = self.insensitive();
        let unicode = self.input.is_unicode();
        match arg {
            CompareArg::AnyChar => {
                self.has(RegexOptions::SINGLE_LINE)
                    || !c.is_line_terminator(
                        self.has(RegexOptions::INTERNAL_CONSIDER_NEWLINE),
                    )
            }
            CompareArg::Char(x) => {
                if insensitive {
                    c.eq_ignore_case(Char::from(x), unicode)
                } else {
                    c.value() == x
                }
            }
            CompareArg::CharClass(class) => char_class(class, c, insensitive),
            CompareArg::CharRange(start, end) => {
                c.in_range(start, end, insensitive, unicode)
            }
            CompareArg::LookupTable(t)
            | CompareArg::Property(t)
            | CompareArg::GeneralCategory(t)
            | CompareArg::Script(t)
            | CompareArg::ScriptExtension(t) => {
                let table = self.prog.bytecode.table(t);
                unicode::contains(table, c.value())
                    || (insensitive
                        && (unicode::contains(table, c.to_lower(unicode).value())
                            || unicode::contains(table, c.to_upper(unicode).value())))
            }
            // Multi character comparisons only make sense on their own.
            CompareArg::String(_)
            | CompareArg::Reference(_)
            | CompareArg::NamedReference(_) => false,
            CompareArg::Inverse
            | CompareArg::TemporaryInverse
            | CompareArg::And
            | CompareArg::Or
            | CompareArg::EndAndOr => false,
        }
    }
}

/// Named classes only look at ASCII, except for white space.
fn char_class(class: CharClass, c: Char, insensitive: bool) -> bool {
    if class == CharClass::Space {
        return c.is_space();
    }
    if c.value() >= 0x80 {
        return false;
    }
    let b = c.value() as u8;
    match class {
        CharClass::Alnum => b.is_ascii_alphanumeric(),
        CharClass::Alpha => b.is_ascii_alphabetic(),
        CharClass::Blank => b == b' ' || b == b'\t',
        CharClass::Cntrl => b.is_ascii_control(),
        CharClass::Digit => b.is_ascii_digit(),
        CharClass::Graph => b.is_ascii_graphic(),
        CharClass::Lower => {
            b.is_ascii_lowercase() || (insensitive && b.is_ascii_uppercase())
        }
        CharClass::Print => b.is_ascii_graphic() || b == b' ',
        CharClass::Punct => b.is_ascii_punctuation(),
        CharClass::Space => c.is_space(),
        CharClass::Upper => {
            b.is_ascii_uppercase() || (insensitive && b.is_ascii_lowercase())
        }
        CharClass::Word => c.is_word_char(),
        CharClass::Xdigit => b.is_ascii_hexdigit(),
    }
}
