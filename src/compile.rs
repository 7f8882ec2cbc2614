// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Combinators that splice compiled sub-expressions into larger programs.
//!
//! Every combinator takes ownership of already compiled buffers and wraps
//! them in fork and jump instructions. Offsets are computed from the
//! lengths of the wrapped buffers, so a buffer must not be changed after it
//! has been wrapped.

use crate::inst::{ByteCode, Inst, JumpForm};

/// The four kinds of lookaround assertion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LookAround {
    Ahead,
    NegatedAhead,
    Behind,
    NegatedBehind,
}

fn fork(greedy: bool, offset: usize) -> Inst {
    let offset = offset as isize;
    if greedy {
        Inst::ForkStay { offset }
    } else {
        Inst::ForkJump { offset }
    }
}

impl ByteCode {
    /// Matches `left`, or `right` if `left` fails. `left` has priority.
    ///
    /// ```text
    ///       ForkStay ALT2
    ///       <left>
    ///       Jump END
    /// ALT2: <right>
    /// END:
    /// ```
    pub fn alternation(left: ByteCode, right: ByteCode) -> ByteCode {
        let mut code = ByteCode::new();
        code.push(Inst::ForkStay { offset: left.len() as isize + 1 });
        let right_len = right.len() as isize;
        code.extend(left);
        code.push(Inst::Jump { offset: right_len });
        code.extend(right);
        code
    }

    /// Wraps `body` so that it records its span in capture group `group`.
    pub fn capture_group(
        body: ByteCode,
        group: usize,
        name: Option<usize>,
    ) -> ByteCode {
        let mut code = ByteCode::new();
        code.push(Inst::SaveLeftCaptureGroup { group });
        code.extend(body);
        code.push(match name {
            None => Inst::SaveRightCaptureGroup { group },
            Some(name) => Inst::SaveRightNamedCaptureGroup { group, name },
        });
        code
    }

    /// Prepends a `ClearCaptureGroup` for every group written by this
    /// buffer, so that each iteration of a loop over it starts from
    /// scratch.
    pub fn clear_captures_on_entry(&mut self) {
        let groups = self.capture_groups();
        if groups.is_empty() {
            return;
        }
        let mut clear = ByteCode::new();
        for group in groups {
            clear.push(Inst::ClearCaptureGroup { group });
        }
        self.prepend(clear);
    }

    /// `body?`
    pub fn repetition_zero_or_one(body: ByteCode, greedy: bool) -> ByteCode {
        let mut code = ByteCode::new();
        code.push(fork(greedy, body.len()));
        code.extend(body);
        code
    }

    /// `body*`
    ///
    /// ```text
    /// START: ForkStay END (ForkJump END when lazy)
    ///        Checkpoint c
    ///        <body>
    ///        JumpNonEmpty START, c
    /// END:
    /// ```
    ///
    /// The checkpoint ends the loop as soon as an iteration consumes
    /// nothing.
    pub fn repetition_any(
        body: ByteCode,
        greedy: bool,
        checkpoint: usize,
    ) -> ByteCode {
        let len = body.len();
        let mut code = ByteCode::new();
        code.push(fork(greedy, len + 2));
        code.push(Inst::Checkpoint { id: checkpoint });
        code.extend(body);
        code.push(Inst::JumpNonEmpty {
            offset: -(len as isize + 3),
            checkpoint,
            form: JumpForm::Jump,
        });
        code
    }

    /// `body+`, compiled as `body body*`.
    pub fn repetition_one_or_more(
        body: ByteCode,
        greedy: bool,
        checkpoint: usize,
    ) -> ByteCode {
        let mut code = body.clone();
        code.extend(ByteCode::repetition_any(body, greedy, checkpoint));
        code
    }

    /// `body{min,max}`, with an unbounded `max` when it is `None`.
    ///
    /// The mandatory copies become a counted loop. The optional copies are
    /// unrolled into a cascade of forks that all point past the end, so the
    /// program grows linearly with `max - min`. Returns `None` when the
    /// result would have more than `size_limit` instructions.
    pub fn repetition_min_max(
        body: ByteCode,
        min: usize,
        max: Option<usize>,
        greedy: bool,
        repeat_id: usize,
        checkpoint: usize,
        size_limit: usize,
    ) -> Option<ByteCode> {
        let len = body.len();
        let mut code = ByteCode::new();
        match min {
            0 => {}
            1 => code.extend(body.clone()),
            _ => {
                code.push(Inst::ResetRepeat { id: repeat_id });
                code.extend(body.clone());
                code.push(Inst::Repeat {
                    offset: -(len as isize + 1),
                    count: u32::try_from(min).ok()?,
                    id: repeat_id,
                });
            }
        }
        let max = match max {
            None => {
                code.extend(ByteCode::repetition_any(body, greedy, checkpoint));
                return Some(code);
            }
            Some(max) => max,
        };
        let optional = max.checked_sub(min)?;
        let total = optional.checked_mul(len + 1)?.checked_add(code.len())?;
        if total > size_limit {
            return None;
        }
        for i in 0..optional {
            let rest = (optional - i - 1) * (len + 1) + len;
            code.push(fork(greedy, rest));
            code.extend(body.clone());
        }
        Some(code)
    }

    /// Wraps `body` in a lookaround assertion.
    ///
    /// Lookbehinds need the length of `body` in characters: `min` and `max`.
    /// When they differ, every length is tried, longest first, and a
    /// checkpoint makes sure the body ends exactly where the assertion
    /// started. Lookaheads ignore both.
    pub fn lookaround(
        body: ByteCode,
        kind: LookAround,
        min: usize,
        max: usize,
        checkpoint: usize,
    ) -> ByteCode {
        let probe = match kind {
            LookAround::Ahead | LookAround::NegatedAhead => body,
            LookAround::Behind | LookAround::NegatedBehind => {
                ByteCode::look_behind_probe(body, min, max, checkpoint)
            }
        };
        match kind {
            LookAround::Ahead | LookAround::Behind => {
                let mut code = ByteCode::new();
                code.push(Inst::Save);
                code.extend(probe);
                code.push(Inst::Restore);
                code
            }
            LookAround::NegatedAhead | LookAround::NegatedBehind => {
                ByteCode::negated(probe)
            }
        }
    }

    fn look_behind_probe(
        body: ByteCode,
        min: usize,
        max: usize,
        checkpoint: usize,
    ) -> ByteCode {
        if min == max {
            let mut code = ByteCode::new();
            code.push(Inst::GoBack { count: min });
            code.extend(body);
            return code;
        }
        let mut alternatives: Option<ByteCode> = None;
        for length in min..=max {
            let mut branch = ByteCode::new();
            branch.push(Inst::GoBack { count: length });
            branch.extend(body.clone());
            // Fail unless we are back where the lookbehind started.
            branch.push(Inst::JumpNonEmpty {
                offset: 1,
                checkpoint,
                form: JumpForm::Jump,
            });
            branch.push(Inst::Jump { offset: 1 });
            branch.push_compare(&[]);
            alternatives = Some(match alternatives {
                None => branch,
                Some(shorter) => ByteCode::alternation(branch, shorter),
            });
        }
        let mut code = ByteCode::new();
        code.push(Inst::Checkpoint { id: checkpoint });
        if let Some(alternatives) = alternatives {
            code.extend(alternatives);
        }
        code
    }

    /// ```text
    ///     Jump A
    /// L:  <probe>
    ///     FailForks
    /// A:  Save
    ///     ForkJump L
    ///     Restore
    /// ```
    ///
    /// If the probe matches, `FailForks` throws away the pending
    /// continuation after `Restore`, so the whole assertion fails. If it
    /// does not, backtracking resumes at `Restore`.
    fn negated(probe: ByteCode) -> ByteCode {
        let len = probe.len() as isize;
        let mut code = ByteCode::new();
        code.push(Inst::Jump { offset: len + 1 });
        code.extend(probe);
        code.push(Inst::FailForks);
        code.push(Inst::Save);
        code.push(Inst::ForkJump { offset: -(len + 3) });
        code.push(Inst::Restore);
        code
    }
}
