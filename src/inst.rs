// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

/// InstPtr represents the index of an instruction in a regex program.
pub type InstPtr = usize;

/// A range of entries in one of the side pools of a `ByteCode` buffer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PoolRange {
    pub start: u32,
    pub len: u32,
}

impl PoolRange {
    fn shifted(self, by: usize) -> PoolRange {
        PoolRange { start: self.start + by as u32, len: self.len }
    }

    pub fn range(self) -> std::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

/// The kind of a `\b` or `\B` assertion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Boundary {
    Word,
    NotWord,
}

/// What a `JumpNonEmpty` does when the loop body made progress.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JumpForm {
    Jump,
    ForkJump,
    ForkStay,
}

/// A single instruction of a compiled program.
///
/// Jump offsets count instructions and are relative to the end of the
/// instruction carrying them, so an offset of `0` falls through.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Inst {
    /// Compare the subject at the current position against the comparator
    /// list stored in the argument pool.
    Compare { args: PoolRange },
    /// Continue at the target.
    Jump { offset: isize },
    /// Try the target first and fall through if that fails.
    ForkJump { offset: isize },
    /// Fall through first and try the target if that fails.
    ForkStay { offset: isize },
    /// Push the current position on the save stack.
    Save,
    /// Pop the save stack and move back to the popped position.
    Restore,
    /// Step back over `count` characters, failing if there are not enough.
    GoBack { count: usize },
    /// `^`
    CheckBegin,
    /// `$`
    CheckEnd,
    CheckBoundary { kind: Boundary },
    SaveLeftCaptureGroup { group: usize },
    SaveRightCaptureGroup { group: usize },
    SaveRightNamedCaptureGroup { group: usize, name: usize },
    /// Forget whatever a capture group matched in a previous iteration.
    ClearCaptureGroup { group: usize },
    /// Jump back `count - 1` times, then fall through once.
    Repeat { offset: isize, count: u32, id: usize },
    ResetRepeat { id: usize },
    /// Remember the current position in checkpoint `id`.
    Checkpoint { id: usize },
    /// Perform `form` with `offset` unless the position still equals the
    /// one recorded in `checkpoint`.
    JumpNonEmpty { offset: isize, checkpoint: usize, form: JumpForm },
    /// Drop every alternative created since the innermost `Save` and fail.
    FailForks,
    Exit,
}

impl Inst {
    /// Returns the absolute target of a control flow instruction at `pc`.
    pub fn target(&self, pc: InstPtr) -> Option<InstPtr> {
        let offset = match *self {
            Inst::Jump { offset }
            | Inst::ForkJump { offset }
            | Inst::ForkStay { offset }
            | Inst::Repeat { offset, .. }
            | Inst::JumpNonEmpty { offset, .. } => offset,
            _ => return None,
        };
        Some((pc as isize + 1 + offset) as InstPtr)
    }
}

/// A named class of characters, as written in `[[:name:]]` or via the
/// shorthand escapes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CharClass {
    Alnum,
    Alpha,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    Word,
    Xdigit,
}

impl CharClass {
    /// Resolves the name used inside `[: :]`.
    pub fn from_name(name: &str) -> Option<CharClass> {
        use self::CharClass::*;
        Some(match name {
            "alnum" => Alnum,
            "alpha" => Alpha,
            "blank" => Blank,
            "cntrl" => Cntrl,
            "digit" => Digit,
            "graph" => Graph,
            "lower" => Lower,
            "print" => Print,
            "punct" => Punct,
            "space" => Space,
            "upper" => Upper,
            "word" => Word,
            "xdigit" => Xdigit,
            _ => return None,
        })
    }
}

/// One entry of a `Compare` instruction's argument list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareArg {
    /// Negate the result of the whole comparison.
    Inverse,
    /// Negate only the next entry.
    TemporaryInverse,
    /// Any character except line terminators.
    AnyChar,
    Char(u32),
    /// A literal run of characters from the string pool.
    String(PoolRange),
    CharClass(CharClass),
    CharRange(u32, u32),
    /// A sorted list of inclusive ranges from the table pool.
    LookupTable(PoolRange),
    /// What capture group `n` matched.
    Reference(usize),
    /// What the participating group with the given name matched.
    NamedReference(usize),
    Property(PoolRange),
    GeneralCategory(PoolRange),
    Script(PoolRange),
    ScriptExtension(PoolRange),
    /// Start a group that matches when all of its members do.
    And,
    /// Start a group that matches when any of its members does.
    Or,
    EndAndOr,
}

impl CompareArg {
    fn relocate(self, strings: usize, tables: usize) -> CompareArg {
        use self::CompareArg::*;
        match self {
            String(r) => String(r.shifted(strings)),
            LookupTable(r) => LookupTable(r.shifted(tables)),
            Property(r) => Property(r.shifted(tables)),
            GeneralCategory(r) => GeneralCategory(r.shifted(tables)),
            Script(r) => Script(r.shifted(tables)),
            ScriptExtension(r) => ScriptExtension(r.shifted(tables)),
            other => other,
        }
    }
}

/// A buffer of instructions, along with the side pools that comparator
/// arguments point into.
///
/// Buffers are built bottom up: every sub-expression compiles into its own
/// buffer, and the assembler combinators in `compile` splice them
/// together. Since all jumps are relative, splicing never invalidates the
/// control flow of a spliced buffer, but pool references need to be
/// relocated, which `extend` takes care of.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct ByteCode {
    insts: Vec<Inst>,
    args: Vec<CompareArg>,
    strings: Vec<u32>,
    tables: Vec<(u32, u32)>,
}

impl ByteCode {
    pub fn new() -> ByteCode {
        ByteCode::default()
    }

    /// The number of instructions in this buffer.
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    #[cfg(test)]
    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn get(&self, pc: InstPtr) -> Option<&Inst> {
        self.insts.get(pc)
    }

    pub fn push(&mut self, inst: Inst) {
        self.insts.push(inst);
    }

    /// Appends a `Compare` instruction with the given arguments.
    pub fn push_compare(&mut self, args: &[CompareArg]) {
        let range = PoolRange {
            start: self.args.len() as u32,
            len: args.len() as u32,
        };
        self.args.extend_from_slice(args);
        self.push(Inst::Compare { args: range });
    }

    /// Stores a literal run of characters and returns where it lives.
    pub fn add_string(&mut self, chars: &[u32]) -> PoolRange {
        let range = PoolRange {
            start: self.strings.len() as u32,
            len: chars.len() as u32,
        };
        self.strings.extend_from_slice(chars);
        range
    }

    /// Stores a sorted list of inclusive ranges and returns where it lives.
    pub fn add_table(&mut self, ranges: &[(u32, u32)]) -> PoolRange {
        let range = PoolRange {
            start: self.tables.len() as u32,
            len: ranges.len() as u32,
        };
        self.tables.extend_from_slice(ranges);
        range
    }

    pub fn args(&self, range: PoolRange) -> &[CompareArg] {
        self.args.get(range.range()).unwrap_or(&[])
    }

    pub fn string(&self, range: PoolRange) -> &[u32] {
        self.strings.get(range.range()).unwrap_or(&[])
    }

    pub fn table(&self, range: PoolRange) -> &[(u32, u32)] {
        self.tables.get(range.range()).unwrap_or(&[])
    }

    /// Appends all of `other`, relocating its pool references.
    pub fn extend(&mut self, other: ByteCode) {
        let (nargs, nstrings, ntables) =
            (self.args.len(), self.strings.len(), self.tables.len());
        self.args.extend(
            other.args.into_iter().map(|a| a.relocate(nstrings, ntables)),
        );
        self.strings.extend(other.strings);
        self.tables.extend(other.tables);
        self.insts.extend(other.insts.into_iter().map(|inst| match inst {
            Inst::Compare { args } => Inst::Compare { args: args.shifted(nargs) },
            inst => inst,
        }));
    }

    /// Inserts all of `other` in front of this buffer.
    pub fn prepend(&mut self, other: ByteCode) {
        let mut joined = other;
        joined.extend(std::mem::take(self));
        *self = joined;
    }

    /// Returns true iff any comparison in this buffer refers back to a
    /// capture group.
    pub fn has_backreferences(&self) -> bool {
        self.args.iter().any(|a| {
            matches!(*a, CompareArg::Reference(_) | CompareArg::NamedReference(_))
        })
    }

    /// Returns every capture group index written by this buffer.
    pub fn capture_groups(&self) -> Vec<usize> {
        let mut groups: Vec<usize> = self
            .insts
            .iter()
            .filter_map(|inst| match *inst {
                Inst::SaveLeftCaptureGroup { group } => Some(group),
                _ => None,
            })
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    fn fmt_arg(&self, f: &mut fmt::Formatter, arg: &CompareArg) -> fmt::Result {
        fn cp(c: u32) -> String {
            match char::from_u32(c) {
                Some(c) => format!("{:?}", c),
                None => format!("{:#X}", c),
            }
        }
        match *arg {
            CompareArg::Char(c) => write!(f, "Char({})", cp(c)),
            CompareArg::String(r) => {
                let s: String = self
                    .string(r)
                    .iter()
                    .filter_map(|&c| char::from_u32(c))
                    .collect();
                write!(f, "String({:?})", s)
            }
            CompareArg::CharRange(a, b) => {
                write!(f, "CharRange({}-{})", cp(a), cp(b))
            }
            CompareArg::LookupTable(r) => {
                write!(f, "LookupTable(")?;
                for (i, &(a, b)) in self.table(r).iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}-{}", cp(a), cp(b))?;
                }
                write!(f, ")")
            }
            CompareArg::Property(r)
            | CompareArg::GeneralCategory(r)
            | CompareArg::Script(r)
            | CompareArg::ScriptExtension(r) => {
                let name = match *arg {
                    CompareArg::Property(_) => "Property",
                    CompareArg::GeneralCategory(_) => "GeneralCategory",
                    CompareArg::Script(_) => "Script",
                    _ => "ScriptExtension",
                };
                write!(f, "{}({} ranges)", name, r.len)
            }
            ref other => write!(f, "{:?}", other),
        }
    }
}

impl fmt::Debug for ByteCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (pc, inst) in self.insts.iter().enumerate() {
            write!(f, "{:04} ", pc)?;
            match *inst {
                Inst::Compare { args } => {
                    write!(f, "Compare [")?;
                    for (i, arg) in self.args(args).iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        self.fmt_arg(f, arg)?;
                    }
                    write!(f, "]")?;
                }
                ref inst => write!(f, "{:?}", inst)?,
            }
            if let Some(goto) = inst.target(pc) {
                write!(f, " (goto: {})", goto)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
