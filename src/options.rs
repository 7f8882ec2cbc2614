// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use bitflags::bitflags;

bitflags! {
    /// The full set of flags understood by the compiler and the match
    /// driver.
    ///
    /// This is the superset shared by both grammars. [`PosixOptions`] and
    /// [`EcmaScriptOptions`] expose the subsets meaningful to their grammar,
    /// but they use exactly the same bit positions, so either converts into
    /// a `RegexOptions` for free.
    ///
    /// Flags given when a [`Regex`](crate::Regex) is built become its
    /// default flags. Flags given to an individual match call are added to
    /// them.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct RegexOptions: u32 {
        /// Report all matches instead of stopping after the first one.
        const GLOBAL = 1 << 0;
        /// Match letters case insensitively.
        const INSENSITIVE = 1 << 1;
        /// Quantifiers are lazy by default. A trailing `?` makes them
        /// greedy.
        const UNGREEDY = 1 << 2;
        /// Enable Unicode escapes, property classes and full case folding.
        const UNICODE = 1 << 3;
        /// Ignore whitespace and `#` comments in the pattern.
        const EXTENDED = 1 << 4;
        /// Reject escapes of letters that have no meaning.
        const EXTRA = 1 << 5;
        /// The start of the subject is not the beginning of a line, so `^`
        /// does not match there.
        const MATCH_NOT_BEGIN_OF_LINE = 1 << 6;
        /// The end of the subject is not the end of a line, so `$` does not
        /// match there.
        const MATCH_NOT_END_OF_LINE = 1 << 7;
        /// Do not report the matches of capture groups.
        const SKIP_SUB_EXPR_RESULTS = 1 << 8;
        /// Copy matched text into owned buffers instead of borrowing the
        /// subject.
        const STRING_COPY_MATCHES = 1 << 9;
        /// `.` also matches line terminators.
        const SINGLE_LINE = 1 << 10;
        /// Only match at the current start offset.
        const STICKY = 1 << 11;
        /// Handle line terminators: match line by line, or, together with
        /// [`RegexOptions::INTERNAL_CONSIDER_NEWLINE`], let `^` and `$`
        /// match around them.
        const MULTILINE = 1 << 12;
        /// Keep non-participating trailing capture groups in the results.
        const SKIP_TRIM_EMPTY_MATCHES = 1 << 13;
        /// Stop after the first match even when [`RegexOptions::GLOBAL`] is
        /// set.
        const SINGLE_MATCH = 1 << 14;
        /// Matches resume where the previous call on the same `Regex`
        /// ended, and only the next match is reported. This is how
        /// `lastIndex` works for ECMAScript regexes with the `g` or `y`
        /// flags.
        const INTERNAL_STATEFUL = 1 << 24;
        /// Enable the web browser compatibility syntax of ECMA262 Annex
        /// B.1.4.
        const INTERNAL_BROWSER_EXTENDED = 1 << 25;
        /// Treat `\r`, U+2028 and U+2029 as line terminators in addition to
        /// `\n`, and do not split the subject into lines in multiline mode.
        const INTERNAL_CONSIDER_NEWLINE = 1 << 26;
    }
}

bitflags! {
    /// The flags accepted by the POSIX basic and extended grammars.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct PosixOptions: u32 {
        const GLOBAL = RegexOptions::GLOBAL.bits();
        const INSENSITIVE = RegexOptions::INSENSITIVE.bits();
        const UNGREEDY = RegexOptions::UNGREEDY.bits();
        const UNICODE = RegexOptions::UNICODE.bits();
        const EXTENDED = RegexOptions::EXTENDED.bits();
        const EXTRA = RegexOptions::EXTRA.bits();
        const MATCH_NOT_BEGIN_OF_LINE = RegexOptions::MATCH_NOT_BEGIN_OF_LINE.bits();
        const MATCH_NOT_END_OF_LINE = RegexOptions::MATCH_NOT_END_OF_LINE.bits();
        const SKIP_SUB_EXPR_RESULTS = RegexOptions::SKIP_SUB_EXPR_RESULTS.bits();
        const SKIP_TRIM_EMPTY_MATCHES = RegexOptions::SKIP_TRIM_EMPTY_MATCHES.bits();
        const MULTILINE = RegexOptions::MULTILINE.bits();
        const STRING_COPY_MATCHES = RegexOptions::STRING_COPY_MATCHES.bits();
        const SINGLE_MATCH = RegexOptions::SINGLE_MATCH.bits();
    }
}

bitflags! {
    /// The flags accepted by the ECMA262 grammar.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct EcmaScriptOptions: u32 {
        const GLOBAL = RegexOptions::GLOBAL.bits();
        const INSENSITIVE = RegexOptions::INSENSITIVE.bits();
        const UNGREEDY = RegexOptions::UNGREEDY.bits();
        const UNICODE = RegexOptions::UNICODE.bits();
        const EXTENDED = RegexOptions::EXTENDED.bits();
        const EXTRA = RegexOptions::EXTRA.bits();
        const MATCH_NOT_BEGIN_OF_LINE = RegexOptions::MATCH_NOT_BEGIN_OF_LINE.bits();
        const MATCH_NOT_END_OF_LINE = RegexOptions::MATCH_NOT_END_OF_LINE.bits();
        const SKIP_SUB_EXPR_RESULTS = RegexOptions::SKIP_SUB_EXPR_RESULTS.bits();
        const SKIP_TRIM_EMPTY_MATCHES = RegexOptions::SKIP_TRIM_EMPTY_MATCHES.bits();
        const MULTILINE = RegexOptions::MULTILINE.bits();
        const STRING_COPY_MATCHES = RegexOptions::STRING_COPY_MATCHES.bits();
        const SINGLE_MATCH = RegexOptions::SINGLE_MATCH.bits();
        const SINGLE_LINE = RegexOptions::SINGLE_LINE.bits();
        const STICKY = RegexOptions::STICKY.bits();
        const INTERNAL_STATEFUL = RegexOptions::INTERNAL_STATEFUL.bits();
        const INTERNAL_BROWSER_EXTENDED = RegexOptions::INTERNAL_BROWSER_EXTENDED.bits();
    }
}

impl From<PosixOptions> for RegexOptions {
    fn from(posix: PosixOptions) -> RegexOptions {
        RegexOptions::from_bits_retain(posix.bits())
    }
}

impl From<EcmaScriptOptions> for RegexOptions {
    fn from(ecma: EcmaScriptOptions) -> RegexOptions {
        RegexOptions::from_bits_retain(ecma.bits())
    }
}

impl From<PosixOptions> for EcmaScriptOptions {
    fn from(posix: PosixOptions) -> EcmaScriptOptions {
        // Every POSIX flag is also an ECMA262 flag.
        EcmaScriptOptions::from_bits_retain(posix.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flavors_share_bits() {
        let posix = PosixOptions::GLOBAL | PosixOptions::INSENSITIVE;
        let ecma = EcmaScriptOptions::GLOBAL | EcmaScriptOptions::INSENSITIVE;
        assert_eq!(RegexOptions::from(posix), RegexOptions::from(ecma));
        assert_eq!(
            RegexOptions::GLOBAL | RegexOptions::INSENSITIVE,
            RegexOptions::from(posix),
        );
        assert_eq!(ecma, EcmaScriptOptions::from(posix));
    }

    #[test]
    fn every_posix_flag_is_an_ecma_flag() {
        let all = EcmaScriptOptions::from(PosixOptions::all());
        assert!(EcmaScriptOptions::all().contains(all));
        assert!(PosixOptions::from_bits(RegexOptions::STICKY.bits()).is_none());
    }

    #[test]
    fn insert_remove() {
        let mut opts = RegexOptions::empty();
        opts.insert(RegexOptions::STICKY | RegexOptions::MULTILINE);
        assert!(opts.contains(RegexOptions::STICKY));
        opts.remove(RegexOptions::STICKY);
        assert!(!opts.contains(RegexOptions::STICKY));
        assert!(opts.contains(RegexOptions::MULTILINE));
        opts.set(RegexOptions::MULTILINE, false);
        assert!(opts.is_empty());
    }

    #[test]
    fn truncate_unknown_bits() {
        let opts = RegexOptions::from_bits_truncate(u32::MAX);
        assert!(opts.contains(RegexOptions::INTERNAL_CONSIDER_NEWLINE));
        assert_eq!(0, opts.bits() & (1 << 20));
        assert_eq!(0, (!opts).bits());
    }

    #[test]
    fn debug_lists_names() {
        let opts = RegexOptions::GLOBAL | RegexOptions::INTERNAL_STATEFUL;
        assert_eq!(
            "RegexOptions(GLOBAL | INTERNAL_STATEFUL)",
            format!("{:?}", opts),
        );
    }
}
