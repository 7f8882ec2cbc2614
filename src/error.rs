// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use core::fmt;

/// The kind of error that occurred while parsing a pattern.
///
/// Only the first error found in a pattern is ever reported. Every kind has
/// a fixed, human readable message available via its `Display` impl.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidPattern,
    InvalidCollationElement,
    InvalidCharacterClass,
    InvalidTrailingEscape,
    InvalidNumber,
    MismatchingBracket,
    MismatchingParen,
    MismatchingBrace,
    InvalidBraceContent,
    InvalidBracketContent,
    InvalidRange,
    InvalidRepetitionMarker,
    ReachedMaxRecursion,
    EmptySubExpression,
    InvalidCaptureGroup,
    InvalidNameForCaptureGroup,
    InvalidNameForProperty,
    DuplicateNamedCapture,
    InvalidCharacterClassEscape,
}

impl ErrorKind {
    /// Returns the canonical message for this kind of error.
    pub fn description(&self) -> &'static str {
        use self::ErrorKind::*;
        match *self {
            InvalidPattern => "Invalid regular expression.",
            InvalidCollationElement => "Invalid collating element referenced.",
            InvalidCharacterClass => "Invalid character class type referenced.",
            InvalidTrailingEscape => "Trailing \\ in pattern.",
            InvalidNumber => "Number in \\digit invalid or in error.",
            MismatchingBracket => "[ ] imbalance.",
            MismatchingParen => "( ) imbalance.",
            MismatchingBrace => "{ } imbalance.",
            InvalidBraceContent => {
                "Content of {} invalid: not a number, number too large, \
                 more than two numbers, first larger than second."
            }
            InvalidBracketContent => "Content of [] invalid.",
            InvalidRange => "Invalid endpoint in range expression.",
            InvalidRepetitionMarker => {
                "?, * or + not preceded by valid regular expression."
            }
            ReachedMaxRecursion => "Maximum recursion has been reached.",
            EmptySubExpression => "Sub expression has empty content.",
            InvalidCaptureGroup => "Content of capture group is invalid.",
            InvalidNameForCaptureGroup => "Name of capture group is invalid.",
            InvalidNameForProperty => "Name of property is invalid.",
            DuplicateNamedCapture => "Duplicate capture group name",
            InvalidCharacterClassEscape => {
                "Invalid escape sequence in character class."
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// An error that occurred while compiling a pattern.
///
/// Besides its kind, an error remembers the token that triggered it: its
/// text and the character column at which it starts in the pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    column: usize,
    token: String,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, column: usize, token: &str) -> Error {
        Error { kind, column, token: token.to_string() }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the character column (not byte offset) of the token that
    /// triggered this error.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the text of the token that triggered this error. This is
    /// empty when the error was found at the end of the pattern.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Renders `pattern` with a caret under the column of this error,
    /// followed by `message` (or the canonical message of the error kind).
    pub fn render(&self, pattern: &str, message: Option<&str>) -> String {
        let mut out =
            String::from("Error during parsing of regular expression:\n");
        out.push_str("    ");
        out.push_str(pattern);
        out.push_str("\n    ");
        for _ in 0..self.column {
            out.push(' ');
        }
        out.push_str("^---- ");
        out.push_str(message.unwrap_or(self.kind.description()));
        out
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_caret_under_column() {
        let err = Error::new(ErrorKind::MismatchingParen, 3, "");
        let got = err.render("ab(c", None);
        let expected = "Error during parsing of regular expression:\n    \
                        ab(c\n       ^---- ( ) imbalance.";
        assert_eq!(expected, got);
    }

    #[test]
    fn render_custom_message() {
        let err = Error::new(ErrorKind::InvalidRange, 0, "z");
        let got = err.render("[z-a]", Some("backwards range"));
        assert!(got.ends_with("    ^---- backwards range"));
    }

    #[test]
    fn display_is_message_only() {
        let err = Error::new(ErrorKind::InvalidTrailingEscape, 1, "\\");
        assert_eq!("Trailing \\ in pattern.", err.to_string());
    }
}
