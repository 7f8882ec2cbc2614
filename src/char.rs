// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::cmp::Ordering;
use std::fmt;

/// An inline representation of `Option<u32>` where the `u32` is a code
/// point (or, for byte subjects, a byte value).
///
/// An absent character marks the boundaries of a subject.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Char(u32);

impl fmt::Debug for Char {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_none() {
            return write!(f, "Empty");
        }
        match char::from_u32(self.0) {
            None => write!(f, "{:#X}", self.0),
            Some(c) => write!(f, "{:?}", c),
        }
    }
}

impl Char {
    /// Returns true iff the character is absent.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Returns the code point (or byte value) of this character.
    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Converts the character to a real primitive `char`.
    ///
    /// If the character is absent, then `None` is returned.
    pub fn as_char(self) -> Option<char> {
        char::from_u32(self.0)
    }

    /// Returns true iff the character is an ASCII word character, which is
    /// what `\w` and `\b` look at in both grammars.
    pub fn is_word_char(self) -> bool {
        self.0 < 0x80 && {
            let b = self.0 as u8;
            b.is_ascii_alphanumeric() || b == b'_'
        }
    }

    /// Returns true iff the character terminates a line.
    ///
    /// Only `\n` does, unless `all` is set, in which case `\r`, U+2028 and
    /// U+2029 do as well.
    pub fn is_line_terminator(self, all: bool) -> bool {
        match self.0 {
            0x0A => true,
            0x0D | 0x2028 | 0x2029 => all,
            _ => false,
        }
    }

    /// Returns true iff the character is white space or a line terminator
    /// in the sense of ECMA262 `\s`: the ASCII spaces, U+FEFF and the
    /// `Zs` category, plus `\n`, `\r`, U+2028 and U+2029.
    pub fn is_space(self) -> bool {
        matches!(
            self.0,
            0x09..=0x0D
                | 0x20
                | 0xA0
                | 0x1680
                | 0x2000..=0x200A
                | 0x2028
                | 0x2029
                | 0x202F
                | 0x205F
                | 0x3000
                | 0xFEFF
        )
    }

    /// Returns the simple lower case mapping of this character.
    ///
    /// Without `unicode`, only ASCII letters are mapped. Characters whose
    /// lower case form is more than one code point are left alone.
    pub fn to_lower(self, unicode: bool) -> Char {
        if self.0 < 0x80 {
            return Char((self.0 as u8).to_ascii_lowercase() as u32);
        }
        if !unicode {
            return self;
        }
        self.as_char().map_or(self, |c| single(c.to_lowercase(), self))
    }

    /// Returns the simple upper case mapping of this character.
    ///
    /// Without `unicode`, only ASCII letters are mapped. Characters whose
    /// upper case form is more than one code point are left alone.
    pub fn to_upper(self, unicode: bool) -> Char {
        if self.0 < 0x80 {
            return Char((self.0 as u8).to_ascii_uppercase() as u32);
        }
        if !unicode {
            return self;
        }
        self.as_char().map_or(self, |c| single(c.to_uppercase(), self))
    }

    /// Compares two characters under simple case folding.
    pub fn eq_ignore_case(self, other: Char, unicode: bool) -> bool {
        self == other
            || self.to_lower(unicode) == other.to_lower(unicode)
            || self.to_upper(unicode) == other.to_upper(unicode)
    }

    /// Returns true iff `self` lies in the inclusive range `start..=end`,
    /// optionally under simple case folding.
    pub fn in_range(
        self,
        start: u32,
        end: u32,
        insensitive: bool,
        unicode: bool,
    ) -> bool {
        let contains = |c: Char| start <= c.0 && c.0 <= end;
        if contains(self) {
            return true;
        }
        insensitive
            && (contains(self.to_lower(unicode))
                || contains(self.to_upper(unicode)))
    }
}

fn single(mut it: impl Iterator<Item = char>, fallback: Char) -> Char {
    match (it.next(), it.next()) {
        (Some(c), None) => Char::from(c),
        _ => fallback,
    }
}

impl From<char> for Char {
    fn from(c: char) -> Char {
        Char(c as u32)
    }
}

impl From<u8> for Char {
    fn from(b: u8) -> Char {
        Char(b as u32)
    }
}

impl From<u32> for Char {
    fn from(cp: u32) -> Char {
        Char(cp)
    }
}

impl From<Option<char>> for Char {
    fn from(c: Option<char>) -> Char {
        c.map_or(Char(u32::MAX), |c| c.into())
    }
}

impl PartialEq<char> for Char {
    #[inline]
    fn eq(&self, other: &char) -> bool {
        self.0 == *other as u32
    }
}

impl PartialEq<Char> for char {
    #[inline]
    fn eq(&self, other: &Char) -> bool {
        *self as u32 == other.0
    }
}

impl PartialOrd<char> for Char {
    #[inline]
    fn partial_cmp(&self, other: &char) -> Option<Ordering> {
        self.0.partial_cmp(&(*other as u32))
    }
}

impl PartialOrd<Char> for char {
    #[inline]
    fn partial_cmp(&self, other: &Char) -> Option<Ordering> {
        (*self as u32).partial_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_folding_without_unicode() {
        assert!(Char::from('A').eq_ignore_case(Char::from('a'), false));
        assert!(!Char::from('Δ').eq_ignore_case(Char::from('δ'), false));
        assert!(Char::from('Δ').eq_ignore_case(Char::from('δ'), true));
    }

    #[test]
    fn multi_char_mappings_are_left_alone() {
        // 'ß' upper cases to "SS".
        assert_eq!(Char::from('ß'), Char::from('ß').to_upper(true));
    }

    #[test]
    fn insensitive_range() {
        assert!(Char::from('Q').in_range('a' as u32, 'z' as u32, true, false));
        assert!(!Char::from('Q').in_range('a' as u32, 'z' as u32, false, false));
    }

    #[test]
    fn ecma_white_space() {
        for c in ['\t', '\u{B}', '\u{C}', ' ', '\u{A0}', '\u{2007}', '\u{3000}', '\u{FEFF}'] {
            assert!(Char::from(c).is_space(), "{:?}", c);
        }
        for c in ['\n', '\r', '\u{2028}', '\u{2029}'] {
            assert!(Char::from(c).is_space(), "{:?}", c);
        }
        // NEL is white space to Unicode but not to ECMA262.
        assert!(!Char::from('\u{85}').is_space());
        assert!(!Char::from('\u{200B}').is_space());
        assert!(!Char::from('x').is_space());
    }

    #[test]
    fn line_terminators() {
        assert!(Char::from('\n').is_line_terminator(false));
        assert!(!Char::from('\r').is_line_terminator(false));
        assert!(Char::from('\u{2028}').is_line_terminator(true));
    }
}
