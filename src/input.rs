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
use std::ops::Range;

use memchr::memchr_iter;

use crate::char::Char;

/// Represents a location in a subject.
#[derive(Clone, Copy, Debug)]
pub struct InputAt {
    pos: usize,
    c: Char,
    len: usize,
}

impl InputAt {
    /// Returns true iff this position is past the end of the subject.
    pub fn is_end(&self) -> bool {
        self.c.is_none()
    }

    /// Returns the character at this position.
    ///
    /// If this position is at the end of the subject, then an absent
    /// character is returned.
    pub fn char(&self) -> Char {
        self.c
    }

    /// Returns the number of code units the character at this position
    /// occupies.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the code unit offset of the next position in the subject.
    pub fn next_pos(&self) -> usize {
        self.pos + self.len
    }
}

/// A borrowed subject to match against.
///
/// All offsets handed to or reported by the matcher count code units of the
/// view: bytes for `Bytes` and `Utf8`, characters for `Utf32`. A `Bytes`
/// view treats every byte as one character.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RegexStringView<'h> {
    /// An arbitrary byte string.
    Bytes(&'h [u8]),
    /// A UTF-8 string.
    Utf8(&'h str),
    /// A sequence of code points.
    Utf32(&'h [char]),
}

impl<'h> RegexStringView<'h> {
    /// The length of this view in code units.
    pub fn len(&self) -> usize {
        match *self {
            RegexStringView::Bytes(b) => b.len(),
            RegexStringView::Utf8(s) => s.len(),
            RegexStringView::Utf32(cs) => cs.len(),
        }
    }

    /// Returns true iff this view contains no code units.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true iff every position of this view holds a full code point.
    pub fn is_unicode(&self) -> bool {
        !matches!(*self, RegexStringView::Bytes(_))
    }

    /// Returns the character starting at code unit offset `pos`.
    ///
    /// Offsets at or past the end, and offsets inside of a UTF-8 sequence,
    /// yield an absent character.
    #[inline(always)]
    pub fn at(&self, pos: usize) -> InputAt {
        let (c, len) = match *self {
            RegexStringView::Bytes(b) => match b.get(pos) {
                None => (None.into(), 0),
                Some(&b) => (Char::from(b), 1),
            },
            RegexStringView::Utf8(s) => {
                match s.get(pos..).and_then(|rest| rest.chars().next()) {
                    None => (None.into(), 0),
                    Some(c) => (Char::from(c), c.len_utf8()),
                }
            }
            RegexStringView::Utf32(cs) => match cs.get(pos) {
                None => (None.into(), 0),
                Some(&c) => (Char::from(c), 1),
            },
        };
        InputAt { pos, c, len }
    }

    /// Returns the character ending at code unit offset `pos`, along with
    /// the number of code units it occupies.
    pub fn previous(&self, pos: usize) -> Option<(Char, usize)> {
        if pos == 0 || pos > self.len() {
            return None;
        }
        match *self {
            RegexStringView::Bytes(b) => Some((Char::from(b[pos - 1]), 1)),
            RegexStringView::Utf8(s) => {
                let c = s.get(..pos)?.chars().next_back()?;
                Some((Char::from(c), c.len_utf8()))
            }
            RegexStringView::Utf32(cs) => Some((Char::from(cs[pos - 1]), 1)),
        }
    }

    /// Returns the character ending at `pos`, or an absent character at the
    /// start of the view.
    pub fn previous_char(&self, pos: usize) -> Char {
        self.previous(pos).map_or(None.into(), |(c, _)| c)
    }

    /// Returns the offset `count` characters before `pos`, if there are that
    /// many.
    pub fn back(&self, mut pos: usize, count: usize) -> Option<usize> {
        for _ in 0..count {
            let (_, len) = self.previous(pos)?;
            pos -= len;
        }
        Some(pos)
    }

    /// Returns the offset of the next character boundary after `pos`.
    pub fn next_boundary(&self, pos: usize) -> usize {
        let at = self.at(pos);
        if at.is_end() {
            pos + 1
        } else {
            at.next_pos()
        }
    }

    /// Returns the number of characters in this view.
    pub fn char_len(&self) -> usize {
        match *self {
            RegexStringView::Utf8(s) => s.chars().count(),
            _ => self.len(),
        }
    }

    /// Returns the sub-view between the code unit offsets `start` and `end`.
    ///
    /// Out of range or misaligned offsets yield an empty view.
    pub fn substring(&self, start: usize, end: usize) -> RegexStringView<'h> {
        match *self {
            RegexStringView::Bytes(b) => {
                RegexStringView::Bytes(b.get(start..end).unwrap_or(&[]))
            }
            RegexStringView::Utf8(s) => {
                RegexStringView::Utf8(s.get(start..end).unwrap_or(""))
            }
            RegexStringView::Utf32(cs) => {
                RegexStringView::Utf32(cs.get(start..end).unwrap_or(&[]))
            }
        }
    }

    /// Splits this view on `\n`. The terminators are not part of any line.
    pub fn lines(&self) -> Vec<RegexStringView<'h>> {
        match *self {
            RegexStringView::Bytes(b) => {
                line_ranges(b).map(|r| RegexStringView::Bytes(&b[r])).collect()
            }
            // '\n' never occurs inside a multi-byte sequence.
            RegexStringView::Utf8(s) => line_ranges(s.as_bytes())
                .map(|r| RegexStringView::Utf8(&s[r]))
                .collect(),
            RegexStringView::Utf32(cs) => {
                cs.split(|&c| c == '\n').map(RegexStringView::Utf32).collect()
            }
        }
    }

    /// Returns true iff the text of this view starts with `needle` at `pos`,
    /// returning the offset just past it.
    ///
    /// With `insensitive` set, each pair of characters is compared with
    /// simple case folding.
    pub fn starts_with_at(
        &self,
        pos: usize,
        needle: impl Iterator<Item = Char>,
        insensitive: bool,
        unicode: bool,
    ) -> Option<usize> {
        let mut pos = pos;
        for expected in needle {
            let at = self.at(pos);
            if at.is_end() {
                return None;
            }
            let ok = if insensitive {
                at.char().eq_ignore_case(expected, unicode)
            } else {
                at.char() == expected
            };
            if !ok {
                return None;
            }
            pos = at.next_pos();
        }
        Some(pos)
    }

    /// Returns the text of this view as a string, replacing invalid UTF-8
    /// in byte views with U+FFFD.
    pub fn to_string_lossy(&self) -> Cow<'h, str> {
        match *self {
            RegexStringView::Bytes(b) => String::from_utf8_lossy(b),
            RegexStringView::Utf8(s) => Cow::Borrowed(s),
            RegexStringView::Utf32(cs) => Cow::Owned(cs.iter().collect()),
        }
    }

    /// Iterates over the characters of this view.
    pub fn chars(&self) -> impl Iterator<Item = Char> + 'h {
        let view = *self;
        let mut pos = 0;
        core::iter::from_fn(move || {
            let at = view.at(pos);
            if at.is_end() {
                return None;
            }
            pos = at.next_pos();
            Some(at.char())
        })
    }
}

fn line_ranges(haystack: &[u8]) -> impl Iterator<Item = Range<usize>> + '_ {
    let mut start = 0;
    memchr_iter(b'\n', haystack)
        .chain(Some(haystack.len()))
        .map(move |end| {
            let range = start..end;
            start = end + 1;
            range
        })
}

impl<'h> From<&'h str> for RegexStringView<'h> {
    fn from(s: &'h str) -> RegexStringView<'h> {
        RegexStringView::Utf8(s)
    }
}

impl<'h> From<&'h String> for RegexStringView<'h> {
    fn from(s: &'h String) -> RegexStringView<'h> {
        RegexStringView::Utf8(s.as_str())
    }
}

impl<'h> From<&'h [u8]> for RegexStringView<'h> {
    fn from(b: &'h [u8]) -> RegexStringView<'h> {
        RegexStringView::Bytes(b)
    }
}

impl<'h, const N: usize> From<&'h [u8; N]> for RegexStringView<'h> {
    fn from(b: &'h [u8; N]) -> RegexStringView<'h> {
        RegexStringView::Bytes(b)
    }
}

impl<'h> From<&'h [char]> for RegexStringView<'h> {
    fn from(cs: &'h [char]) -> RegexStringView<'h> {
        RegexStringView::Utf32(cs)
    }
}

impl<'h> From<&'h Vec<char>> for RegexStringView<'h> {
    fn from(cs: &'h Vec<char>) -> RegexStringView<'h> {
        RegexStringView::Utf32(cs.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_offsets_are_bytes() {
        let view = RegexStringView::from("aδb");
        assert_eq!(4, view.len());
        assert_eq!(3, view.char_len());
        assert_eq!(2, view.at(1).len());
        assert_eq!(3, view.next_boundary(1));
        assert!(view.at(2).is_end());
        assert_eq!(Some(1), view.back(3, 1));
        assert_eq!(Some(0), view.back(3, 2));
        assert_eq!(None, view.back(3, 3));
    }

    #[test]
    fn utf32_offsets_are_chars() {
        let cs: Vec<char> = "aδb".chars().collect();
        let view = RegexStringView::from(&cs);
        assert_eq!(3, view.len());
        assert_eq!(2, view.next_boundary(1));
        assert_eq!('δ', view.previous_char(2));
    }

    #[test]
    fn bytes_are_single_chars() {
        let view = RegexStringView::from(&b"\xFFa"[..]);
        assert_eq!(Char::from(0xFFu8), view.at(0).char());
        assert_eq!(1, view.at(0).len());
    }

    #[test]
    fn lines_split_on_newline() {
        let view = RegexStringView::from("ab\n\ncd\n");
        let lines: Vec<_> = view
            .lines()
            .into_iter()
            .map(|l| match l {
                RegexStringView::Utf8(s) => s,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(vec!["ab", "", "cd", ""], lines);
    }

    #[test]
    fn lossy_text() {
        let cs = ['a', 'δ'];
        assert_eq!("aδ", RegexStringView::from(&cs[..]).to_string_lossy());
        let view = RegexStringView::from(&b"a\xFF"[..]);
        assert_eq!("a\u{FFFD}", view.to_string_lossy());
    }

    #[test]
    fn substring_out_of_range_is_empty() {
        let view = RegexStringView::from("abc");
        assert!(view.substring(2, 9).is_empty());
        assert_eq!(RegexStringView::Utf8("bc"), view.substring(1, 3));
    }
}
