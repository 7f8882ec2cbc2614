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
A tokenizer for regular expression patterns.

The lexer knows nothing about either grammar. It splits a pattern into
single character punctuation tokens, two character escape sequences for the
escapes every grammar agrees on, and plain characters for everything else.
Whether an escape like `\d` means anything is left to the parser, which sees
it as a `\` token followed by a `d` token.
*/

/// The kind of a token.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum TokenType {
    Eof,
    Char,
    Circumflex,
    Period,
    LeftParen,
    RightParen,
    LeftCurly,
    RightCurly,
    LeftBracket,
    RightBracket,
    Asterisk,
    EscapeSequence,
    Dollar,
    Pipe,
    Plus,
    Comma,
    Slash,
    EqualSign,
    HyphenMinus,
    Colon,
    Questionmark,
}

impl TokenType {
    fn of(c: char) -> TokenType {
        match c {
            '^' => TokenType::Circumflex,
            '.' => TokenType::Period,
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '{' => TokenType::LeftCurly,
            '}' => TokenType::RightCurly,
            '[' => TokenType::LeftBracket,
            ']' => TokenType::RightBracket,
            '*' => TokenType::Asterisk,
            '$' => TokenType::Dollar,
            '|' => TokenType::Pipe,
            '+' => TokenType::Plus,
            ',' => TokenType::Comma,
            '/' => TokenType::Slash,
            '=' => TokenType::EqualSign,
            '-' => TokenType::HyphenMinus,
            ':' => TokenType::Colon,
            '?' => TokenType::Questionmark,
            _ => TokenType::Char,
        }
    }
}

/// A single token, borrowing its text from the pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Token<'p> {
    kind: TokenType,
    position: usize,
    text: &'p str,
}

impl<'p> Token<'p> {
    pub(crate) fn kind(&self) -> TokenType {
        self.kind
    }

    /// The byte offset of this token in the pattern.
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn text(&self) -> &'p str {
        self.text
    }

    /// The first character of this token, if it has one.
    pub(crate) fn first(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// The character this token stands for. For escape sequences this is
    /// the escaped character.
    pub(crate) fn value(&self) -> Option<char> {
        match self.kind {
            TokenType::EscapeSequence => self.text.chars().nth(1),
            _ => self.first(),
        }
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.kind == TokenType::Eof
    }
}

/// Characters that form an escape sequence token when preceded by `\`.
fn is_escapable(c: char) -> bool {
    matches!(
        c,
        '^' | '.' | '[' | ']' | '$' | '(' | ')' | '|' | '*' | '+' | '?' | '{'
            | '\\'
    )
}

#[derive(Clone, Debug)]
pub(crate) struct Lexer<'p> {
    pattern: &'p str,
    /// The byte offset of the next character to read.
    index: usize,
}

impl<'p> Lexer<'p> {
    pub(crate) fn new(pattern: &'p str) -> Lexer<'p> {
        Lexer { pattern, index: 0 }
    }

    pub(crate) fn pattern(&self) -> &'p str {
        self.pattern
    }

    /// Returns the next token. Once the pattern is exhausted this returns
    /// `Eof` tokens forever.
    pub(crate) fn next(&mut self) -> Token<'p> {
        let start = self.index;
        let mut chars = self.pattern[start..].chars();
        let c = match chars.next() {
            None => {
                return Token {
                    kind: TokenType::Eof,
                    position: start,
                    text: "",
                }
            }
            Some(c) => c,
        };
        if c == '\\' {
            if let Some(escaped) = chars.next().filter(|&e| is_escapable(e)) {
                self.index = start + 1 + escaped.len_utf8();
                return Token {
                    kind: TokenType::EscapeSequence,
                    position: start,
                    text: &self.pattern[start..self.index],
                };
            }
        }
        self.index = start + c.len_utf8();
        Token {
            kind: TokenType::of(c),
            position: start,
            text: &self.pattern[start..self.index],
        }
    }

    /// Rewinds the lexer by `count` characters. Rewinding past the start of
    /// the pattern stops at the start.
    pub(crate) fn back(&mut self, count: usize) {
        for _ in 0..count {
            match self.pattern[..self.index].chars().next_back() {
                None => return,
                Some(c) => self.index -= c.len_utf8(),
            }
        }
    }

    /// Rewinds the lexer to the start of the pattern.
    #[cfg(test)]
    pub(crate) fn reset(&mut self) {
        self.index = 0;
    }

    /// The number of characters between `position` and the read cursor.
    pub(crate) fn distance_from(&self, position: usize) -> usize {
        self.pattern
            .get(position..self.index)
            .map_or(0, |s| s.chars().count())
    }
}
