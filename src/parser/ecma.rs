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
The ECMA262 grammar, including the web browser compatibility syntax of
Annex B.1.4 when the `INTERNAL_BROWSER_EXTENDED` flag is set and the
`UNICODE` flag is not.
*/

use crate::compile::LookAround;
use crate::error::{Error, ErrorKind};
use crate::inst::{Boundary, ByteCode, CharClass, CompareArg, Inst};
use crate::lexer::{Token, TokenType};
use crate::options::RegexOptions;
use crate::unicode::{self, PropertyKind};

use super::{
    alternatives, bracket, compare, group_name, is_greedy, literal, lookaround, repeat,
    single, Fragment, Length, Limits, ParserState, Productions,
};

/// What an escape sequence stands for.
#[derive(Debug)]
enum Escaped {
    Char(u32),
    /// Comparator arguments matching a set of characters.
    Set(Vec<CompareArg>),
}

impl Escaped {
    fn push_into(self, args: &mut Vec<CompareArg>) {
        match self {
            Escaped::Char(c) => args.push(CompareArg::Char(c)),
            Escaped::Set(set) => args.extend(set),
        }
    }
}

fn shorthand_class(c: char) -> Option<(CharClass, bool)> {
    Some(match c {
        'd' => (CharClass::Digit, false),
        'D' => (CharClass::Digit, true),
        'w' => (CharClass::Word, false),
        'W' => (CharClass::Word, true),
        's' => (CharClass::Space, false),
        'S' => (CharClass::Space, true),
        _ => return None,
    })
}

fn is_syntax_char(c: char) -> bool {
    "^$\\.*+?()[]{}|/".contains(c)
}

/// Counts the capture groups of `pattern` and collects the group names,
/// without otherwise validating it. Forward references like `\2(a)(b)` and
/// `\k<x>(?<x>a)` need both before the parse reaches the groups.
fn prescan(pattern: &str) -> (usize, Vec<String>) {
    let mut count = 0;
    let mut names = vec![];
    let mut in_class = false;
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '(' if !in_class => {
                if chars.peek() != Some(&'?') {
                    count += 1;
                    continue;
                }
                let mut ahead = chars.clone();
                ahead.next();
                if ahead.next() != Some('<') {
                    continue;
                }
                if matches!(ahead.peek(), Some('=') | Some('!')) {
                    continue;
                }
                count += 1;
                names.push(ahead.take_while(|&c| c != '>').collect());
            }
            _ => {}
        }
    }
    (count, names)
}

#[derive(Debug)]
pub(crate) struct Ecma262Parser<'p> {
    state: ParserState<'p>,
    total_groups: usize,
    group_names: Vec<String>,
    unicode: bool,
    browser: bool,
}

impl<'p> Ecma262Parser<'p> {
    pub(crate) fn new(
        pattern: &'p str,
        options: RegexOptions,
        limits: Limits,
    ) -> Ecma262Parser<'p> {
        let (total_groups, group_names) = prescan(pattern);
        let unicode = options.contains(RegexOptions::UNICODE);
        Ecma262Parser {
            state: ParserState::new(pattern, options, limits),
            total_groups,
            group_names,
            unicode,
            browser: !unicode
                && options.contains(RegexOptions::INTERNAL_BROWSER_EXTENDED),
        }
    }

    fn disjunction(&mut self) -> Result<Fragment, Error> {
        self.state.enter()?;
        self.state.begin_disjunction();
        let mut branches = vec![self.alternative()?];
        while self.state.check(TokenType::Pipe) {
            self.state.consume();
            self.state.next_branch();
            branches.push(self.alternative()?);
        }
        self.state.end_disjunction();
        self.state.leave();
        Ok(alternatives(branches))
    }

    fn alternative(&mut self) -> Result<Fragment, Error> {
        let mut code = ByteCode::new();
        let mut length = Length::ZERO;
        while !self.state.done()
            && !self.state.check(TokenType::Pipe)
            && !self.state.check(TokenType::RightParen)
        {
            let (term, term_length) = self.term()?;
            code.extend(term);
            length = length.then(term_length);
        }
        Ok((code, length))
    }

    fn term(&mut self) -> Result<Fragment, Error> {
        if let Some(assertion) = self.assertion()? {
            return Ok(assertion);
        }
        let atom = self.atom()?;
        self.quantifier(atom)
    }

    fn assertion(&mut self) -> Result<Option<Fragment>, Error> {
        let token = self.state.token();
        match token.kind() {
            TokenType::Circumflex => {
                self.state.consume();
                return Ok(Some((single(Inst::CheckBegin), Length::ZERO)));
            }
            TokenType::Dollar => {
                self.state.consume();
                return Ok(Some((single(Inst::CheckEnd), Length::ZERO)));
            }
            TokenType::Char => {
                let boundaries =
                    [("\\b", Boundary::Word), ("\\B", Boundary::NotWord)];
                for &(escape, kind) in boundaries.iter() {
                    if self.state.try_skip(escape) {
                        let code = single(Inst::CheckBoundary { kind });
                        return Ok(Some((code, Length::ZERO)));
                    }
                }
            }
            TokenType::LeftParen => {
                let looks = [
                    ("(?=", LookAround::Ahead),
                    ("(?!", LookAround::NegatedAhead),
                    ("(?<=", LookAround::Behind),
                    ("(?<!", LookAround::NegatedBehind),
                ];
                for &(prefix, kind) in looks.iter() {
                    if !self.state.try_skip(prefix) {
                        continue;
                    }
                    let body = self.disjunction()?;
                    self.state.expect(
                        TokenType::RightParen,
                        ErrorKind::MismatchingParen,
                    )?;
                    let fragment =
                        lookaround(&mut self.state, kind, body, token)?;
                    let ahead = matches!(
                        kind,
                        LookAround::Ahead | LookAround::NegatedAhead
                    );
                    if ahead && self.browser {
                        return Ok(Some(self.quantifier(fragment)?));
                    }
                    return Ok(Some(fragment));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn quantifier(&mut self, atom: Fragment) -> Result<Fragment, Error> {
        let token = self.state.token();
        let (min, max) = match token.kind() {
            TokenType::Asterisk => {
                self.state.consume();
                (0, None)
            }
            TokenType::Plus => {
                self.state.consume();
                (1, None)
            }
            TokenType::Questionmark => {
                self.state.consume();
                (0, Some(1))
            }
            TokenType::LeftCurly => match self.interval()? {
                Some(bounds) => bounds,
                None => return Ok(atom),
            },
            _ => return Ok(atom),
        };
        let lazy = self.state.check(TokenType::Questionmark);
        if lazy {
            self.state.consume();
        }
        let greedy = is_greedy(self.state.options(), lazy);
        repeat(&mut self.state, atom, min, max, greedy, token)
    }

    /// Parses `{m}`, `{m,}` or `{m,n}` at the current `{`.
    ///
    /// When the brace does not start a well formed quantifier, Annex B
    /// makes it a literal: nothing is consumed and `None` is returned.
    fn interval(&mut self) -> Result<Option<(usize, Option<usize>)>, Error> {
        let open = self.state.consume_raw();
        let bounds = match self.state.read_digits(10, usize::MAX) {
            None => None,
            Some((min, _)) => {
                let min = min as usize;
                if self.state.check(TokenType::Comma) {
                    self.state.consume_raw();
                    let max = self.state.read_digits(10, usize::MAX);
                    Some((min, max.map(|m| m.0 as usize)))
                } else {
                    Some((min, Some(min)))
                }
            }
        };
        match bounds {
            Some((min, max)) if self.state.check(TokenType::RightCurly) => {
                self.state.consume();
                if max.map_or(false, |max| max < min) {
                    return Err(self
                        .state
                        .error_at(ErrorKind::InvalidBraceContent, open));
                }
                Ok(Some((min, max)))
            }
            _ if self.browser => {
                self.state.rewind(open);
                Ok(None)
            }
            _ => {
                let kind = if self.state.done() {
                    ErrorKind::MismatchingBrace
                } else {
                    ErrorKind::InvalidBraceContent
                };
                Err(self.state.error(kind))
            }
        }
    }

    fn atom(&mut self) -> Result<Fragment, Error> {
        let token = self.state.token();
        match token.kind() {
            TokenType::Period => {
                self.state.consume();
                Ok((compare(&[CompareArg::AnyChar]), Length::exact(1)))
            }
            TokenType::LeftParen => self.group(),
            TokenType::LeftBracket => self.class(),
            TokenType::EscapeSequence => {
                self.state.consume();
                let c = token.value().map_or(0, |c| c as u32);
                Ok((literal(&[c]), Length::exact(1)))
            }
            TokenType::Char if token.first() == Some('\\') => {
                self.atom_escape()
            }
            TokenType::Asterisk
            | TokenType::Plus
            | TokenType::Questionmark => {
                Err(self.state.error(ErrorKind::InvalidRepetitionMarker))
            }
            TokenType::LeftCurly => {
                if self.browser && self.interval()?.is_none() {
                    self.state.consume();
                    return Ok((literal(&['{' as u32]), Length::exact(1)));
                }
                Err(self.state.error_at(ErrorKind::InvalidRepetitionMarker, token))
            }
            TokenType::RightBracket | TokenType::RightCurly if !self.browser => {
                let kind = if token.kind() == TokenType::RightBracket {
                    ErrorKind::MismatchingBracket
                } else {
                    ErrorKind::MismatchingBrace
                };
                Err(self.state.error(kind))
            }
            TokenType::Eof => Err(self.state.error(ErrorKind::InvalidPattern)),
            _ => {
                self.state.consume();
                let c = token.first().map_or(0, |c| c as u32);
                Ok((literal(&[c]), Length::exact(1)))
            }
        }
    }

    fn group(&mut self) -> Result<Fragment, Error> {
        if self.state.try_skip("(?:") {
            return self.group_body();
        }
        if self.state.try_skip("(?<") {
            let group = self.state.new_group();
            let (name, token) = group_name(&mut self.state)?;
            let id = self.state.register_name(&name, group, token)?;
            let (code, length) = self.group_body()?;
            return Ok((ByteCode::capture_group(code, group, Some(id)), length));
        }
        self.state.consume();
        if self.state.check(TokenType::Questionmark) {
            return Err(self.state.error(ErrorKind::InvalidCaptureGroup));
        }
        let group = self.state.new_group();
        let (code, length) = self.group_body()?;
        Ok((ByteCode::capture_group(code, group, None), length))
    }

    fn group_body(&mut self) -> Result<Fragment, Error> {
        let body = self.disjunction()?;
        self.state.expect(TokenType::RightParen, ErrorKind::MismatchingParen)?;
        Ok(body)
    }

    /// Parses an escape outside of a class. The current token is the
    /// backslash.
    fn atom_escape(&mut self) -> Result<Fragment, Error> {
        let backslash = self.state.consume_raw();
        let token = self.state.token();
        let c = match token.first() {
            None => {
                return Err(self
                    .state
                    .error_at(ErrorKind::InvalidTrailingEscape, backslash))
            }
            Some(c) => c,
        };
        if token.kind() == TokenType::Char && ('1'..='9').contains(&c) {
            let (n, _) = self.state.read_digits(10, usize::MAX).unwrap_or((0, 0));
            let n = n as usize;
            if n <= self.total_groups {
                let code = compare(&[CompareArg::Reference(n)]);
                return Ok((code, Length::at_least(0)));
            }
            if !self.browser {
                return Err(self.state.error_at(ErrorKind::InvalidNumber, token));
            }
            self.state.rewind(token);
        }
        if c == 'k' && (self.unicode || !self.group_names.is_empty()) {
            return self.named_reference();
        }
        let mut code = ByteCode::new();
        let escaped = self.character_escape(&mut code, backslash)?;
        match escaped {
            Escaped::Char(c) => Ok((literal(&[c]), Length::exact(1))),
            Escaped::Set(args) => {
                code.push_compare(&args);
                Ok((code, Length::exact(1)))
            }
        }
    }

    /// `\k<name>`, with the current token at `k`.
    fn named_reference(&mut self) -> Result<Fragment, Error> {
        self.state.consume_raw();
        if !self.state.check_char('<') {
            return Err(self.state.error(ErrorKind::InvalidNameForCaptureGroup));
        }
        self.state.consume_raw();
        let (name, token) = group_name(&mut self.state)?;
        if !self.group_names.iter().any(|n| *n == name) {
            return Err(self
                .state
                .error_at(ErrorKind::InvalidNameForCaptureGroup, token));
        }
        let id = self.state.name_id(&name);
        let code = compare(&[CompareArg::NamedReference(id)]);
        Ok((code, Length::at_least(0)))
    }

    fn insensitive(&self) -> bool {
        self.state.options().contains(RegexOptions::INSENSITIVE)
    }

    fn escape_error(&self, token: Token<'p>) -> Error {
        let kind = if self.state.in_class() {
            ErrorKind::InvalidCharacterClassEscape
        } else {
            ErrorKind::InvalidPattern
        };
        self.state.error_at(kind, token)
    }

    /// Parses the escapes that mean the same inside and outside of a
    /// class. The backslash has been consumed and the current token is the
    /// character after it. Property tables are stored in `code`.
    fn character_escape(
        &mut self,
        code: &mut ByteCode,
        backslash: Token<'p>,
    ) -> Result<Escaped, Error> {
        let token = self.state.token();
        let c = match token.first() {
            None => {
                return Err(self
                    .state
                    .error_at(ErrorKind::InvalidTrailingEscape, backslash))
            }
            Some(c) => c,
        };
        let in_class = self.state.in_class();
        if let Some((class, negated)) = shorthand_class(c) {
            self.state.consume();
            if class == CharClass::Word && self.unicode && self.insensitive() {
                // Under Unicode case folding, the long s and the Kelvin sign
                // fold into ASCII word characters.
                let members = [
                    CompareArg::CharClass(CharClass::Word),
                    CompareArg::Char(0x017F),
                    CompareArg::Char(0x212A),
                ];
                let mut set = vec![];
                if negated {
                    set.push(CompareArg::And);
                    for member in members {
                        set.extend([CompareArg::TemporaryInverse, member]);
                    }
                } else {
                    set.push(CompareArg::Or);
                    set.extend(members);
                }
                set.push(CompareArg::EndAndOr);
                return Ok(Escaped::Set(set));
            }
            let mut set = vec![];
            if negated {
                set.push(CompareArg::TemporaryInverse);
            }
            set.push(CompareArg::CharClass(class));
            return Ok(Escaped::Set(set));
        }
        let control = match c {
            'f' => Some(0x0C),
            'n' => Some(0x0A),
            'r' => Some(0x0D),
            't' => Some(0x09),
            'v' => Some(0x0B),
            'b' if in_class => Some(0x08),
            _ => None,
        };
        if let Some(cp) = control {
            self.state.consume();
            return Ok(Escaped::Char(cp));
        }
        match c {
            'c' => {
                self.state.consume_raw();
                let letter = self.state.token();
                match letter.first() {
                    Some(l) if l.is_ascii_alphabetic() => {
                        self.state.consume();
                        return Ok(Escaped::Char(l as u32 % 32));
                    }
                    _ if self.browser => {
                        // A lone backslash; 'c' is parsed again on its own.
                        self.state.rewind(token);
                        return Ok(Escaped::Char('\\' as u32));
                    }
                    _ => return Err(self.escape_error(token)),
                }
            }
            '0' => {
                self.state.consume_raw();
                let next = self.state.token();
                let digit_follows = next.kind() == TokenType::Char
                    && next.first().map_or(false, |d| d.is_ascii_digit());
                self.state.rewind(token);
                if !digit_follows {
                    self.state.consume();
                    return Ok(Escaped::Char(0));
                }
                if !self.browser {
                    return Err(self.state.error_at(ErrorKind::InvalidNumber, token));
                }
                return Ok(Escaped::Char(self.legacy_octal()));
            }
            '1'..='9' => {
                if !self.browser {
                    let kind = if in_class {
                        ErrorKind::InvalidCharacterClassEscape
                    } else {
                        ErrorKind::InvalidNumber
                    };
                    return Err(self.state.error_at(kind, token));
                }
                if c >= '8' {
                    self.state.consume();
                    return Ok(Escaped::Char(c as u32));
                }
                return Ok(Escaped::Char(self.legacy_octal()));
            }
            'x' => {
                self.state.consume_raw();
                let after = self.state.token();
                if let Some((cp, 2)) = self.state.read_digits(16, 2) {
                    return Ok(Escaped::Char(cp));
                }
                if self.unicode {
                    return Err(self.escape_error(token));
                }
                self.state.rewind(after);
                return Ok(Escaped::Char('x' as u32));
            }
            'u' => {
                self.state.consume_raw();
                let after = self.state.token();
                if let Some(cp) = self.unicode_escape() {
                    return Ok(Escaped::Char(cp));
                }
                if self.unicode {
                    return Err(self.escape_error(token));
                }
                self.state.rewind(after);
                return Ok(Escaped::Char('u' as u32));
            }
            'p' | 'P' if self.unicode => {
                self.state.consume_raw();
                return self.property(code, c == 'P');
            }
            _ => {}
        }
        // Everything else is an identity escape.
        if self.unicode {
            let allowed = is_syntax_char(c) || (in_class && c == '-');
            if !allowed {
                return Err(self.escape_error(token));
            }
        } else {
            self.state.check_extra_escape(c, token)?;
        }
        self.state.consume();
        Ok(Escaped::Char(c as u32))
    }

    /// Reads a legacy octal escape of up to three digits, not exceeding
    /// `\377`.
    fn legacy_octal(&mut self) -> u32 {
        let first = self.state.token().first().and_then(|c| c.to_digit(8));
        let max_digits = match first {
            Some(d) if d <= 3 => 3,
            _ => 2,
        };
        self.state.read_digits(8, max_digits).map_or(0, |(v, _)| v)
    }

    /// Reads the hex part of `\u`: `HHHH`, a surrogate pair written as
    /// two such escapes, or `{H..}` in Unicode mode. The current token is
    /// the one after `u`. Returns `None` when the digits are malformed.
    fn unicode_escape(&mut self) -> Option<u32> {
        if self.unicode && self.state.check(TokenType::LeftCurly) {
            self.state.consume_raw();
            let cp = match self.state.read_digits(16, usize::MAX) {
                Some((cp, _)) if cp <= 0x10FFFF => cp,
                _ => return None,
            };
            if !self.state.check(TokenType::RightCurly) {
                return None;
            }
            self.state.consume();
            return Some(cp);
        }
        let high = match self.state.read_digits(16, 4) {
            Some((cp, 4)) => cp,
            _ => return None,
        };
        if !self.unicode || !(0xD800..=0xDBFF).contains(&high) {
            return Some(high);
        }
        let after = self.state.token();
        if self.state.try_skip("\\u") {
            if let Some((low, 4)) = self.state.read_digits(16, 4) {
                if (0xDC00..=0xDFFF).contains(&low) {
                    return Some(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
                }
            }
            self.state.rewind(after);
        }
        Some(high)
    }

    /// `\p{..}` or `\P{..}`, with the current token at the opening brace.
    fn property(
        &mut self,
        code: &mut ByteCode,
        negated: bool,
    ) -> Result<Escaped, Error> {
        let open = self.state.token();
        if !self.state.check(TokenType::LeftCurly) {
            return Err(self.state.error(ErrorKind::InvalidNameForProperty));
        }
        self.state.consume_raw();
        let mut contents = String::new();
        while !self.state.check(TokenType::RightCurly) {
            if self.state.done() {
                return Err(self.state.error(ErrorKind::InvalidNameForProperty));
            }
            contents.push_str(self.state.consume_raw().text());
        }
        let (kind, ranges) = match unicode::resolve(&contents) {
            Some(resolved) => resolved,
            None => {
                return Err(self
                    .state
                    .error_at(ErrorKind::InvalidNameForProperty, open))
            }
        };
        self.state.consume();
        let table = code.add_table(&ranges);
        let arg = match kind {
            PropertyKind::Binary => CompareArg::Property(table),
            PropertyKind::GeneralCategory => CompareArg::GeneralCategory(table),
            PropertyKind::Script => CompareArg::Script(table),
            PropertyKind::ScriptExtension => CompareArg::ScriptExtension(table),
        };
        let mut set = vec![];
        if negated {
            set.push(CompareArg::TemporaryInverse);
        }
        set.push(arg);
        Ok(Escaped::Set(set))
    }

    fn class(&mut self) -> Result<Fragment, Error> {
        self.state.set_in_class(true);
        self.state.consume_raw();
        let mut code = ByteCode::new();
        let mut args = vec![];
        if self.state.check(TokenType::Circumflex) {
            self.state.consume_raw();
            args.push(CompareArg::Inverse);
        }
        loop {
            if self.state.done() {
                return Err(self.state.error(ErrorKind::MismatchingBracket));
            }
            if self.state.check(TokenType::RightBracket) {
                break;
            }
            let start = self.class_atom(&mut code)?;
            if !self.state.check(TokenType::HyphenMinus) {
                start.push_into(&mut args);
                continue;
            }
            let hyphen = self.state.consume_raw();
            if self.state.done() || self.state.check(TokenType::RightBracket) {
                self.state.rewind(hyphen);
                start.push_into(&mut args);
                continue;
            }
            let end_token = self.state.token();
            let end = self.class_atom(&mut code)?;
            match (start, end) {
                (Escaped::Char(a), Escaped::Char(b)) => {
                    if b < a {
                        return Err(self
                            .state
                            .error_at(ErrorKind::InvalidRange, end_token));
                    }
                    args.push(CompareArg::CharRange(a, b));
                }
                (start, end) => {
                    if self.unicode {
                        return Err(self
                            .state
                            .error_at(ErrorKind::InvalidRange, hyphen));
                    }
                    start.push_into(&mut args);
                    args.push(CompareArg::Char('-' as u32));
                    end.push_into(&mut args);
                }
            }
        }
        self.state.set_in_class(false);
        self.state.consume();
        Ok((bracket(code, &args), Length::exact(1)))
    }

    fn class_atom(&mut self, code: &mut ByteCode) -> Result<Escaped, Error> {
        let token = self.state.token();
        match token.kind() {
            TokenType::EscapeSequence => {
                self.state.consume_raw();
                Ok(Escaped::Char(token.value().map_or(0, |c| c as u32)))
            }
            TokenType::Char if token.first() == Some('\\') => {
                let backslash = self.state.consume_raw();
                let escaped = self.state.token();
                match escaped.first() {
                    Some('B') if self.unicode => Err(self.escape_error(escaped)),
                    Some('k') if self.unicode => Err(self.escape_error(escaped)),
                    _ => self.character_escape(code, backslash),
                }
            }
            _ => {
                self.state.consume_raw();
                Ok(Escaped::Char(token.first().map_or(0, |c| c as u32)))
            }
        }
    }
}

impl<'p> Productions<'p> for Ecma262Parser<'p> {
    fn state(&mut self) -> &mut ParserState<'p> {
        &mut self.state
    }

    fn into_state(self) -> ParserState<'p> {
        self.state
    }

    fn parse_internal(&mut self) -> Result<Fragment, Error> {
        self.disjunction()
    }
}
