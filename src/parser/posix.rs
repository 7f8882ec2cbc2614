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
The POSIX basic and extended grammars.

Besides the standard syntax, the extended grammar accepts the common
extensions `(?:..)`, `(?<name>..)`, lookaround groups, back-references and
lazy quantifiers.
*/

use crate::compile::LookAround;
use crate::error::{Error, ErrorKind};
use crate::inst::{ByteCode, CharClass, CompareArg, Inst};
use crate::lexer::{Token, TokenType};
use crate::options::RegexOptions;

use super::{
    alternatives, bracket, compare, interval, is_greedy, literal, lookaround, repeat,
    single, Fragment, Length, Limits, ParserState, Productions,
};

/// Parses a bracket expression. The current token is the opening `[`.
///
/// Backslashes have no special meaning inside of a bracket expression.
pub(crate) fn bracket_expression(
    state: &mut ParserState<'_>,
) -> Result<Fragment, Error> {
    enum Item {
        Char(u32),
        Class(CharClass),
    }

    state.set_in_class(true);
    state.consume_raw();
    let mut args = vec![];
    if state.check(TokenType::Circumflex) {
        state.consume_raw();
        args.push(CompareArg::Inverse);
    }
    let mut first = true;
    loop {
        let token = state.token();
        if token.is_eof() {
            return Err(state.error(ErrorKind::MismatchingBracket));
        }
        if token.kind() == TokenType::RightBracket && !first {
            break;
        }
        first = false;
        let start = bracket_item(state)?;
        let start = match start {
            Item::Class(class) => {
                args.push(CompareArg::CharClass(class));
                continue;
            }
            Item::Char(c) => c,
        };
        if !state.check(TokenType::HyphenMinus) {
            args.push(CompareArg::Char(start));
            continue;
        }
        let hyphen = state.consume_raw();
        if state.check(TokenType::RightBracket) {
            // A trailing '-' is literal.
            state.rewind(hyphen);
            args.push(CompareArg::Char(start));
            continue;
        }
        if state.done() {
            return Err(state.error(ErrorKind::MismatchingBracket));
        }
        let end_token = state.token();
        let end = match bracket_item(state)? {
            Item::Char(c) => c,
            Item::Class(_) => {
                return Err(state.error_at(ErrorKind::InvalidRange, end_token))
            }
        };
        if end < start {
            return Err(state.error_at(ErrorKind::InvalidRange, end_token));
        }
        args.push(CompareArg::CharRange(start, end));
    }
    state.set_in_class(false);
    state.consume();
    return Ok((bracket(ByteCode::new(), &args), Length::exact(1)));

    fn bracket_item(state: &mut ParserState<'_>) -> Result<Item, Error> {
        let token = state.token();
        match token.kind() {
            TokenType::EscapeSequence => {
                state.split_escape();
                Ok(Item::Char('\\' as u32))
            }
            TokenType::LeftBracket => {
                state.consume_raw();
                match state.token().kind() {
                    TokenType::Colon => {
                        state.consume_raw();
                        let mut name = String::new();
                        while !state.check(TokenType::Colon) {
                            if state.done() {
                                return Err(state.error(
                                    ErrorKind::InvalidBracketContent,
                                ));
                            }
                            name.push_str(state.consume_raw().text());
                        }
                        state.consume_raw();
                        if !state.check(TokenType::RightBracket) {
                            return Err(
                                state.error(ErrorKind::InvalidBracketContent)
                            );
                        }
                        state.consume_raw();
                        CharClass::from_name(&name).map(Item::Class).ok_or_else(
                            || state.error_at(ErrorKind::InvalidCharacterClass, token),
                        )
                    }
                    TokenType::Period | TokenType::EqualSign => {
                        Err(state.error(ErrorKind::InvalidCollationElement))
                    }
                    _ => Ok(Item::Char('[' as u32)),
                }
            }
            _ => {
                state.consume_raw();
                Ok(Item::Char(token.first().map_or(0, |c| c as u32)))
            }
        }
    }
}

/// A piece of a sub-expression before its quantifiers are applied.
enum Atom {
    /// A literal character that may join a run with its neighbors.
    Literal(u32),
    Fragment(Fragment),
}

/// Accumulates a sequence of atoms, merging runs of literal characters
/// into a single string comparison.
struct Sequence {
    code: ByteCode,
    length: Length,
    run: Vec<u32>,
}

impl Sequence {
    fn new() -> Sequence {
        Sequence {
            code: ByteCode::new(),
            length: Length::ZERO,
            run: vec![],
        }
    }

    fn flush(&mut self) {
        if !self.run.is_empty() {
            self.code.extend(literal(&self.run));
            self.length = self.length.then(Length::exact(self.run.len()));
            self.run.clear();
        }
    }

    fn push_literal(&mut self, c: u32) {
        self.run.push(c);
    }

    fn push(&mut self, (code, length): Fragment) {
        self.flush();
        self.code.extend(code);
        self.length = self.length.then(length);
    }

    fn finish(mut self) -> Fragment {
        self.flush();
        (self.code, self.length)
    }
}

impl Atom {
    fn into_fragment(self) -> Fragment {
        match self {
            Atom::Literal(c) => (literal(&[c]), Length::exact(1)),
            Atom::Fragment(fragment) => fragment,
        }
    }
}

/// Parses a back-reference `\N` after the backslash. The current token is
/// the digit.
fn back_reference<'p>(
    state: &mut ParserState<'p>,
    token: Token<'p>,
) -> Result<Option<Fragment>, Error> {
    let digit = match token.first().and_then(|c| c.to_digit(10)) {
        Some(d) if d > 0 && token.kind() == TokenType::Char => d as usize,
        _ => return Ok(None),
    };
    if digit > state.capture_groups_count() {
        return Err(state.error_at(ErrorKind::InvalidNumber, token));
    }
    state.consume();
    let code = compare(&[CompareArg::Reference(digit)]);
    Ok(Some((code, Length::at_least(0))))
}

/// The POSIX extended grammar.
#[derive(Debug)]
pub(crate) struct PosixExtendedParser<'p> {
    state: ParserState<'p>,
}

impl<'p> PosixExtendedParser<'p> {
    pub(crate) fn new(
        pattern: &'p str,
        options: RegexOptions,
        limits: Limits,
    ) -> PosixExtendedParser<'p> {
        PosixExtendedParser { state: ParserState::new(pattern, options, limits) }
    }

    fn root(&mut self) -> Result<Fragment, Error> {
        self.state.enter()?;
        self.state.begin_disjunction();
        let mut branches = vec![];
        loop {
            let branch = self.sub_expression()?;
            let at_pipe = self.state.check(TokenType::Pipe);
            if branch.0.is_empty() && (at_pipe || !branches.is_empty()) {
                return Err(self.state.error(ErrorKind::EmptySubExpression));
            }
            branches.push(branch);
            if !at_pipe {
                break;
            }
            self.state.consume();
            self.state.next_branch();
        }
        self.state.end_disjunction();
        self.state.leave();
        Ok(alternatives(branches))
    }

    fn sub_expression(&mut self) -> Result<Fragment, Error> {
        let mut seq = Sequence::new();
        loop {
            let token = self.state.token();
            let atom = match token.kind() {
                TokenType::Eof | TokenType::Pipe | TokenType::RightParen => {
                    break
                }
                TokenType::LeftParen => Atom::Fragment(self.group()?),
                TokenType::LeftBracket => {
                    Atom::Fragment(bracket_expression(&mut self.state)?)
                }
                TokenType::Period => {
                    self.state.consume();
                    let code = compare(&[CompareArg::AnyChar]);
                    Atom::Fragment((code, Length::exact(1)))
                }
                TokenType::Circumflex => {
                    self.state.consume();
                    Atom::Fragment((single(Inst::CheckBegin), Length::ZERO))
                }
                TokenType::Dollar => {
                    self.state.consume();
                    Atom::Fragment((single(Inst::CheckEnd), Length::ZERO))
                }
                TokenType::Asterisk
                | TokenType::Plus
                | TokenType::Questionmark
                | TokenType::LeftCurly => {
                    return Err(
                        self.state.error(ErrorKind::InvalidRepetitionMarker)
                    );
                }
                TokenType::EscapeSequence => {
                    self.state.consume();
                    Atom::Literal(token.value().map_or(0, |c| c as u32))
                }
                TokenType::Char if token.first() == Some('\\') => {
                    self.state.consume_raw();
                    let escaped = self.state.token();
                    if escaped.is_eof() {
                        return Err(self
                            .state
                            .error_at(ErrorKind::InvalidTrailingEscape, token));
                    }
                    match back_reference(&mut self.state, escaped)? {
                        Some(fragment) => Atom::Fragment(fragment),
                        None => {
                            let c = escaped.first().unwrap_or('\\');
                            self.state.check_extra_escape(c, escaped)?;
                            self.state.consume();
                            Atom::Literal(c as u32)
                        }
                    }
                }
                _ => {
                    self.state.consume();
                    Atom::Literal(token.first().map_or(0, |c| c as u32))
                }
            };
            if !self.at_quantifier() {
                match atom {
                    Atom::Literal(c) => seq.push_literal(c),
                    Atom::Fragment(fragment) => seq.push(fragment),
                }
                continue;
            }
            let fragment = self.repetition(atom.into_fragment())?;
            seq.push(fragment);
        }
        Ok(seq.finish())
    }

    fn at_quantifier(&self) -> bool {
        matches!(
            self.state.token().kind(),
            TokenType::Asterisk
                | TokenType::Plus
                | TokenType::Questionmark
                | TokenType::LeftCurly
        )
    }

    fn repetition(&mut self, mut fragment: Fragment) -> Result<Fragment, Error> {
        while self.at_quantifier() {
            let token = self.state.consume();
            let (min, max) = match token.kind() {
                TokenType::Asterisk => (0, None),
                TokenType::Plus => (1, None),
                TokenType::Questionmark => (0, Some(1)),
                _ => interval(&mut self.state, false)?,
            };
            let lazy = self.state.check(TokenType::Questionmark);
            if lazy {
                self.state.consume();
            }
            let greedy = is_greedy(self.state.options(), lazy);
            fragment = repeat(&mut self.state, fragment, min, max, greedy, token)?;
        }
        Ok(fragment)
    }

    fn group(&mut self) -> Result<Fragment, Error> {
        let open = self.state.token();
        let looks = [
            ("(?=", LookAround::Ahead),
            ("(?!", LookAround::NegatedAhead),
            ("(?<=", LookAround::Behind),
            ("(?<!", LookAround::NegatedBehind),
        ];
        for &(prefix, kind) in looks.iter() {
            if self.state.try_skip(prefix) {
                let body = self.group_body()?;
                return lookaround(&mut self.state, kind, body, open);
            }
        }
        if self.state.try_skip("(?:") {
            return self.group_body();
        }
        if self.state.try_skip("(?<") {
            let group = self.state.new_group();
            let (name, token) = super::group_name(&mut self.state)?;
            let id = self.state.register_name(&name, group, token)?;
            let (code, length) = self.group_body()?;
            let code = ByteCode::capture_group(code, group, Some(id));
            return Ok((code, length));
        }
        self.state.consume();
        if self.state.check(TokenType::Questionmark) {
            return Err(self.state.error(ErrorKind::InvalidCaptureGroup));
        }
        let group = self.state.new_group();
        let (code, length) = self.group_body()?;
        let code = ByteCode::capture_group(code, group, None);
        Ok((code, length))
    }

    /// Parses the inside of a group along with its closing parenthesis.
    fn group_body(&mut self) -> Result<Fragment, Error> {
        let body = self.root()?;
        if body.0.is_empty() && self.state.check(TokenType::RightParen) {
            return Err(self.state.error(ErrorKind::EmptySubExpression));
        }
        self.state.expect(TokenType::RightParen, ErrorKind::MismatchingParen)?;
        Ok(body)
    }
}

impl<'p> Productions<'p> for PosixExtendedParser<'p> {
    fn state(&mut self) -> &mut ParserState<'p> {
        &mut self.state
    }

    fn into_state(self) -> ParserState<'p> {
        self.state
    }

    fn parse_internal(&mut self) -> Result<Fragment, Error> {
        let root = self.root()?;
        if self.state.check(TokenType::RightParen) {
            return Err(self.state.error(ErrorKind::MismatchingParen));
        }
        Ok(root)
    }
}

/// The POSIX basic grammar.
#[derive(Debug)]
pub(crate) struct PosixBasicParser<'p> {
    state: ParserState<'p>,
}

impl<'p> PosixBasicParser<'p> {
    pub(crate) fn new(
        pattern: &'p str,
        options: RegexOptions,
        limits: Limits,
    ) -> PosixBasicParser<'p> {
        PosixBasicParser { state: ParserState::new(pattern, options, limits) }
    }

    fn is_escape(token: Token<'_>, c: char) -> bool {
        token.kind() == TokenType::EscapeSequence && token.value() == Some(c)
    }

    /// Parses a sequence of atoms up to the end of the pattern, or up to
    /// `\)` when `nested`.
    fn sub_expression(&mut self, nested: bool) -> Result<Fragment, Error> {
        self.state.enter()?;
        let mut seq = Sequence::new();
        // '*' is literal at the start of an expression, and so is '^'
        // anywhere else.
        let mut at_start = true;
        loop {
            let token = self.state.token();
            if token.is_eof() {
                break;
            }
            if PosixBasicParser::is_escape(token, ')') {
                if nested {
                    break;
                }
                return Err(self.state.error(ErrorKind::MismatchingParen));
            }
            let atom = match token.kind() {
                TokenType::EscapeSequence if token.value() == Some('(') => {
                    self.state.consume();
                    let group = self.state.new_group();
                    let (code, length) = self.sub_expression(true)?;
                    if !PosixBasicParser::is_escape(self.state.token(), ')') {
                        return Err(self.state.error(ErrorKind::MismatchingParen));
                    }
                    self.state.consume();
                    let code =
                        ByteCode::capture_group(code, group, None);
                    Atom::Fragment((code, length))
                }
                TokenType::EscapeSequence if token.value() == Some('{') => {
                    return Err(
                        self.state.error(ErrorKind::InvalidRepetitionMarker)
                    );
                }
                TokenType::EscapeSequence => {
                    self.state.consume();
                    Atom::Literal(token.value().map_or(0, |c| c as u32))
                }
                TokenType::Circumflex if at_start => {
                    self.state.consume();
                    seq.push((single(Inst::CheckBegin), Length::ZERO));
                    continue;
                }
                TokenType::Dollar => {
                    self.state.consume();
                    let next = self.state.token();
                    if next.is_eof()
                        || (nested && PosixBasicParser::is_escape(next, ')'))
                    {
                        Atom::Fragment((single(Inst::CheckEnd), Length::ZERO))
                    } else {
                        Atom::Literal('$' as u32)
                    }
                }
                TokenType::Period => {
                    self.state.consume();
                    let code = compare(&[CompareArg::AnyChar]);
                    Atom::Fragment((code, Length::exact(1)))
                }
                TokenType::LeftBracket => {
                    Atom::Fragment(bracket_expression(&mut self.state)?)
                }
                TokenType::Char if token.first() == Some('\\') => {
                    self.state.consume_raw();
                    let escaped = self.state.token();
                    if escaped.is_eof() {
                        return Err(self
                            .state
                            .error_at(ErrorKind::InvalidTrailingEscape, token));
                    }
                    match back_reference(&mut self.state, escaped)? {
                        Some(fragment) => Atom::Fragment(fragment),
                        None => {
                            let c = escaped.first().unwrap_or('\\');
                            self.state.check_extra_escape(c, escaped)?;
                            self.state.consume();
                            Atom::Literal(c as u32)
                        }
                    }
                }
                _ => {
                    self.state.consume();
                    Atom::Literal(token.first().map_or(0, |c| c as u32))
                }
            };
            at_start = false;
            if !self.at_quantifier() {
                match atom {
                    Atom::Literal(c) => seq.push_literal(c),
                    Atom::Fragment(fragment) => seq.push(fragment),
                }
                continue;
            }
            let fragment = self.repetition(atom.into_fragment())?;
            seq.push(fragment);
        }
        self.state.leave();
        Ok(seq.finish())
    }

    fn at_quantifier(&self) -> bool {
        let token = self.state.token();
        token.kind() == TokenType::Asterisk
            || PosixBasicParser::is_escape(token, '{')
    }

    fn repetition(&mut self, mut fragment: Fragment) -> Result<Fragment, Error> {
        while self.at_quantifier() {
            let token = self.state.consume();
            let (min, max) = match token.kind() {
                TokenType::Asterisk => (0, None),
                _ => interval(&mut self.state, true)?,
            };
            let greedy = is_greedy(self.state.options(), false);
            fragment = repeat(&mut self.state, fragment, min, max, greedy, token)?;
        }
        Ok(fragment)
    }
}

impl<'p> Productions<'p> for PosixBasicParser<'p> {
    fn state(&mut self) -> &mut ParserState<'p> {
        &mut self.state
    }

    fn into_state(self) -> ParserState<'p> {
        self.state
    }

    fn parse_internal(&mut self) -> Result<Fragment, Error> {
        self.sub_expression(false)
    }
}
