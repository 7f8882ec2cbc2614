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

use memchr::memchr;

/// Expands the replacement template `replacement` into `dst`.
///
/// `groups[0]` is the whole match and `groups[i]` is capture group `i`.
/// `groups` may be shorter than `n_groups + 1` when trailing groups did not
/// participate; those expand to nothing.
pub(crate) fn expand(
    mut replacement: &str,
    groups: &[Option<Cow<'_, str>>],
    n_groups: usize,
    dst: &mut String,
) {
    while !replacement.is_empty() {
        match memchr(b'\\', replacement.as_bytes()) {
            None => break,
            Some(i) => {
                dst.push_str(&replacement[..i]);
                replacement = &replacement[i..];
            }
        }
        if replacement[1..].starts_with('\\') {
            dst.push('\\');
            replacement = &replacement[2..];
            continue;
        }
        let digits = replacement[1..]
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 {
            dst.push('\\');
            replacement = &replacement[1..];
            continue;
        }
        let number = &replacement[1..1 + digits];
        match number.parse::<usize>() {
            Ok(i) if i <= n_groups => {
                if let Some(Some(text)) = groups.get(i) {
                    dst.push_str(text);
                }
            }
            _ => {
                dst.push('\\');
                dst.push_str(number);
            }
        }
        replacement = &replacement[1 + digits..];
    }
    dst.push_str(replacement);
}

/// Escapes all regular expression meta characters in `text`.
///
/// The string returned may be safely used as a literal in an ECMA262 or a
/// POSIX extended pattern. POSIX basic patterns give a meaning to `\(`,
/// `\)`, `\{` and `\}` instead, so the result is not a literal there.
pub fn escape(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len());
    for c in text.chars() {
        if is_meta_character(c) {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted
}

fn is_meta_character(c: char) -> bool {
    matches!(
        c,
        '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '['
            | ']' | '{' | '}' | '/'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(template: &str, groups: &[Option<&str>], n_groups: usize) -> String {
        let groups: Vec<Option<Cow<str>>> =
            groups.iter().map(|g| g.map(Cow::Borrowed)).collect();
        let mut dst = String::new();
        expand(template, &groups, n_groups, &mut dst);
        dst
    }

    #[test]
    fn numbered_groups() {
        assert_eq!("b-a", exp(r"\2-\1", &[Some("ab"), Some("a"), Some("b")], 2));
        assert_eq!("[ab]", exp(r"[\0]", &[Some("ab")], 0));
        assert_eq!("xy", exp("xy", &[Some("ab")], 0));
    }

    #[test]
    fn missing_groups_expand_to_nothing() {
        assert_eq!("<>", exp(r"<\2>", &[Some("a"), Some("a")], 2));
        assert_eq!("<>", exp(r"<\1>", &[Some("a"), None], 1));
    }

    #[test]
    fn out_of_range_numbers_are_literal() {
        assert_eq!(r"a\12", exp(r"\1\12", &[Some("a"), Some("a")], 1));
        assert_eq!(r"\99999999999999999999999", {
            exp(r"\99999999999999999999999", &[Some("a")], 0)
        });
    }

    #[test]
    fn backslashes() {
        assert_eq!(r"a\b", exp(r"a\\b", &[Some("")], 0));
        assert_eq!(r"\n", exp(r"\n", &[Some("")], 0));
        assert_eq!(r"x\", exp(r"x\", &[Some("")], 0));
    }

    #[test]
    fn escape_meta_characters() {
        assert_eq!(r"\(a\)\|\[b\]\{1\}\.\*\+\?\^\$\\\/", {
            escape(r"(a)|[b]{1}.*+?^$\/")
        });
        assert_eq!("plain text é", escape("plain text é"));
    }
}
