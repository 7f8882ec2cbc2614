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
Resolution of `\p{..}` property escapes.

Rather than shipping its own tables, this crate asks `regex-syntax` to
parse a single property class and reads the resulting ranges back out of
its HIR. Without the `unicode` feature, `regex-syntax` has no tables and
every lookup fails.
*/

use regex_syntax::hir::{Class, Hir, HirKind};

/// Which family a resolved property belongs to. This only decides which
/// comparator the compiled program uses; all of them carry plain ranges.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PropertyKind {
    /// A binary property such as `Alphabetic` or `ASCII`.
    Binary,
    GeneralCategory,
    Script,
    ScriptExtension,
}

/// Resolves the contents of `\p{..}` (`name` or `name=value`) into a kind
/// and a sorted list of inclusive code point ranges.
pub(crate) fn resolve(contents: &str) -> Option<(PropertyKind, Vec<(u32, u32)>)> {
    if contents.is_empty()
        || !contents
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '=')
    {
        return None;
    }
    match contents.split_once('=') {
        Some((name, value)) => {
            if value.is_empty() || value.contains('=') {
                return None;
            }
            let kind = match name {
                "General_Category" | "gc" => PropertyKind::GeneralCategory,
                "Script" | "sc" => PropertyKind::Script,
                "Script_Extensions" | "scx" => PropertyKind::ScriptExtension,
                _ => return None,
            };
            let short = match kind {
                PropertyKind::GeneralCategory => "gc",
                PropertyKind::Script => "sc",
                _ => "scx",
            };
            let ranges = lookup(&format!("{}={}", short, value))?;
            Some((kind, ranges))
        }
        None => {
            // A lone name is a general category value or a binary
            // property, in that order.
            if let Some(ranges) = lookup(&format!("gc={}", contents)) {
                return Some((PropertyKind::GeneralCategory, ranges));
            }
            let ranges = lookup(contents)?;
            Some((PropertyKind::Binary, ranges))
        }
    }
}

fn lookup(query: &str) -> Option<Vec<(u32, u32)>> {
    let mut parser = regex_syntax::ParserBuilder::new().build();
    let hir = parser.parse(&format!(r"\p{{{}}}", query)).ok()?;
    ranges(&hir)
}

fn ranges(hir: &Hir) -> Option<Vec<(u32, u32)>> {
    match *hir.kind() {
        HirKind::Class(Class::Unicode(ref cls)) => Some(
            cls.ranges()
                .iter()
                .map(|r| (r.start() as u32, r.end() as u32))
                .collect(),
        ),
        HirKind::Class(Class::Bytes(ref cls)) => Some(
            cls.ranges()
                .iter()
                .map(|r| (r.start() as u32, r.end() as u32))
                .collect(),
        ),
        // Classes of a single code point are simplified into literals.
        HirKind::Literal(ref lit) => {
            let text = core::str::from_utf8(&lit.0).ok()?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(vec![(c as u32, c as u32)]),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Returns true iff `cp` lies in one of the sorted, non-overlapping
/// `ranges`.
pub(crate) fn contains(ranges: &[(u32, u32)], cp: u32) -> bool {
    ranges
        .binary_search_by(|&(start, end)| {
            if end < cp {
                core::cmp::Ordering::Less
            } else if start > cp {
                core::cmp::Ordering::Greater
            } else {
                core::cmp::Ordering::Equal
            }
        })
        .is_ok()
}


#[cfg(test)]
mod contains_tests {
    use super::contains;

    #[test]
    fn binary_search_over_ranges() {
        let ranges = [(10, 20), (30, 30), (40, 50)];
        assert!(contains(&ranges, 10));
        assert!(contains(&ranges, 30));
        assert!(contains(&ranges, 50));
        assert!(!contains(&ranges, 25));
        assert!(!contains(&ranges, 51));
        assert!(!contains(&[], 0));
    }
}
