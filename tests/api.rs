use regex_backtrack::{
    EcmaScriptOptions, ErrorKind, MatchOutcome, MatchText, PosixBasic,
    PosixOptions, Regex, RegexOptions, RegexStringView,
};

macro_rules! regex_new {
    ($re:expr) => {
        regex_new!($re, EcmaScriptOptions::empty())
    };
    ($re:expr, $options:expr) => {{
        let re: Result<Regex, _> = Regex::try_new($re, $options);
        re
    }};
}

macro_rules! regex {
    ($re:expr) => {
        regex_new!($re).unwrap()
    };
}

#[test]
fn named_captures() {
    let re = regex!(r"(?<year>\d{4})");
    let result = re.search("2024", None);
    assert!(result.success);
    assert_eq!(1, result.n_named_capture_groups);
    let year = &result.named_capture_group_matches[0]["year"];
    assert_eq!(Some("2024"), year.as_str());
    assert_eq!(0..4, year.range());
}

#[test]
fn named_captures_share_a_name_across_alternatives() {
    let re = regex!(r"(?<n>a)|(?<n>b)");
    assert_eq!(2, re.capture_groups_count());
    assert_eq!(1, re.named_capture_groups_count());
    let names: Vec<(&str, &[usize])> = re.capture_names().collect();
    assert_eq!(vec![("n", &[1, 2][..])], names);

    let result = re.search("b", None);
    assert_eq!(Some("b"), result.named_capture_group_matches[0]["n"].as_str());
}

#[test]
fn match_positions() {
    let re = regex!("b+");
    let result = re.search("abbc", None);
    let m = &result.matches[0];
    assert_eq!(1, m.start());
    assert_eq!(3, m.end());
    assert_eq!(2, m.len());
    assert!(!m.is_empty());
    assert_eq!(0, m.line());
    assert_eq!(1, m.column());
    assert_eq!(1, m.global_offset());
    assert_eq!(Some(&b"bb"[..]), m.as_bytes());
    assert_eq!(RegexStringView::Utf8("bb"), m.view());
}

#[test]
fn result_counts() {
    let re = regex!("(a)(b)?");
    let result = re.search("a a", None);
    assert_eq!(MatchOutcome::Matched, result.outcome);
    assert_eq!(2, result.count);
    assert_eq!(2, result.n_capture_groups);
    assert!(result.operations > 0);
}

#[test]
fn trailing_empty_groups_are_trimmed() {
    let re = regex!("(a)(b)?(c)?");
    let result = re.search("a", None);
    assert_eq!(1, result.capture_group_matches[0].len());

    let result = re.search("a", EcmaScriptOptions::SKIP_TRIM_EMPTY_MATCHES);
    let groups = &result.capture_group_matches[0];
    assert_eq!(3, groups.len());
    assert!(groups[1].is_none() && groups[2].is_none());
}

#[test]
fn skip_sub_expression_results() {
    let re = regex!("(a)(?<b>b)");
    let result = re.search("ab", EcmaScriptOptions::SKIP_SUB_EXPR_RESULTS);
    assert!(result.success);
    assert_eq!(vec![(0, 2)], spans!(result));
    assert!(result.capture_group_matches[0].is_empty());
    assert!(result.named_capture_group_matches[0].is_empty());

    // Back references still need the groups.
    let re = regex!(r"(a)\1");
    assert!(re.search("aa", EcmaScriptOptions::SKIP_SUB_EXPR_RESULTS).success);
    assert!(!re.search("ab", EcmaScriptOptions::SKIP_SUB_EXPR_RESULTS).success);
}

#[test]
fn copied_matches_outlive_the_subject() {
    let re = regex!("b+");
    let owned = {
        let subject = String::from("abbc");
        let result = re.search(&subject, EcmaScriptOptions::STRING_COPY_MATCHES);
        let m = result.matches.into_iter().next().unwrap();
        assert!(m.is_owned());
        m.into_owned()
    };
    assert_eq!(Some("bb"), owned.as_str());
    assert_eq!(1, owned.start());

    let subject = "abbc";
    let result = re.search(subject, None);
    assert!(!result.matches[0].is_owned());
}

#[test]
fn byte_subjects() {
    let re = regex!("a.b");
    let result = re.search(&b"xa\xFFb"[..], None);
    assert_eq!(vec![(1, 4)], spans!(result));
    let m = &result.matches[0];
    assert_eq!(None, m.as_str());
    assert_eq!(Some(&b"a\xFFb"[..]), m.as_bytes());
    assert_eq!("a\u{FFFD}b", m.text().to_string_lossy());
}

#[test]
fn utf32_subjects() {
    let subject: Vec<char> = "δab".chars().collect();
    let re = regex!("a+b");
    let result = re.search(&subject, None);
    // Offsets of UTF-32 subjects count characters.
    assert_eq!(vec![(1, 3)], spans!(result));
    let m = &result.matches[0];
    assert_eq!(None, m.as_str());
    assert_eq!(MatchText::Utf32(['a', 'b'][..].into()), *m.text());
}

#[test]
fn utf8_offsets_are_bytes() {
    let re = regex!("b");
    assert_eq!(vec![(3, 4)], spans!(re.search("aδb", None)));
}

#[test]
fn match_views() {
    let re = regex_backtrack::RegexBuilder::<PosixBasic>::new("^b")
        .options(PosixOptions::MULTILINE)
        .build()
        .unwrap();
    let lines = [RegexStringView::from("ab"), RegexStringView::from("bc")];
    let result = re.match_views(&lines, None);
    assert_eq!(1, result.count);
    let m = &result.matches[0];
    assert_eq!((1, 0, 3), (m.line(), m.column(), m.global_offset()));
}

#[test]
fn invalid_patterns_never_match() {
    let re: Regex = Regex::new("(", EcmaScriptOptions::empty());
    assert_eq!(Some(ErrorKind::MismatchingParen), re.error().map(|e| e.kind()));
    let result = re.search("(", None);
    assert!(!result.success);
    assert_eq!(MatchOutcome::NoMatch, result.outcome);
    assert!(result.matches.is_empty());
    assert!(!re.has_match("(", None));
    assert_eq!("(", re.replace("(", "x", None));
}

#[test]
fn error_string() {
    let re: Regex = Regex::new("ab(c", EcmaScriptOptions::empty());
    let expected = "Error during parsing of regular expression:\n    \
                    ab(c\n        ^---- ( ) imbalance.";
    assert_eq!(expected, re.error_string(None));
    let expected = "Error during parsing of regular expression:\n    \
                    ab(c\n        ^---- oops";
    assert_eq!(expected, re.error_string(Some("oops")));

    let re = regex!("abc");
    assert_eq!("No error", re.error_string(None));
}

#[test]
fn from_str_and_display() {
    let re: Regex = r"a\d+".parse().unwrap();
    assert_eq!(r"a\d+", re.as_str());
    assert_eq!(r"a\d+", re.to_string());
    assert_eq!(r"a\d+", format!("{:?}", re));
    assert!("a(".parse::<Regex>().is_err());
}

#[test]
fn options_include_grammar_flags() {
    let re = regex_new!("a", EcmaScriptOptions::GLOBAL).unwrap();
    assert!(re.options().contains(RegexOptions::GLOBAL));
    assert!(re.options().contains(RegexOptions::INTERNAL_CONSIDER_NEWLINE));
    assert!(re.parser_result().error().is_none());
    assert_eq!(1, re.parser_result().match_length_minimum());
}

#[test]
fn program_dump() {
    let re = regex!("a(b)");
    let dump = format!("{:?}", re.parser_result());
    assert!(!dump.is_empty());
    assert!(dump.contains("capture_groups_count"));
}

#[test]
fn regex_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Regex>();
    assert_send_sync::<Regex<PosixBasic>>();
}

#[test]
fn determinism() {
    let re = regex!(r"(a|ab)(c|bcd)(d*)");
    let first = re.search("abcd abcd", None);
    let second = re.search("abcd abcd", None);
    assert_eq!(spans!(first), spans!(second));
    assert_eq!(first.capture_group_matches, second.capture_group_matches);
    assert_eq!(first.operations, second.operations);
}

#[test]
fn escape() {
    let quoted = regex_backtrack::escape("1+1=2?");
    assert_eq!(r"1\+1=2\?", quoted);
    let re = regex!(&quoted);
    assert!(re.has_match("1+1=2?", None));
}
