mod extended {
    use regex_backtrack::{PosixExtended, PosixOptions, Regex};

    macro_rules! regex_new {
        ($re:expr) => {
            regex_new!($re, PosixOptions::empty())
        };
        ($re:expr, $options:expr) => {
            Regex::<PosixExtended>::try_new($re, $options)
        };
    }

    macro_rules! regex {
        ($re:expr) => {
            regex_new!($re).unwrap()
        };
    }

    mat!(plus, "ab+c", "xabbc", Some((1, 5)));
    mat!(question, "ab?c", "ac", Some((0, 2)));
    mat!(interval, "a{1,2}b", "aaab", Some((1, 4)));
    mat!(interval_open_min, "a{,2}b", "aaab", Some((1, 4)));
    mat!(alternation, "cat|dog", "hotdog", Some((3, 6)));
    mat!(groups, "(a)(b)?", "a", Some((0, 1)), Some((0, 1)), None);
    mat!(backreference, r"(ab)\1", "xabab", Some((1, 5)), Some((1, 3)));
    mat!(bracket_class, "[[:digit:]]+", "ab12", Some((2, 4)));
    mat!(bracket_classes, "[[:alpha:][:digit:]_]+", "-a1_-", Some((1, 4)));
    mat!(bracket_close_first, "[]a]+", "x]a]", Some((1, 4)));
    mat!(bracket_negated_close, "[^]a]", "]ab", Some((2, 3)));
    mat!(bracket_dash_last, "[a-]+", "b-a-", Some((1, 4)));
    mat!(bracket_backslash, r"[\]", r"a\", Some((1, 2)));
    mat!(bracket_ranges, "[[:digit:]a-cx-z]+", "-b9y-", Some((1, 4)));
    mat!(non_capturing, "(?:ab)+", "abab", Some((0, 4)));
    mat!(named, "(?<x>a+)", "baa", Some((1, 3)), Some((1, 3)));
    mat!(lookahead, "a(?=b)", "ab", Some((0, 1)));

    findall!(find_all, "a|b", "cab", (1, 2), (2, 3));

    whole!(whole, "a+b", "aab", true);
    whole!(whole_partial, "a+b", "aabb", false);

    noparse!(fail_open_paren, "(a", MismatchingParen);
    noparse!(fail_close_paren, "a)", MismatchingParen);
    noparse!(fail_empty_alternative, "a||b", EmptySubExpression);
    noparse!(fail_empty_group, "()", EmptySubExpression);
    noparse!(fail_leading_star, "*a", InvalidRepetitionMarker);
    noparse!(fail_open_brace, "a{2", MismatchingBrace);
    noparse!(fail_brace_content, "a{x}", InvalidBraceContent);
    noparse!(fail_bracket, "[abc", MismatchingBracket);
    noparse!(fail_range, "[z-a]", InvalidRange);
    noparse!(fail_class_name, "[[:nope:]]", InvalidCharacterClass);
    noparse!(fail_collation, "[[.a.]]", InvalidCollationElement);
    noparse!(fail_equivalence, "[[=a=]]", InvalidCollationElement);
    noparse!(fail_trailing_escape, "ab\\", InvalidTrailingEscape);
    noparse!(fail_back_reference, r"(a)\2", InvalidNumber);

    #[test]
    fn multiline_splits_lines() {
        let re = regex_new!("^b+$", PosixOptions::MULTILINE).unwrap();
        let result = re.search("ab\nbb\nb", None);
        let got: Vec<(usize, usize, usize)> = result
            .matches
            .iter()
            .map(|m| (m.line(), m.column(), m.global_offset()))
            .collect();
        assert_eq!(vec![(1, 0, 3), (2, 0, 6)], got);
        assert_eq!(Some("bb"), result.matches[0].as_str());
    }

    #[test]
    fn multiline_without_global_takes_one_per_line() {
        let re = regex_new!("b", PosixOptions::MULTILINE).unwrap();
        let result = re.matches("bb\nab", None);
        assert_eq!(vec![(0, 1), (4, 5)], spans!(result));
    }

    #[test]
    fn not_begin_and_end_of_line() {
        let re = regex!("^a");
        assert!(re.search("ab", None).success);
        let result = re.search("ab", PosixOptions::MATCH_NOT_BEGIN_OF_LINE);
        assert!(!result.success);

        let re = regex!("a$");
        let result = re.search("ba", PosixOptions::MATCH_NOT_END_OF_LINE);
        assert!(!result.success);

        // With both set, searching drops both.
        let both = PosixOptions::MATCH_NOT_BEGIN_OF_LINE
            | PosixOptions::MATCH_NOT_END_OF_LINE;
        let re = regex!("^a$");
        assert!(re.search("a", both).success);
    }

    #[test]
    fn not_begin_of_line_applies_to_first_line_only() {
        let re = regex_new!("^a", PosixOptions::MULTILINE).unwrap();
        let result = re.search("ab\nab", PosixOptions::MATCH_NOT_BEGIN_OF_LINE);
        assert_eq!(vec![(3, 4)], spans!(result));
    }

    #[test]
    fn insensitive_brackets() {
        let re = regex_new!("[a-c]+", PosixOptions::INSENSITIVE).unwrap();
        assert_eq!(vec![(0, 3)], spans!(re.search("AbC", None)));
    }
}

mod basic {
    use regex_backtrack::{PosixBasic, PosixOptions, Regex};

    macro_rules! regex_new {
        ($re:expr) => {
            regex_new!($re, PosixOptions::empty())
        };
        ($re:expr, $options:expr) => {
            Regex::<PosixBasic>::try_new($re, $options)
        };
    }

    macro_rules! regex {
        ($re:expr) => {
            regex_new!($re).unwrap()
        };
    }

    mat!(group, r"\(ab\)*c", "xababc", Some((1, 6)), Some((3, 5)));
    mat!(interval, r"a\{2,3\}", "aaaa", Some((0, 3)));
    mat!(interval_exact, r"a\{2\}", "aaa", Some((0, 2)));
    mat!(backreference, r"\(a*\)b\1", "aabaa", Some((0, 5)), Some((0, 2)));
    mat!(plus_is_literal, "a+", "aa+", Some((1, 3)));
    mat!(question_is_literal, "a?", "a?", Some((0, 2)));
    mat!(pipe_is_literal, "a|b", "a|b", Some((0, 3)));
    mat!(parens_are_literal, "(a)", "(a)", Some((0, 3)));
    mat!(leading_star_is_literal, "*a", "b*a", Some((1, 3)));
    mat!(caret_in_middle_is_literal, "a^b", "a^b", Some((0, 3)));
    mat!(dollar_in_middle_is_literal, "a$b", "a$b", Some((0, 3)));
    mat!(anchors, "^ab$", "ab", Some((0, 2)));
    mat!(dot, "a.c", "abc", Some((0, 3)));
    mat!(bracket, "[[:upper:]]", "aB", Some((1, 2)));

    noparse!(fail_open_group, r"\(a", MismatchingParen);
    noparse!(fail_close_group, r"a\)", MismatchingParen);
    noparse!(fail_open_brace, r"a\{2", MismatchingBrace);
    noparse!(fail_back_reference, r"a\1", InvalidNumber);
    noparse!(fail_trailing_escape, "a\\", InvalidTrailingEscape);

    #[test]
    fn group_count() {
        let re = regex!(r"\(a\)\(\(b\)\)");
        assert_eq!(3, re.capture_groups_count());
        assert_eq!(0, re.named_capture_groups_count());
    }
}
