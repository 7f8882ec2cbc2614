// Macros for writing tests that are generic over the grammar. Each test
// module defines `regex_new!`, which compiles a pattern with the module's
// grammar and returns a `Result`, and `regex!`, which unwraps it.

macro_rules! regex_options {
    ($re:expr, $options:expr) => {
        regex_new!($re, $options).unwrap()
    };
}

macro_rules! spans {
    ($result:expr) => {
        $result
            .matches
            .iter()
            .map(|m| (m.start(), m.end()))
            .collect::<Vec<(usize, usize)>>()
    };
}

// Searches $text and compares the first match and its capture groups with
// the expected positions. `None` as the only position means no match.
macro_rules! mat(
    ($name:ident, $re:expr, $text:expr, $($loc:tt)+) => (
        #[test]
        fn $name() {
            let text = $text;
            let expected: Vec<Option<(usize, usize)>> = vec!($($loc)+);
            let r = regex!($re);
            let result = r.search(text, None);
            let mut got = match result.matches.first() {
                None => vec![None],
                Some(m) => {
                    let mut got = vec![Some((m.start(), m.end()))];
                    got.extend(result.capture_group_matches[0].iter().map(
                        |g| g.as_ref().map(|g| (g.start(), g.end())),
                    ));
                    got
                }
            };
            // Trailing groups that did not participate are trimmed from the
            // results, and the tests sometimes leave out groups.
            got.resize(expected.len(), None);
            if expected != got {
                panic!("For RE '{}' against '{:?}', \
                        expected '{:?}' but got '{:?}'",
                       $re, text, expected, got);
            }
        }
    );
);

// Searches $text and compares the spans of all matches.
macro_rules! findall(
    ($name:ident, $re:expr, $text:expr) => (
        findall!($name, $re, $text,);
    );
    ($name:ident, $re:expr, $text:expr, $($loc:tt)*) => (
        #[test]
        fn $name() {
            let text = $text;
            let expected: Vec<(usize, usize)> = vec!($($loc)*);
            let r = regex!($re);
            let got = spans!(r.search(text, None));
            if expected != got {
                panic!("For RE '{}' against '{:?}', \
                        expected '{:?}' but got '{:?}'",
                       $re, text, expected, got);
            }
        }
    );
);

// Matches $text as a whole, without searching.
macro_rules! whole(
    ($name:ident, $re:expr, $text:expr, $yes:expr) => (
        #[test]
        fn $name() {
            let r = regex!($re);
            assert_eq!($yes, r.has_match($text, None),
                       "For RE '{}' against '{:?}'", $re, $text);
        }
    );
);

macro_rules! noparse(
    ($name:ident, $re:expr, $kind:ident) => (
        #[test]
        fn $name() {
            let re = $re;
            match regex_new!(re) {
                Err(err) => assert_eq!(
                    regex_backtrack::ErrorKind::$kind,
                    err.kind(),
                    "for RE '{}'",
                    re,
                ),
                Ok(_) => panic!("Regex '{}' should cause a parse error.", re),
            }
        }
    );
);

macro_rules! replace(
    ($name:ident, $re:expr, $search:expr, $replace:expr, $result:expr) => (
        #[test]
        fn $name() {
            let re = regex!($re);
            assert_eq!($result, re.replace($search, $replace, None));
        }
    );
);
