#[macro_use]
mod macros;

mod api;
mod posix;
mod properties;

use {
    anyhow::Result,
    regex_backtrack::{
        Ecma262, EcmaScriptOptions, PosixBasic, PosixExtended, PosixOptions,
        Regex, RegexBuilder, RegexResult,
    },
    regex_test::{
        CompiledRegex, Match, RegexTest, RegexTests, Span, TestResult,
        TestRunner,
    },
};

fn suite() -> Result<RegexTests> {
    let mut tests = RegexTests::new();
    macro_rules! load {
        ($name:expr) => {{
            const DATA: &[u8] =
                include_bytes!(concat!("testdata/", $name, ".toml"));
            tests.load_slice($name, DATA)?;
        }};
    }

    load!("ecma262");
    load!("posix-basic");
    load!("posix-extended");
    load!("backtracking");

    Ok(tests)
}

/// Runs every TOML test through `Regex::search`, with the grammar chosen by
/// the file the test came from.
#[test]
fn suite_search() -> Result<()> {
    let mut runner = TestRunner::new()?;
    runner
        .expand(&["is_match", "find", "captures"], |test| test.compiles())
        .test_iter(suite()?.iter(), compiler)
        .assert();
    Ok(())
}

fn compiler(test: &RegexTest, _patterns: &[String]) -> Result<CompiledRegex> {
    let Some(pattern) = skip_or_get_pattern(test) else {
        return Ok(CompiledRegex::skip());
    };
    let re = match test.group() {
        "posix-basic" => {
            let mut options = PosixOptions::empty();
            if test.case_insensitive() {
                options |= PosixOptions::INSENSITIVE;
            }
            Grammar::Basic(
                RegexBuilder::<PosixBasic>::new(pattern).options(options).build()?,
            )
        }
        "posix-extended" => {
            let mut options = PosixOptions::empty();
            if test.case_insensitive() {
                options |= PosixOptions::INSENSITIVE;
            }
            Grammar::Extended(
                RegexBuilder::<PosixExtended>::new(pattern)
                    .options(options)
                    .build()?,
            )
        }
        _ => {
            let mut options = EcmaScriptOptions::empty();
            if test.case_insensitive() {
                options |= EcmaScriptOptions::INSENSITIVE;
            }
            Grammar::Ecma(RegexBuilder::<Ecma262>::new(pattern).options(options).build()?)
        }
    };
    Ok(CompiledRegex::compiled(move |test| run_test(&re, test)))
}

/// A regex compiled in the grammar of the file its test came from.
enum Grammar {
    Basic(Regex<PosixBasic>),
    Extended(Regex<PosixExtended>),
    Ecma(Regex<Ecma262>),
}

impl Grammar {
    /// Searches `hay` with `flags` added, which must be flags that both
    /// option flavors have.
    fn search<'h>(&self, hay: &'h str, flags: PosixOptions) -> RegexResult<'h> {
        match *self {
            Grammar::Basic(ref re) => re.search(hay, flags),
            Grammar::Extended(ref re) => re.search(hay, flags),
            Grammar::Ecma(ref re) => re.search(hay, EcmaScriptOptions::from(flags)),
        }
    }
}

fn run_test(re: &Grammar, test: &RegexTest) -> TestResult {
    let hay = match std::str::from_utf8(test.haystack()) {
        Ok(hay) => hay,
        Err(err) => {
            return TestResult::fail(&format!(
                "haystack is not valid UTF-8: {}",
                err
            ));
        }
    };
    let limit = test.match_limit().unwrap_or(std::usize::MAX);
    match test.additional_name() {
        "is_match" => TestResult::matched(
            re.search(hay, PosixOptions::SINGLE_MATCH).success,
        ),
        "find" => {
            let result = re.search(hay, PosixOptions::empty());
            TestResult::matches(result.matches.iter().take(limit).map(|m| {
                Match { id: 0, span: Span { start: m.start(), end: m.end() } }
            }))
        }
        "captures" => {
            let result = re.search(hay, PosixOptions::SKIP_TRIM_EMPTY_MATCHES);
            TestResult::captures(testify_captures(&result).into_iter().take(limit))
        }
        name => TestResult::fail(&format!("unrecognized test name: {}", name)),
    }
}

/// Whether we should skip the given test or not. If not, return the single
/// pattern from the given test.
fn skip_or_get_pattern(test: &RegexTest) -> Option<&str> {
    // Only single pattern regexes exist here.
    let pattern = match test.regexes().len() {
        1 => &test.regexes()[0],
        _ => return None,
    };
    // Searches always report leftmost-first matches, from the start of the
    // haystack.
    if !matches!(test.search_kind(), regex_test::SearchKind::Leftmost) {
        return None;
    }
    if !matches!(test.match_kind(), regex_test::MatchKind::LeftmostFirst) {
        return None;
    }
    if test.anchored() {
        return None;
    }
    let bounds = test.bounds();
    if !(bounds.start == 0 && bounds.end == test.haystack().len()) {
        return None;
    }
    Some(pattern)
}

/// Converts every match of `result` into the test suite's capture values.
fn testify_captures(result: &RegexResult<'_>) -> Vec<regex_test::Captures> {
    let mut all = vec![];
    for (m, groups) in result.matches.iter().zip(&result.capture_group_matches) {
        let whole = Some(Span { start: m.start(), end: m.end() });
        let groups = groups.iter().map(|g| {
            g.as_ref().map(|g| Span { start: g.start(), end: g.end() })
        });
        // This unwrap is OK because the first group is always the overall
        // match.
        all.push(
            regex_test::Captures::new(0, std::iter::once(whole).chain(groups))
                .unwrap(),
        );
    }
    all
}
