use quickcheck::{Arbitrary, Gen, QuickCheck, Testable};
use regex_backtrack::{escape, EcmaScriptOptions, MatchOutcome, Regex};

fn qc<T: Testable>(t: T) {
    QuickCheck::new().tests(1_000).max_tests(2_000).quickcheck(t);
}

/// A wrapper type for generating "regex-like" strings.
///
/// Its `Arbitrary` impl biases toward special regex characters, since
/// random strings mostly compile to plain literals.
#[derive(Clone, Debug)]
struct RegexLikeString(String);

impl Arbitrary for RegexLikeString {
    fn arbitrary(g: &mut Gen) -> RegexLikeString {
        const SPECIAL: &[char] = &[
            '\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^',
            '$', '-', ',', '=', '!', '<', '1', 'b', 'd', 'w',
        ];
        const PLAIN: &[char] = &['a', 'b', 'c', '0', ' ', 'é'];
        let size = usize::arbitrary(g) % 16;
        RegexLikeString(
            (0..size)
                .map(|_| {
                    let from = if bool::arbitrary(g) { SPECIAL } else { PLAIN };
                    *g.choose(from).unwrap()
                })
                .collect(),
        )
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = RegexLikeString>> {
        Box::new(self.0.shrink().map(RegexLikeString))
    }
}

/// A short subject over a small alphabet, so that random patterns have a
/// chance of matching without backtracking for long.
#[derive(Clone, Debug)]
struct Subject(String);

impl Arbitrary for Subject {
    fn arbitrary(g: &mut Gen) -> Subject {
        const ALPHABET: &[char] = &['a', 'b', 'c', '0', ' ', '\n', 'é'];
        let size = usize::arbitrary(g) % 10;
        Subject((0..size).map(|_| *g.choose(ALPHABET).unwrap()).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Subject>> {
        Box::new(self.0.shrink().map(Subject))
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    Regex::try_new(pattern, EcmaScriptOptions::empty()).ok()
}

#[test]
fn matching_is_deterministic() {
    fn prop(pattern: RegexLikeString, subject: Subject) -> bool {
        let re = match compile(&pattern.0) {
            None => return true,
            Some(re) => re,
        };
        let first = re.search(subject.0.as_str(), None);
        let second = re.search(subject.0.as_str(), None);
        first.outcome == second.outcome
            && first.matches == second.matches
            && first.capture_group_matches == second.capture_group_matches
            && first.operations == second.operations
    }
    qc(prop as fn(RegexLikeString, Subject) -> bool);
}

#[test]
fn captures_lie_within_the_subject() {
    fn prop(pattern: RegexLikeString, subject: Subject) -> bool {
        let re = match compile(&pattern.0) {
            None => return true,
            Some(re) => re,
        };
        let len = subject.0.len();
        let result = re.search(subject.0.as_str(), None);
        let whole = result.matches.iter().all(|m| m.start() <= m.end() && m.end() <= len);
        let groups = result.capture_group_matches.iter().flatten().flatten().all(|m| {
            m.start() <= m.end() && m.end() <= len
        });
        let aborted = result.outcome == MatchOutcome::Aborted;
        whole && groups && (aborted || result.success == !result.matches.is_empty())
    }
    qc(prop as fn(RegexLikeString, Subject) -> bool);
}

#[test]
fn escaped_text_matches_itself() {
    fn prop(text: String) -> bool {
        let re = match compile(&escape(&text)) {
            None => return false,
            Some(re) => re,
        };
        re.has_match(text.as_str(), None)
    }
    qc(prop as fn(String) -> bool);
}

#[test]
fn invalid_patterns_report_an_error() {
    fn prop(pattern: RegexLikeString) -> bool {
        let re: Regex = Regex::new(&pattern.0, EcmaScriptOptions::empty());
        let checked = compile(&pattern.0);
        re.error().is_some() == checked.is_none()
            && (re.error().is_none() || !re.search("abc", None).success)
    }
    qc(prop as fn(RegexLikeString) -> bool);
}
