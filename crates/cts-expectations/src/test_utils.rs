//! Fixtures shared by the engine tests.

use cts_core::{List, Query, Status, Tags, TestResult};

use crate::{Content, Diagnostics, parse};

/// Tag header declaring an `os` and a `gpu` set.
pub const HEADER: &str = "\
# BEGIN TAG HEADER
# OS
# tags: [ os-a os-b os-c ]
# GPU
# tags: [ gpu-a gpu-b gpu-c ]
# END TAG HEADER
";

/// Number of lines in [`HEADER`].
pub const HEADER_LINES: usize = 6;

pub fn q(s: &str) -> Query {
    Query::parse(s)
}

pub fn tags(t: &[&str]) -> Tags {
    t.iter().copied().collect()
}

pub fn r(query: &str, t: &[&str], status: Status) -> TestResult {
    TestResult::new(q(query), tags(t), status)
}

/// Parses `body` below [`HEADER`].
pub fn doc(body: &str) -> Content {
    parse(&format!("{HEADER}{body}")).unwrap()
}

/// Renders `content` without its leading [`HEADER`].
pub fn body(content: &Content) -> String {
    let text = content.to_string();
    match text.strip_prefix(HEADER) {
        Some(rest) => rest.to_string(),
        None => panic!("header missing from output:\n{text}"),
    }
}

/// Runs an update of `expectations` against `results`, every result query
/// counting as a known test.
pub fn update(expectations: &str, results: Vec<TestResult>) -> (String, Diagnostics) {
    let test_list: Vec<Query> = results.iter().map(|r| r.query.clone()).collect();
    update_with_tests(expectations, results, &test_list)
}

pub fn update_with_tests(
    expectations: &str,
    results: Vec<TestResult>,
    test_list: &[Query],
) -> (String, Diagnostics) {
    let mut content = doc(expectations);
    let diags = content.update(&List::from(results), test_list).unwrap();
    (body(&content), diags)
}

/// `n` results `a:b,c:NN:*` where the first `failing` fail and the rest pass.
pub fn numbered(n: usize, failing: usize) -> Vec<TestResult> {
    (0..n)
        .map(|i| {
            let status = if i < failing {
                Status::Failure
            } else {
                Status::Pass
            };
            r(&format!("a:b,c:{i:02}:*"), &[], status)
        })
        .collect()
}
