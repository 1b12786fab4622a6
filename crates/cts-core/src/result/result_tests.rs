use std::time::Duration;

use indoc::indoc;

use super::{List, Result, Status, Tags};
use crate::{Error, Query};

fn r(query: &str, tags: &[&str], status: Status) -> Result {
    Result::new(Query::parse(query), Tags::new(tags.iter().copied()), status)
}

fn list(results: impl IntoIterator<Item = Result>) -> List {
    results.into_iter().collect()
}

#[test]
fn display_and_parse() {
    let cases = [
        (r("a", &[], Status::Failure), "a Failure"),
        (r("a:b,c,*", &["x"], Status::Pass), "a:b,c,* x Pass"),
        (
            r("a:b,c:d,*", &["zzz", "x", "yy"], Status::Failure),
            "a:b,c:d,* x,yy,zzz Failure",
        ),
    ];
    for (result, line) in cases {
        assert_eq!(result.to_string(), line);
        assert_eq!(Result::parse(line).unwrap(), result);
    }
}

#[test]
fn parse_rejects_wrong_field_count() {
    for line in ["", "a", "a b c d"] {
        let err = Result::parse(line).unwrap_err();
        assert_eq!(err.to_string(), format!("unable to parse result '{line}'"));
    }
}

#[test]
fn parse_rejects_unknown_status() {
    let err = Result::parse("a:b Bogus").unwrap_err();
    assert_eq!(err, Error::UnknownStatus("Bogus".into()));
}

#[test]
fn parse_lines_skips_blanks_and_comments() {
    let text = indoc! {"
        # results from the last run
        a:b Pass

        a:c os-a,gpu-b Failure
    "};
    let results = List::parse_lines(text).unwrap();
    insta::assert_snapshot!(results.to_string(), @r"
    a:b Pass
    a:c gpu-b,os-a Failure
    ");
}

#[test]
fn json_round_trip() {
    let mut result = r("a:b,c:*", &["os-a"], Status::Slow);
    result.duration = Duration::from_millis(1500);
    let json = serde_json::to_string(&result).unwrap();
    assert_eq!(
        json,
        r#"{"query":"a:b,c:*","tags":["os-a"],"status":"Slow","duration_ms":1500}"#
    );
    assert_eq!(serde_json::from_str::<Result>(&json).unwrap(), result);

    let parsed: List =
        serde_json::from_str(r#"[{"query":"a:b","status":"Pass","may_exonerate":true}]"#).unwrap();
    assert_eq!(parsed.len(), 1);
    assert!(parsed[0].tags.is_empty());
    assert!(parsed[0].may_exonerate);
    assert_eq!(parsed[0].duration, Duration::ZERO);
}

#[test]
fn unique_tags_sorted_by_string() {
    let results = list([
        r("a", &["x"], Status::Pass),
        r("b", &["y", "x"], Status::Pass),
        r("c", &["x"], Status::Failure),
        r("d", &[], Status::Pass),
        r("e", &["w"], Status::Pass),
    ]);
    let rendered: Vec<String> = results.unique_tags().iter().map(Tags::to_string).collect();
    assert_eq!(rendered, ["", "w", "x", "x,y"]);
    assert_eq!(results.variants(), results.unique_tags());
}

#[test]
fn transform_tags_calls_once_per_distinct_set() {
    let results = list([
        r("a", &["x"], Status::Pass),
        r("b", &["y"], Status::Pass),
        r("c", &["x"], Status::Failure),
    ]);
    let mut calls = 0;
    let transformed = results.transform_tags(|tags| {
        calls += 1;
        let mut out = tags.clone();
        out.add("z");
        out
    });
    assert_eq!(calls, 2);
    insta::assert_snapshot!(transformed.to_string(), @r"
    a x,z Pass
    b y,z Pass
    c x,z Failure
    ");
}

#[test]
fn replace_duplicates_keeps_singletons() {
    let results = list([r("a", &[], Status::Pass), r("b", &[], Status::Pass)]);
    let out = results.replace_duplicates(|_| Status::Abort);
    assert_eq!(out, results);
}

#[test]
fn replace_duplicates_passes_group_in_order() {
    let results = list([
        r("a", &[], Status::Pass),
        r("b", &[], Status::Pass),
        r("a", &[], Status::Skip),
    ]);
    let out = results.replace_duplicates(|group| {
        assert_eq!(
            *group,
            list([r("a", &[], Status::Pass), r("a", &[], Status::Skip)])
        );
        Status::Abort
    });
    assert_eq!(
        out,
        list([r("a", &[], Status::Abort), r("b", &[], Status::Pass)])
    );
}

#[test]
fn replace_duplicates_groups_by_tags() {
    let results = list([
        r("a", &["x"], Status::Pass),
        r("a", &["y"], Status::Failure),
        r("a", &["x"], Status::Crash),
    ]);
    let out = results.replace_duplicates(List::resolve_priority);
    assert_eq!(
        out,
        list([r("a", &["x"], Status::Crash), r("a", &["y"], Status::Failure)])
    );
}

#[test]
fn resolve_priority_order() {
    let group = |statuses: &[Status]| -> Status {
        List::resolve_priority(&statuses.iter().map(|s| r("a", &[], *s)).collect())
    };
    assert_eq!(group(&[Status::Pass, Status::Pass]), Status::Pass);
    assert_eq!(group(&[Status::Skip, Status::Skip]), Status::Skip);
    assert_eq!(group(&[Status::Pass, Status::Crash, Status::Abort]), Status::Crash);
    assert_eq!(group(&[Status::Failure, Status::Abort]), Status::Abort);
    assert_eq!(group(&[Status::Slow, Status::Failure]), Status::Failure);
    assert_eq!(group(&[Status::Pass, Status::Slow]), Status::Slow);
    assert_eq!(group(&[Status::Pass, Status::Skip]), Status::Failure);
}

#[test]
fn sort_by_query_tags_status() {
    let mut results = list([
        r("b", &[], Status::Pass),
        r("a", &["y"], Status::Failure),
        r("a", &["x"], Status::Failure),
        r("a", &["x"], Status::Abort),
        r("a:b", &[], Status::Pass),
    ]);
    results.sort();
    insta::assert_snapshot!(results.to_string(), @r"
    a x Abort
    a x Failure
    a y Failure
    a:b Pass
    b Pass
    ");
}

#[test]
fn filters() {
    let results = list([
        r("a", &["x"], Status::Pass),
        r("b", &["x", "y"], Status::Failure),
        r("c", &["y"], Status::Pass),
    ]);

    let passing = results.filter_by_status(Status::Pass);
    assert_eq!(passing, list([r("a", &["x"], Status::Pass), r("c", &["y"], Status::Pass)]));

    let x = Tags::new(["x"]);
    assert_eq!(results.filter_by_tags(&x).len(), 2);
    assert_eq!(
        results.filter_by_variant(&x),
        list([r("a", &["x"], Status::Pass)])
    );

    let not_b = results.filter(|r| r.query != Query::parse("b"));
    assert_eq!(not_b.len(), 2);
}

#[test]
fn statuses_are_sorted_by_name() {
    let results = list([
        r("a", &[], Status::Pass),
        r("b", &[], Status::Consumed),
        r("c", &[], Status::Failure),
        r("d", &[], Status::Pass),
    ]);
    let statuses: Vec<Status> = results.statuses().into_iter().collect();
    assert_eq!(statuses, [Status::Consumed, Status::Failure, Status::Pass]);
}

#[test]
fn merge_drops_exact_duplicates() {
    let results = list([
        r("a", &["x"], Status::Failure),
        r("a", &["x"], Status::Pass),
        r("a", &["x"], Status::Failure),
        r("b", &[], Status::Pass),
    ]);
    assert_eq!(
        results.merge(),
        list([
            r("a", &["x"], Status::Failure),
            r("a", &["x"], Status::Pass),
            r("b", &[], Status::Pass),
        ])
    );
}

#[test]
fn status_tree_rejects_repeated_queries() {
    let results = list([r("a:b", &["x"], Status::Pass), r("a:b", &["y"], Status::Pass)]);
    assert_eq!(
        results.status_tree().unwrap_err(),
        Error::DuplicateData {
            query: Query::parse("a:b")
        }
    );

    let results = list([r("a:b", &[], Status::Pass), r("a:c", &[], Status::Failure)]);
    let tree = results.status_tree().unwrap();
    assert_eq!(tree.list().len(), 2);
}
