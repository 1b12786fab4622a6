use crate::query::{Query, Target};

fn q(s: &str) -> Query {
    Query::parse(s)
}

fn walk_trace(query: &str) -> String {
    let mut out = String::new();
    q(query)
        .walk(|prefix, target, name| -> Result<(), ()> {
            out.push_str(&format!("{target} {name:?} {prefix}\n"));
            Ok(())
        })
        .unwrap();
    out
}

#[test]
fn parse_levels() {
    let query = q(r#"suite:a,b:c,d:e=1;f="g";*"#);
    assert_eq!(query.suite, "suite");
    assert_eq!(query.files, "a,b");
    assert_eq!(query.tests, "c,d");
    assert_eq!(query.cases, r#"e=1;f="g";*"#);
    assert_eq!(query.target(), Target::Cases);
}

#[test]
fn parse_keeps_extra_delimiters_in_cases() {
    let query = q("a:b:c:d:e");
    assert_eq!(query.cases, "d:e");
    assert_eq!(query.to_string(), "a:b:c:d:e");
}

#[test]
fn display_round_trips() {
    for s in [
        "suite",
        "suite:*",
        "suite:a,b,*",
        "suite:a,b:*",
        "suite:a,b:c:*",
        r#"suite:a,b:c:d="e";*"#,
        "suite:a,b:c:d=1;e=2",
    ] {
        assert_eq!(q(s).to_string(), s);
    }
}

#[test]
fn target_is_deepest_level() {
    assert_eq!(q("a").target(), Target::Suite);
    assert_eq!(q("a:b").target(), Target::Files);
    assert_eq!(q("a:b:c").target(), Target::Tests);
    assert_eq!(q("a:b:c:d").target(), Target::Cases);
}

#[test]
fn wildcard_checks_deepest_level_only() {
    assert!(q("a:*").is_wildcard());
    assert!(q("a:b,*").is_wildcard());
    assert!(q("a:b:*").is_wildcard());
    assert!(q("a:b:c:x=1;*").is_wildcard());
    assert!(!q("a:b").is_wildcard());
    assert!(!q("a:b:c").is_wildcard());
    assert!(!q("a:b:c:x=1").is_wildcard());
}

#[test]
fn append_uses_level_delimiters() {
    assert_eq!(q("a").append(Target::Files, "*").to_string(), "a:*");
    assert_eq!(q("a:b").append(Target::Files, "*").to_string(), "a:b,*");
    assert_eq!(q("a:b").append(Target::Tests, "*").to_string(), "a:b:*");
    assert_eq!(q("a:b:c").append(Target::Tests, "d").to_string(), "a:b:c,d");
    assert_eq!(q("a:b:c").append(Target::Cases, "*").to_string(), "a:b:c:*");
    assert_eq!(q("a:b:c:x=1").append(Target::Cases, "*").to_string(), "a:b:c:x=1;*");
}

#[test]
fn walk_visits_every_level() {
    insta::assert_snapshot!(walk_trace(r#"suite:a,b:c:d="e";*"#), @r#"
    suite "suite" suite
    files "a" suite:a
    files "b" suite:a,b
    tests "c" suite:a,b:c
    cases "d=\"e\";*" suite:a,b:c:d="e";*
    "#);
}

#[test]
fn walk_wildcard_levels() {
    insta::assert_snapshot!(walk_trace("suite:a,*"), @r#"
    suite "suite" suite
    files "a" suite:a
    files "*" suite:a,*
    "#);
    insta::assert_snapshot!(walk_trace("suite:a:*"), @r#"
    suite "suite" suite
    files "a" suite:a
    tests "*" suite:a:*
    "#);
}

#[test]
fn walk_stops_on_error() {
    let mut visited = 0;
    let result = q("a:b,c:d").walk(|_, target, _| {
        visited += 1;
        if target == Target::Files { Err("stop") } else { Ok(()) }
    });
    assert_eq!(result, Err("stop"));
    assert_eq!(visited, 2);
}

#[test]
fn ordering_is_level_by_level() {
    let mut queries = vec![q("b"), q("a:c"), q("a:b:x"), q("a:b"), q("a:b,*"), q("a")];
    queries.sort();
    let rendered: Vec<String> = queries.iter().map(Query::to_string).collect();
    assert_eq!(rendered, ["a", "a:b", "a:b:x", "a:b,*", "a:c", "b"]);
}

#[test]
fn contains_self_and_children() {
    assert!(q("a").contains(&q("a")));
    assert!(q("a").contains(&q("a:b,c:d")));
    assert!(q("a:b").contains(&q("a:b,c")));
    assert!(q("a:b,c:d").contains(&q("a:b,c:d:e=1")));
    assert!(!q("a").contains(&q("b")));
    assert!(!q("a:b").contains(&q("a:c")));
    assert!(!q("a:b,c:d").contains(&q("a:b,c")));
    assert!(!q("a:b:c").contains(&q("a:b,x:c")));
}

#[test]
fn contains_through_wildcards() {
    assert!(q("a:*").contains(&q("a:b,c:d:*")));
    assert!(q("a:b,*").contains(&q("a:b,c")));
    assert!(q("a:b,*").contains(&q("a:b:c,*")));
    assert!(q("a:b:*").contains(&q("a:b:c:x=1")));
    assert!(q("a:b,c,*").contains(&q("a:b,c:d")));
    assert!(!q("a:b,c,*").contains(&q("a:b")));
    assert!(!q("a:b:*").contains(&q("a:c:d")));
}

#[test]
fn contains_cases_by_parameters() {
    // Wildcard cases match any case that does not contradict a parameter.
    assert!(q("a:b:c:x=1;*").contains(&q("a:b:c:x=1;y=2;*")));
    assert!(q("a:b:c:x=1;*").contains(&q("a:b:c:y=2;*")));
    assert!(!q("a:b:c:x=1;*").contains(&q("a:b:c:x=2;y=2;*")));
    assert!(q("a:b:c:*").contains(&q("a:b:c:x=2")));

    // Exact cases require the same parameters.
    assert!(q("a:b:c:x=1;y=2").contains(&q("a:b:c:y=2;x=1")));
    assert!(!q("a:b:c:x=1").contains(&q("a:b:c:x=1;y=2")));
    assert!(!q("a:b:c:x=1").contains(&q("a:b:c:x=1;*")));

    assert!(!q("a:b:c:*").contains(&q("a:b:c")));
}

#[test]
fn expectation_file_string_marks_bare_tests() {
    assert_eq!(q("a:b,c:d").expectation_file_string(), "a:b,c:d:");
    assert_eq!(q("a:b,c:*").expectation_file_string(), "a:b,c:*");
    assert_eq!(q("a:b,c:d:*").expectation_file_string(), "a:b,c:d:*");
    assert_eq!(q("a:b").expectation_file_string(), "a:b");
}
