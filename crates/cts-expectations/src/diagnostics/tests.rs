use indoc::indoc;
use rowan::TextRange;

use super::*;

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
    insta::assert_snapshot!(format!("{}", Severity::Note), @"note");
}

#[test]
fn report_and_counts() {
    let mut diagnostics = Diagnostics::new();
    assert!(diagnostics.is_empty());

    diagnostics.report(Severity::Note, 3).message("test now passes").emit();
    diagnostics.report(Severity::Warning, 4).message("no results").emit();
    diagnostics.report(Severity::Error, 5).message("collision").emit();

    assert_eq!(diagnostics.len(), 3);
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.error_count(), 1);
}

#[test]
fn notes_are_not_errors() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(Severity::Note, 1).message("fyi").emit();
    assert!(!diagnostics.has_errors());
}

#[test]
fn extend_keeps_order() {
    let mut a = Diagnostics::new();
    a.report(Severity::Note, 2).message("first").emit();
    let mut b = Diagnostics::new();
    b.report(Severity::Error, 1).message("second").emit();
    a.extend(b);

    insta::assert_snapshot!(a.to_string(), @r"
    2 note: first
    1 error: second
    ");

    a.sort_by_line();
    insta::assert_snapshot!(a.to_string(), @r"
    1 error: second
    2 note: first
    ");
}

#[test]
fn render_plain_without_source() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(Severity::Warning, 7).message("no results found for query 'a:b'").emit();

    insta::assert_snapshot!(diagnostics.printer().render(), @"7 warning: no results found for query 'a:b'");
}

#[test]
fn render_with_source_points_at_line() {
    let source = indoc! {"
        # comment
        a:b [ Failure ]
    "};
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(Severity::Note, 2).message("test now passes").emit();

    let out = diagnostics.printer().source(source).path("expectations.txt").render();
    assert!(out.contains("test now passes"), "{out}");
    assert!(out.contains("expectations.txt:2"), "{out}");
    assert!(out.contains("a:b [ Failure ]"), "{out}");
}

#[test]
fn render_unlocated_with_source() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(Severity::Error, 0).message("boom").emit();

    insta::assert_snapshot!(diagnostics.printer().source("a\n").render(), @"error: boom");
}

#[test]
fn syntax_error_converts_to_located_diagnostic() {
    let err = crate::Error::Syntax {
        line: 2,
        span: TextRange::new(4.into(), 5.into()),
        message: "unexpected ']'".into(),
    };
    let diagnostics = Diagnostics::from(&err);
    let d = diagnostics.iter().next().unwrap();
    assert_eq!(d.line, 2);
    assert_eq!(d.range, Some(TextRange::new(4.into(), 5.into())));
    assert!(diagnostics.has_errors());
}
