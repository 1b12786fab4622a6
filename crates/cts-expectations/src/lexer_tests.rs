use crate::lexer::{lex, token_text};

/// Format tokens without trivia (default for most tests)
fn snapshot(input: &str) -> String {
    format_tokens(input, false)
}

/// Format tokens with trivia included
fn snapshot_raw(input: &str) -> String {
    format_tokens(input, true)
}

fn format_tokens(input: &str, include_trivia: bool) -> String {
    let tokens = lex(input);
    let mut out = String::new();
    for token in tokens {
        if include_trivia || !token.kind.is_trivia() {
            out.push_str(&format!(
                "{:?} {:?}\n",
                token.kind,
                token_text(input, &token)
            ));
        }
    }
    out
}

#[test]
fn full_line() {
    insta::assert_snapshot!(snapshot("crbug.com/1 [ os-a gpu-b ] a:b,c:* [ Failure Slow ] # flaky"), @r##"
    Word "crbug.com/1"
    BracketOpen "["
    Word "os-a"
    Word "gpu-b"
    BracketClose "]"
    Word "a:b,c:*"
    BracketOpen "["
    Word "Failure"
    Word "Slow"
    BracketClose "]"
    Comment "# flaky"
    "##);
}

#[test]
fn brackets_need_no_spaces() {
    insta::assert_snapshot!(snapshot("[os-a]a:b[Pass]"), @r#"
    BracketOpen "["
    Word "os-a"
    BracketClose "]"
    Word "a:b"
    BracketOpen "["
    Word "Pass"
    BracketClose "]"
    "#);
}

#[test]
fn query_punctuation_stays_in_one_word() {
    insta::assert_snapshot!(snapshot(r#"webgpu:api,op:t:x=1;y="a b";*"#), @r#"
    Word "webgpu:api,op:t:x=1;y=\"a"
    Word "b\";*"
    "#);
}

#[test]
fn comment_runs_to_end_of_input() {
    insta::assert_snapshot!(snapshot("# tags: [ os-a ]"), @r##"
    Comment "# tags: [ os-a ]"
    "##);
}

#[test]
fn trivia() {
    insta::assert_snapshot!(snapshot_raw(" a\t[ b ]"), @r#"
    Whitespace " "
    Word "a"
    Whitespace "\t"
    BracketOpen "["
    Whitespace " "
    Word "b"
    Whitespace " "
    BracketClose "]"
    "#);
}

#[test]
fn empty_input() {
    assert!(lex("").is_empty());
}
