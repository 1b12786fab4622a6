//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("cts-expect")
        .about("Keep conformance test expectation files in sync with test results")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(update_command())
        .subcommand(validate_command())
        .subcommand(format_command())
        .subcommand(add_failures_command())
}

/// Rewrite an expectations file from fresh results.
pub fn update_command() -> Command {
    Command::new("update")
        .about("Update expectations to match test results")
        .after_help(
            r#"EXAMPLES:
  cts-expect update expectations.txt -r results.json
  cts-expect update expectations.txt -r a.txt -r b.txt -t test_list.txt
  cts-expect update expectations.txt -r results.json --dry-run"#,
        )
        .arg(expectations_arg())
        .arg(results_arg())
        .arg(tests_arg())
        .arg(dry_run_arg())
        .arg(color_arg())
}

/// Check an expectations file for collisions.
pub fn validate_command() -> Command {
    Command::new("validate")
        .about("Report colliding or invalid expectations")
        .after_help(
            r#"EXAMPLES:
  cts-expect validate expectations.txt"#,
        )
        .arg(expectations_arg())
        .arg(color_arg())
}

/// Canonicalize the layout of an expectations file.
pub fn format_command() -> Command {
    Command::new("format")
        .about("Sort expectations and collapse blank lines")
        .arg(expectations_arg())
        .arg(dry_run_arg())
        .arg(color_arg())
}

/// Append raw failure expectations.
pub fn add_failures_command() -> Command {
    Command::new("add-failures")
        .about("Add an expectation for every failing result without rewriting existing ones")
        .after_help(
            r#"EXAMPLES:
  cts-expect add-failures expectations.txt -r results.json -t test_list.txt"#,
        )
        .arg(expectations_arg())
        .arg(results_arg())
        .arg(tests_arg())
        .arg(dry_run_arg())
        .arg(color_arg())
}
