//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Expectations file (positional).
pub fn expectations_arg() -> Arg {
    Arg::new("expectations")
        .value_name("EXPECTATIONS")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Expectations file")
}

/// Results files (-r/--results), repeatable.
pub fn results_arg() -> Arg {
    Arg::new("results")
        .short('r')
        .long("results")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Append)
        .required(true)
        .help("Results file: JSON when it ends in .json, one result per line otherwise")
}

/// Test list (-t/--tests).
pub fn tests_arg() -> Arg {
    Arg::new("tests")
        .short('t')
        .long("tests")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("List of every known test, one query per line (defaults to the tests with results)")
}

/// Print instead of writing (--dry-run).
pub fn dry_run_arg() -> Arg {
    Arg::new("dry_run")
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help("Print the updated expectations instead of writing the file")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .global(true)
        .help("Verbosity level (-v for info, -vv for debug, -vvv for trace)")
}
