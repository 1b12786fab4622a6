//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! `*Params` mirror the command `*Args` but keep the raw `ColorChoice`.
//! Conversion resolves it against the terminal.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::add_failures::AddFailuresArgs;
use crate::commands::format::FormatArgs;
use crate::commands::update::UpdateArgs;
use crate::commands::validate::ValidateArgs;

pub struct UpdateParams {
    pub expectations: PathBuf,
    pub results: Vec<PathBuf>,
    pub tests: Option<PathBuf>,
    pub dry_run: bool,
    pub color: ColorChoice,
}

impl UpdateParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            expectations: expectations_path(m),
            results: results_paths(m),
            tests: m.get_one::<PathBuf>("tests").cloned(),
            dry_run: m.get_flag("dry_run"),
            color: parse_color(m),
        }
    }
}

impl From<UpdateParams> for UpdateArgs {
    fn from(p: UpdateParams) -> Self {
        Self {
            expectations: p.expectations,
            results: p.results,
            tests: p.tests,
            dry_run: p.dry_run,
            color: p.color.should_colorize(),
        }
    }
}

pub struct ValidateParams {
    pub expectations: PathBuf,
    pub color: ColorChoice,
}

impl ValidateParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            expectations: expectations_path(m),
            color: parse_color(m),
        }
    }
}

impl From<ValidateParams> for ValidateArgs {
    fn from(p: ValidateParams) -> Self {
        Self {
            expectations: p.expectations,
            color: p.color.should_colorize(),
        }
    }
}

pub struct FormatParams {
    pub expectations: PathBuf,
    pub dry_run: bool,
    pub color: ColorChoice,
}

impl FormatParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            expectations: expectations_path(m),
            dry_run: m.get_flag("dry_run"),
            color: parse_color(m),
        }
    }
}

impl From<FormatParams> for FormatArgs {
    fn from(p: FormatParams) -> Self {
        Self {
            expectations: p.expectations,
            dry_run: p.dry_run,
            color: p.color.should_colorize(),
        }
    }
}

pub struct AddFailuresParams {
    pub expectations: PathBuf,
    pub results: Vec<PathBuf>,
    pub tests: Option<PathBuf>,
    pub dry_run: bool,
    pub color: ColorChoice,
}

impl AddFailuresParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            expectations: expectations_path(m),
            results: results_paths(m),
            tests: m.get_one::<PathBuf>("tests").cloned(),
            dry_run: m.get_flag("dry_run"),
            color: parse_color(m),
        }
    }
}

impl From<AddFailuresParams> for AddFailuresArgs {
    fn from(p: AddFailuresParams) -> Self {
        Self {
            expectations: p.expectations,
            results: p.results,
            tests: p.tests,
            dry_run: p.dry_run,
            color: p.color.should_colorize(),
        }
    }
}

fn expectations_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("expectations")
        .cloned()
        .unwrap_or_default()
}

fn results_paths(m: &ArgMatches) -> Vec<PathBuf> {
    m.get_many::<PathBuf>("results")
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
