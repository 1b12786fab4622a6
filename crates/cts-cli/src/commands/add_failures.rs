//! Append an expectation for every failing result.

use std::path::PathBuf;

use tracing::info;

use cts_expectations::Diagnostics;

use super::Error;
use super::loader::{Document, load_results, test_list_or_results};
use super::run_common::{Report, fail};

pub struct AddFailuresArgs {
    pub expectations: PathBuf,
    pub results: Vec<PathBuf>,
    pub tests: Option<PathBuf>,
    pub dry_run: bool,
    pub color: bool,
}

pub fn run(args: AddFailuresArgs) {
    match execute(&args) {
        Ok(report) => report.finish(args.color),
        Err(err) => fail(&err, args.color),
    }
}

pub fn execute(args: &AddFailuresArgs) -> Result<Report, Error> {
    let mut doc = Document::load(&args.expectations)?;
    let results = load_results(&args.results)?;
    let test_list = test_list_or_results(args.tests.as_deref(), &results)?;

    doc.content
        .add_expectations_for_failing_results(&results, &test_list)?;
    info!(results = results.len(), "added failure expectations");
    doc.save(Diagnostics::new(), args.dry_run)
}
