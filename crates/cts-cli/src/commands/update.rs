//! Rewrite an expectations file from fresh results.

use std::path::PathBuf;

use tracing::info;

use super::Error;
use super::loader::{Document, load_results, test_list_or_results};
use super::run_common::{Report, fail};

pub struct UpdateArgs {
    pub expectations: PathBuf,
    pub results: Vec<PathBuf>,
    pub tests: Option<PathBuf>,
    pub dry_run: bool,
    pub color: bool,
}

pub fn run(args: UpdateArgs) {
    match execute(&args) {
        Ok(report) => report.finish(args.color),
        Err(err) => fail(&err, args.color),
    }
}

pub fn execute(args: &UpdateArgs) -> Result<Report, Error> {
    let mut doc = Document::load(&args.expectations)?;
    let results = load_results(&args.results)?;
    let test_list = test_list_or_results(args.tests.as_deref(), &results)?;

    let diagnostics = doc.content.update(&results, &test_list)?;
    info!(
        results = results.len(),
        tests = test_list.len(),
        diagnostics = diagnostics.len(),
        "updated expectations"
    );
    doc.save(diagnostics, args.dry_run)
}
