//! Check an expectations file without changing it.

use std::path::PathBuf;

use tracing::info;

use super::Error;
use super::loader::Document;
use super::run_common::{Report, fail};

pub struct ValidateArgs {
    pub expectations: PathBuf,
    pub color: bool,
}

pub fn run(args: ValidateArgs) {
    match execute(&args) {
        Ok(report) => report.finish(args.color),
        Err(err) => fail(&err, args.color),
    }
}

pub fn execute(args: &ValidateArgs) -> Result<Report, Error> {
    let doc = Document::load(&args.expectations)?;
    let diagnostics = doc.content.validate();
    info!(errors = diagnostics.error_count(), "validated expectations");
    Ok(Report {
        path: doc.path,
        source: doc.source,
        diagnostics,
        output: None,
    })
}
