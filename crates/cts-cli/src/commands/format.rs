use std::path::PathBuf;

use cts_expectations::Diagnostics;

use super::Error;
use super::loader::Document;
use super::run_common::{Report, fail};

pub struct FormatArgs {
    pub expectations: PathBuf,
    pub dry_run: bool,
    pub color: bool,
}

pub fn run(args: FormatArgs) {
    match execute(&args) {
        Ok(report) => report.finish(args.color),
        Err(err) => fail(&err, args.color),
    }
}

pub fn execute(args: &FormatArgs) -> Result<Report, Error> {
    let mut doc = Document::load(&args.expectations)?;
    doc.content.format();
    doc.save(Diagnostics::new(), args.dry_run)
}
