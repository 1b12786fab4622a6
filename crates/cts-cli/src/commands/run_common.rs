//! Shared reporting for all commands.

use std::path::PathBuf;

use cts_expectations::Diagnostics;

use super::Error;

/// What a command produced.
pub struct Report {
    pub path: PathBuf,
    /// The expectations file as it was read. Diagnostic lines refer to it.
    pub source: String,
    pub diagnostics: Diagnostics,
    /// Rendered document for `--dry-run`.
    pub output: Option<String>,
}

impl Report {
    /// Prints diagnostics to stderr and any output to stdout.
    ///
    /// Exits with status 1 when an error diagnostic was raised.
    pub fn finish(self, color: bool) {
        if !self.diagnostics.is_empty() {
            let path = self.path.display().to_string();
            eprint!(
                "{}",
                self.diagnostics
                    .printer()
                    .source(&self.source)
                    .path(&path)
                    .colored(color)
                    .render()
            );
        }
        if let Some(output) = &self.output {
            print!("{output}");
        }
        if self.diagnostics.has_errors() {
            std::process::exit(1);
        }
    }
}

/// Prints a fatal error and exits with status 1.
pub fn fail(err: &Error, color: bool) -> ! {
    match err {
        Error::Syntax { path, text, source } => {
            let diagnostics = Diagnostics::from(source);
            let path = path.display().to_string();
            eprint!(
                "{}",
                diagnostics
                    .printer()
                    .source(text)
                    .path(&path)
                    .colored(color)
                    .render()
            );
        }
        other => eprintln!("error: {other}"),
    }
    std::process::exit(1)
}
