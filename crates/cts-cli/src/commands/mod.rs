pub mod add_failures;
pub mod format;
pub mod loader;
pub mod run_common;
pub mod update;
pub mod validate;


use std::io;
use std::path::PathBuf;

/// Errors that stop a command before it produces a report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid results in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid results in '{}': {source}", path.display())]
    Results {
        path: PathBuf,
        source: cts_core::Error,
    },

    /// The expectations file could not be parsed. `text` is kept for rendering.
    #[error("{}: {source}", path.display())]
    Syntax {
        path: PathBuf,
        text: String,
        source: cts_expectations::Error,
    },

    #[error(transparent)]
    Engine(#[from] cts_expectations::Error),
}
