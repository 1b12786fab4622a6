//! Reading and writing the files a command works on.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use cts_core::{List, Query};
use cts_expectations::{Content, Diagnostics};

use super::Error;
use super::run_common::Report;

/// An expectations file together with its parsed content.
pub struct Document {
    pub path: PathBuf,
    pub source: String,
    pub content: Content,
}

impl Document {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = read(path)?;
        let content = cts_expectations::parse(&source).map_err(|source_err| Error::Syntax {
            path: path.to_owned(),
            text: source.clone(),
            source: source_err,
        })?;
        debug!(path = %path.display(), chunks = content.chunks.len(), "loaded expectations");
        Ok(Self {
            path: path.to_owned(),
            source,
            content,
        })
    }

    /// Writes the content back, or hands it to the report when `dry_run` is set.
    pub fn save(self, diagnostics: Diagnostics, dry_run: bool) -> Result<Report, Error> {
        let text = self.content.to_string();
        let output = if dry_run {
            Some(text)
        } else {
            if text != self.source {
                fs::write(&self.path, &text).map_err(|source| Error::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
            None
        };
        Ok(Report {
            path: self.path,
            source: self.source,
            diagnostics,
            output,
        })
    }
}

/// Loads and concatenates results files.
///
/// Files ending in `.json` hold a JSON array of results. Anything else has one
/// result per line. A test reported more than once for the same tags keeps the
/// highest priority status.
pub fn load_results(paths: &[PathBuf]) -> Result<List, Error> {
    let mut all = List::new();
    for path in paths {
        let text = read(path)?;
        let list = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str::<List>(&text).map_err(|source| Error::Json {
                path: path.clone(),
                source,
            })?
        } else {
            List::parse_lines(&text).map_err(|source| Error::Results {
                path: path.clone(),
                source,
            })?
        };
        debug!(path = %path.display(), results = list.len(), "loaded results");
        all.extend(list.into_inner());
    }
    Ok(all.replace_duplicates(List::resolve_priority))
}

pub fn load_test_list(path: &Path) -> Result<Vec<Query>, Error> {
    Ok(parse_test_list(&read(path)?))
}

/// One query per line. Blank lines and `#` comments are skipped.
pub fn parse_test_list(text: &str) -> Vec<Query> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(Query::parse)
        .collect()
}

/// The test list given on the command line, or the tests that have results.
pub fn test_list_or_results(path: Option<&Path>, results: &List) -> Result<Vec<Query>, Error> {
    match path {
        Some(path) => load_test_list(path),
        None => Ok(results.iter().map(|r| r.query.clone()).collect()),
    }
}

fn read(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })
}
