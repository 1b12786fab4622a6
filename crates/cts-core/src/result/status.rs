use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The outcome of a single test run, or the expected outcome of a test.
///
/// Variants are declared in the lexicographic order of their names, so the
/// derived `Ord` sorts statuses the same way their strings do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Internal marker for results already claimed by an expectation.
    /// Never written to an expectations file.
    #[serde(rename = "<<consumed>>")]
    Consumed,
    Abort,
    Crash,
    Failure,
    Pass,
    RetryOnFailure,
    Skip,
    Slow,
    Unknown,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Consumed => "<<consumed>>",
            Status::Abort => "Abort",
            Status::Crash => "Crash",
            Status::Failure => "Failure",
            Status::Pass => "Pass",
            Status::RetryOnFailure => "RetryOnFailure",
            Status::Skip => "Skip",
            Status::Slow => "Slow",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "<<consumed>>" => Status::Consumed,
            "Abort" => Status::Abort,
            "Crash" => Status::Crash,
            "Failure" => Status::Failure,
            "Pass" => Status::Pass,
            "RetryOnFailure" => Status::RetryOnFailure,
            "Skip" => Status::Skip,
            "Slow" => Status::Slow,
            "Unknown" => Status::Unknown,
            _ => return Err(Error::UnknownStatus(s.to_string())),
        })
    }
}
