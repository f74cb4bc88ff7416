//! Results of merge and split runs

use std::fmt;
use std::path::PathBuf;

use crate::tiff::errors::{TiffError, TiffResult};

/// What a completed run wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Frames written across all outputs
    pub frames_written: usize,
    /// Files written, in the order they were completed
    pub outputs: Vec<PathBuf>,
}

/// How a merge or split run ended
///
/// `Rejected` means the input was well formed but the operation does not
/// apply to it; nothing was written. `Failed` carries the error that
/// stopped the run.
#[derive(Debug)]
pub enum Outcome {
    Success(Report),
    Rejected(String),
    Failed(TiffError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success(_) => 0,
            Outcome::Failed(_) => 1,
            Outcome::Rejected(_) => 2,
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Outcome::Success(report) => Some(report),
            _ => None,
        }
    }
}

impl From<TiffResult<Report>> for Outcome {
    fn from(result: TiffResult<Report>) -> Self {
        match result {
            Ok(report) => Outcome::Success(report),
            Err(e) => Outcome::Failed(e),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(report) => {
                write!(f, "Finished! Wrote {} frame(s) to {} file(s)",
                       report.frames_written, report.outputs.len())
            },
            Outcome::Rejected(reason) => write!(f, "{}", reason),
            Outcome::Failed(e) => write!(f, "Error converting file: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_outcome_kind() {
        let success = Outcome::Success(Report { frames_written: 2, outputs: vec![PathBuf::from("a.tif")] });
        assert_eq!(success.exit_code(), 0);
        assert!(success.is_success());

        assert_eq!(Outcome::Rejected("nothing to do".to_string()).exit_code(), 2);
        assert_eq!(Outcome::Failed(TiffError::InvalidHeader).exit_code(), 1);
    }

    #[test]
    fn failure_message_carries_the_error() {
        let outcome: Outcome = Err(TiffError::GenericError("disk full".to_string())).into();
        assert!(outcome.to_string().contains("disk full"));
        assert!(outcome.report().is_none());
    }
}
