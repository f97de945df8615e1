use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure conditions of a workflow run
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required argument: {flag}")]
    MissingRequiredArgument { flag: String },

    /// Any other command-line problem, including `--help` and `--version`
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("unreadable image {}: {reason}", path.display())]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("index {index} unavailable: {reason}")]
    IndexUnavailable { index: String, reason: String },

    #[error("failed to write {}: {reason}", path.display())]
    WriteFailure { path: PathBuf, reason: String },

    /// A step ran before the step producing its input
    #[error("step '{step}' is missing its input: {missing}")]
    MissingInput { step: String, missing: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn unreadable(path: &Path, reason: impl Into<String>) -> Self {
        Error::UnreadableImage {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn write_failure(path: &Path, reason: impl ToString) -> Self {
        Error::WriteFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
