use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a database build. None of these are
/// recoverable; the run stops and no output file is replaced.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("missing {what} file: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("could not parse graph (line {line}): {message}")]
    Parse { line: usize, message: String },

    #[error("graph node {node}: {problem} attribute '{attribute}'")]
    BadAttribute {
        node: String,
        attribute: &'static str,
        problem: &'static str,
    },

    #[error("gene data line {line}: expected at least {expected} comma-separated fields, found {found}")]
    Format {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("graph node {node}: attribute '{attribute}' is not an integer ({value})")]
    Validation {
        node: String,
        attribute: &'static str,
        value: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl DbError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        DbError::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
