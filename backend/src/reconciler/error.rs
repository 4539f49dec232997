use crate::db::StoreError;
use thiserror::Error;

/// Terminal failures of a ranking import. None of them are retried.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no target round selected")]
    Validation,

    #[error("the uploaded sheet is empty")]
    EmptyFile,

    #[error("the uploaded sheet has a header row but no data rows")]
    NoDataRows,

    #[error("cannot read spreadsheet: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Persistence(#[from] StoreError),
}

impl ImportError {
    /// Stable identifier reported to clients alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::Validation => "validation",
            ImportError::EmptyFile => "empty_file",
            ImportError::NoDataRows => "no_data_rows",
            ImportError::Decode(_) => "decode",
            ImportError::Persistence(_) => "persistence",
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Persistence(StoreError::from(err))
    }
}
