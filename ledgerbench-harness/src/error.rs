use ledgerbench_common::LedgerError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a benchmark run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The ledger rejected or failed to answer an operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl HarnessError {
    /// Process exit code: 3 for setup problems, 1 for failures during a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::Ledger(LedgerError::NetworkError(_))
            | HarnessError::Ledger(LedgerError::InvalidIdentifier(_))
            | HarnessError::Config(_)
            | HarnessError::Io { .. }
            | HarnessError::Parse { .. } => 3,
            HarnessError::Ledger(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
