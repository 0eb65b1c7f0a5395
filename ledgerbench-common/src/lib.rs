use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of rows the ledger accepts in a single INSERT transaction.
pub const MAX_BATCH_SIZE: usize = 200;

/// Length of a `0x`-prefixed address (20 bytes hex-encoded).
pub const ADDRESS_LEN: usize = 42;

/// Length of a `0x`-prefixed transaction or block hash (32 bytes hex-encoded).
pub const HASH_LEN: usize = 66;

/// One token transfer as stored in the history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub block_number: u64,
    pub transaction_hash: String,
    pub block_hash: String,
    pub tx_block_index: u32,
    /// Unix seconds.
    pub timestamp: i64,
}

/// An exact-match predicate on one indexed column of the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hash(String),
    From(String),
    To(String),
    Block(u64),
}

impl Lookup {
    /// Column the predicate filters on.
    pub fn column(&self) -> &'static str {
        match self {
            Lookup::Hash(_) => "transactionHash",
            Lookup::From(_) => "fromAddr",
            Lookup::To(_) => "toAddr",
            Lookup::Block(_) => "blockNumber",
        }
    }
}

/// Error types for ledger operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {0}: {1}")]
    HttpError(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Batch exceeds maximum size of {0} rows")]
    BatchTooLarge(usize),

    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),
}

impl LedgerError {
    /// `true` when the gateway rejected a statement because the object already exists.
    pub fn is_already_exists(&self) -> bool {
        self.message_contains(&["already exists", "duplicate"])
    }

    /// `true` when the gateway rejected a statement because the object is missing.
    pub fn is_missing(&self) -> bool {
        self.message_contains(&["does not exist", "not found"])
    }

    fn message_contains(&self, needles: &[&str]) -> bool {
        let msg = match self {
            LedgerError::HttpError(_, msg) => msg.to_lowercase(),
            _ => return false,
        };
        needles.iter().any(|n| msg.contains(n))
    }
}

/// JSON error envelope returned by the gateway for all error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Returns `true` if `name` is safe to splice into a statement as a table or
/// database name: ASCII letter or `_` first, then letters, digits or `_`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
