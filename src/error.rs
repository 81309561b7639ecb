//! Error types for the minter

use thiserror::Error;

/// Main error type for the minter
#[derive(Error, Debug)]
pub enum MinterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File {path} not found")]
    FileNotFound { path: String },

    #[error("RPC call {method} failed: {message}")]
    Rpc { method: String, message: String },

    #[error("Transaction rejected by node: {0}")]
    TransactionRejected(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Can't find unit for decimals: {0}")]
    UnsupportedDecimals(u32),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Total cost {total} wei exceeds spend limit {limit} wei")]
    SpendLimitExceeded { total: String, limit: String },

    #[error("Input error: {0}")]
    Input(String),
}

/// Failure categories reported on the console before exiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Rpc,
    MissingFile,
    Other,
}

impl MinterError {
    /// Helper for mapping a failed RPC call
    pub fn rpc(method: &str, err: impl ToString) -> Self {
        MinterError::Rpc {
            method: method.to_string(),
            message: err.to_string(),
        }
    }

    /// Console category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            MinterError::Rpc { .. } | MinterError::TransactionRejected(_) => ErrorCategory::Rpc,
            MinterError::FileNotFound { .. } => ErrorCategory::MissingFile,
            _ => ErrorCategory::Other,
        }
    }
}

/// Result type for minter operations
pub type MinterResult<T> = Result<T, MinterError>;
