//! # Store Error Types
//!
//! Typed error handling for Record Store access.
//! All store operations return `Result<T, StoreError>`.

use thiserror::Error;

/// Core error type for all Record Store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration errors (missing URL or key, bad client setup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network/HTTP error communicating with the store
    #[error("Network error: {0}")]
    Network(String),

    /// The store answered with an error status
    #[error("Store error [{status}]: {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No voucher carries the requested code
    #[error("Voucher not found: {code}")]
    NotFound { code: String },

    /// More than one voucher carries the requested code
    #[error("Voucher code {code} matched {matches} rows")]
    Ambiguous { code: String, matches: usize },

    /// Insert succeeded but the store returned no row
    #[error("Insert returned no rows")]
    EmptyInsert,
}

impl StoreError {
    /// Message surfaced to API callers.
    ///
    /// For store rejections this is the store's own message, untouched.
    pub fn message(&self) -> String {
        match self {
            StoreError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns true if the store reported that no single row matched
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::Ambiguous { .. }
        )
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
