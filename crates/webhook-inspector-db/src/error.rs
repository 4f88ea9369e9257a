//! Error types for the storage layer

use sea_orm::DbErr;
use thiserror::Error;

/// Failures while talking to the backing database
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Failed to encode column value: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Rejected record identifier text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("Invalid webhook id '{input}': expected a UUID")]
    Malformed { input: String },
}

/// Rejected pagination parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Invalid limit {limit}: must be between {min} and {max}")]
    LimitOutOfRange { limit: u64, min: u64, max: u64 },
}
