//! Error types for the zkTLS client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid condition on field '{field}': comparison operator requires a value")]
    InvalidCondition { field: String },

    #[error("app secret required for signing requests")]
    MissingSecret,

    #[error("client not initialized - call init() first")]
    NotInitialized,

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("attestation service error: HTTP {status}: {message}")]
    Service { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
