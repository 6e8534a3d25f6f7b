//! The module contains the errors the engine can return.
//!
//! Remote failures come in two flavours:
//!
//! - [`Conflict`] when the ledger changed remotely since it was fetched.
//! - [`Remote`] for any other transport, auth or server failure.
//!
//! A missing ledger file is not an error: the store reports it as an empty
//! ledger without a version token.
//!
//!  [`Conflict`]: EngineError::Conflict
//!  [`Remote`]: EngineError::Remote
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("ledger changed remotely: {0}")]
    Conflict(String),
    #[error("{0}")]
    Remote(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("No category selected")]
    MissingCategory,
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
