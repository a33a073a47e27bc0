//! Error types for timegrid-engine operations.
//!
//! Event data never produces an error: malformed or out-of-window records
//! degrade to a neutral result. Errors are raised only where a caller hands
//! in configuration or text that must be parsed.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
