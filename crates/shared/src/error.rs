//! Error types for restdb

use thiserror::Error;

/// Error returned when the endpoint answers with a status outside the
/// accepted set for the operation
#[derive(Debug, Error)]
#[error("{method} {table} failed with status {status}: {body}")]
pub struct StatusError {
    pub method: String,
    pub table: String,
    pub status: u16,
    pub body: String,
}

/// Error returned when a filter expression cannot be parsed or rendered
#[derive(Debug, Error)]
#[error("Invalid filter '{expression}': {reason}")]
pub struct InvalidFilterError {
    pub expression: String,
    pub reason: String,
}

/// General restdb error type
#[derive(Debug, Error)]
pub enum RestError {
    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    InvalidFilter(#[from] InvalidFilterError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Refusing to {method} every row of '{table}': no filters given")]
    UnfilteredMutation { method: String, table: String },

    #[error("Invalid Content-Range '{0}'")]
    ContentRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RestError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Status(e) => Some(e.status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RestError>;
