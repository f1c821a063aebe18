//! Error types for the dashboard host

use dlmm_core::DlmmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Invalid configuration: {field} = {value}, expected {expected}")]
    InvalidConfig {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Unknown pool: {0}")]
    UnknownPool(String),

    #[error("Pool {pool} has no {field}")]
    IncompletePool { pool: String, field: &'static str },

    #[error(transparent)]
    Core(#[from] DlmmError),
}

impl DashError {
    pub fn invalid_config(
        field: &'static str,
        value: impl ToString,
        expected: &'static str,
    ) -> Self {
        DashError::InvalidConfig {
            field,
            value: value.to_string(),
            expected,
        }
    }

    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        DashError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn parse(path: impl AsRef<std::path::Path>, err: impl ToString) -> Self {
        DashError::Parse {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

pub type DashResult<T> = Result<T, DashError>;
