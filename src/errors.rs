// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TidepsError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("DAG run not found: {0}")]
    DagRunNotFound(String),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Failure reported by the execution history store. Never retried here.
    #[error("History store error: {0}")]
    Store(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TidepsError {
    pub fn store(msg: impl Into<String>) -> Self {
        TidepsError::Store(msg.into())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TidepsError>;
