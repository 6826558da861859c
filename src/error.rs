//! Error types for the client.
//!
//! Interactive mistakes (clicking an occupied cell, clicking out of turn) are
//! not errors and never reach these types. What remains are configuration
//! problems and programming mistakes such as asking for a screen that does
//! not exist.

use std::path::PathBuf;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write settings file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Errors that can occur when creating a game session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unsupported board size {0} (expected one of 7, 9, 11, 13, 15)")]
    UnsupportedBoardSize(usize),
}

/// Errors surfaced by the application state machine and the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unknown screen: {0}")]
    UnknownScreen(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("engine error: {0}")]
    Engine(#[from] hex_engine::EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
