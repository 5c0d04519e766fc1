//! Error types shared across the game.

use thiserror::Error;

use crate::session::GamePhase;

/// Failures of the word supplier boundary.
///
/// An empty batch is reported as [`SupplierError::EmptyBatch`]; the session
/// never accepts it as a valid result.
#[derive(Debug, Error)]
pub enum SupplierError {
    #[error("word supplier returned no words")]
    EmptyBatch,

    #[error("missing API key for the word supplier")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("word supplier responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed supplier response: {0}")]
    Malformed(String),

    #[error("fetch task aborted: {0}")]
    Aborted(String),
}

/// Usage errors raised by the session state machine.
///
/// None of these change state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} while {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: GamePhase,
    },

    #[error("'{0}' is not a guessable key")]
    InvalidKey(char),

    #[error(transparent)]
    Supplier(#[from] SupplierError),
}

/// Errors raised by key-value store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no data directory available")]
    NoDataDir,
}

/// Top-level error returned by the binary.
#[derive(Debug, Error)]
pub enum HangmanError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HangmanError>;
