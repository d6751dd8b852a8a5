//! Error types

use crate::board::EdgeId;

/// Errors raised by the core
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The edge is already drawn, or does not belong to this board
    #[error("invalid move: edge {edge} is not available")]
    InvalidMove { edge: EdgeId },

    #[error("invalid configuration: board radius must be at least 1 (got {0})")]
    InvalidRadius(i32),

    #[error("invalid configuration: search depth must not be negative (got {0})")]
    InvalidDepth(i32),

    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GameError {
    /// True for errors that reject a match setup rather than a move
    pub fn is_configuration(&self) -> bool {
        !matches!(self, GameError::InvalidMove { .. })
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
