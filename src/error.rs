//! Error types for the boundary workflow.

use thiserror::Error;

use crate::controller::SessionStatus;

/// Result type for boundary operations
pub type Result<T> = core::result::Result<T, BoundaryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundaryError {
    /// The area calculator only accepts a complete boundary.
    #[error("expected {expected} boundary points, got {got}")]
    InvalidInput { expected: usize, got: usize },
    /// An entry point was called in a status that does not accept it.
    #[error("cannot {action} while {status:?}")]
    InvalidTransition {
        action: &'static str,
        status: SessionStatus,
    },
    #[error("invalid settings: {0}")]
    Config(String),
}

/// Errors writing a finished session to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("session has no complete boundary")]
    NoBoundary,
    #[error("failed to serialize boundary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write boundary file: {0}")]
    Io(#[from] std::io::Error),
}

/// Why the location provider could not supply a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}
