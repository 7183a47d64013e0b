//! Error types for forum operations.

use thiserror::Error;

/// Result type alias for forum operations.
pub type Result<T> = std::result::Result<T, AgoraError>;

/// Main error type for forum operations.
///
/// Every failure is recovered at the command boundary: the operation that
/// produced it performs no mutation, and the front end surfaces the message
/// to the operator.
#[derive(Error, Debug)]
pub enum AgoraError {
    /// Wrong navigation state (nothing open, already open, not logged in).
    #[error("Precondition error: {0}")]
    Precondition(String),

    /// Role insufficient for the requested operation.
    #[error("Access denied: {0}")]
    Permission(String),

    /// The user has already cast a vote on this comment.
    #[error("User {0} has already voted")]
    DuplicateVote(u32),

    /// Nickname, topic, discussion, or comment id absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or truncated save file.
    #[error("Save file error: {0}")]
    Wire(String),

    /// Invalid input or arguments.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AgoraError {
    /// Creates a new precondition error.
    pub fn precondition<T: ToString>(msg: T) -> Self {
        Self::Precondition(msg.to_string())
    }

    /// Creates a new permission error.
    pub fn permission<T: ToString>(msg: T) -> Self {
        Self::Permission(msg.to_string())
    }

    /// Creates a new not-found error.
    pub fn not_found<T: ToString>(msg: T) -> Self {
        Self::NotFound(msg.to_string())
    }

    /// Creates a new save-file error.
    pub fn wire<T: ToString>(msg: T) -> Self {
        Self::Wire(msg.to_string())
    }

    /// Creates a new validation error.
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }
}
