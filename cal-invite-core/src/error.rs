//! Error types for cal-invite.

use thiserror::Error;

/// Errors that can occur while building events or generating invitations.
#[derive(Error, Debug)]
pub enum CalInviteError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Unknown provider: '{0}'")]
    UnknownProvider(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cal-invite operations.
pub type CalInviteResult<T> = Result<T, CalInviteError>;
