//! Application-wide error types.
//!
//! Every failure a caller sees falls into one of three classes: a
//! validation failure the user can correct in place, a stale-state conflict
//! (the entry is no longer editable), or a transport failure that can be
//! retried with the same submission.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// How a caller is expected to react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Block the action, show the message inline, do not contact the backend.
    Validation,
    /// Blocking message; no automatic retry.
    StaleState,
    /// Offer to retry the same submission; local state is preserved.
    Transport,
    /// Anything else (missing record, misconfiguration, bugs).
    Other,
}

/// Application error types.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The record changed state underneath the caller.
    #[error("Stale state: {0}")]
    StaleState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (e.g., duplicate reference).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Network or backend failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code this error corresponds to.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::NotFound(_) => 404,
            Self::StaleState(_) | Self::Conflict(_) => 409,
            Self::Transport(_) => 502,
            Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for display and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StaleState(_) => "STALE_STATE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the class that decides how the caller reacts.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) | Self::Conflict(_) => ErrorClass::Validation,
            Self::StaleState(_) => ErrorClass::StaleState,
            Self::Transport(_) => ErrorClass::Transport,
            Self::NotFound(_) | Self::Config(_) | Self::Internal(_) => ErrorClass::Other,
        }
    }

    /// Returns true if the same submission may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
