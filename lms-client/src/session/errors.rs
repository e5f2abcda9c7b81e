//! Authentication errors

use thiserror::Error;

/// Message used when the server gives no readable reason
pub const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Credentials rejected or the service was unreachable. The two causes
    /// are reported the same way.
    #[error("{message}")]
    LoginFailed { message: String },

    /// A persisted session exists but is missing required fields.
    /// Never shown to the user; the store treats it as "no session".
    #[error("Stored session is corrupt: {reason}")]
    StorageCorrupt { reason: String },

    /// The session could not be written to durable storage.
    #[error("Failed to persist session: {message}")]
    Storage { message: String },
}

impl AuthError {
    pub fn login_failed<S: Into<String>>(message: S) -> Self {
        Self::LoginFailed {
            message: message.into(),
        }
    }

    /// The generic failure used when the response body is unreadable
    pub fn generic() -> Self {
        Self::login_failed(LOGIN_FAILED)
    }

    pub fn storage_corrupt<S: Into<String>>(reason: S) -> Self {
        Self::StorageCorrupt {
            reason: reason.into(),
        }
    }
}
