//! Notifier transport error types.

use thiserror::Error;

/// Errors that can occur when delivering a reminder through a transport.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// Authentication failed (invalid webhook token).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The endpoint returned an error response.
    #[error("webhook error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}
