//! Session codec error types
//!
//! Every variant is terminal for the token that produced it: callers discard the
//! session and require fresh authentication.

use crate::utils::crypto::CipherError;

/// Errors raised while sealing or opening a session token
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Session state could not be serialized
    #[error("Failed to encode session: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The cipher refused to seal the payload (e.g. bad key length)
    #[error("Failed to seal session: {0}")]
    Seal(#[source] CipherError),

    /// Ciphertext failed its integrity check: wrong key, tampering or truncation
    #[error("Session token failed authentication")]
    AuthenticationFailed,

    /// Authenticated payload does not describe a valid session
    #[error("Malformed session encoding: {0}")]
    MalformedEncoding(#[source] serde_json::Error),
}

impl SessionError {
    /// Whether the token must be discarded. Always `true`; nothing here is retried.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            SessionError::Encoding(_)
            | SessionError::Seal(_)
            | SessionError::AuthenticationFailed
            | SessionError::MalformedEncoding(_) => true,
        }
    }
}
