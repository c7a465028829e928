//! Custom assertion helpers for common testing patterns

use crate::models::SessionState;
use crate::session::{SessionError, SessionStatus};

/// Assert that a codec result failed authentication
///
/// # Panics
///
/// Panics if the result is not [`SessionError::AuthenticationFailed`].
pub fn assert_authentication_failed(result: &Result<SessionState, SessionError>) {
    assert!(
        matches!(result, Err(SessionError::AuthenticationFailed)),
        "Expected AuthenticationFailed, got {result:?}"
    );
}

/// Assert that a codec result carried a malformed payload
///
/// # Panics
///
/// Panics if the result is not [`SessionError::MalformedEncoding`].
pub fn assert_malformed_encoding(result: &Result<SessionState, SessionError>) {
    assert!(
        matches!(result, Err(SessionError::MalformedEncoding(_))),
        "Expected MalformedEncoding, got {result:?}"
    );
}

/// Assert that the policy produced `expected`
///
/// # Panics
///
/// Panics if the statuses differ.
pub fn assert_status(status: SessionStatus, expected: SessionStatus) {
    assert_eq!(status, expected, "Expected {expected:?}, got {status:?}");
}
