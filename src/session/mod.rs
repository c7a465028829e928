//! Session Sealing Module
//!
//! Turns a [`SessionState`](crate::models::SessionState) into an opaque,
//! tamper-evident token and back, and decides whether a decoded session is
//! usable right now.
//!
//! # Modules
//!
//! - [`codec`] - Plaintext encoding plus seal/open through a [`Cipher`](crate::utils::crypto::Cipher)
//! - [`expiration`] - Deadline and grace period classification
//! - [`errors`] - Error taxonomy for token handling

pub mod codec;
pub mod errors;
pub mod expiration;

// Re-export commonly used items for convenience
pub use codec::{decode, encode, marshal_session, unmarshal_session};
pub use errors::SessionError;
pub use expiration::{ExpirationPolicy, SessionStatus};
