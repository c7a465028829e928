//! Unified testing utilities for sealed sessions
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built test data (sessions, ciphers, clocks)
//! - [`builders`] - Fluent builder for sessions with deadlines relative to a clock
//! - [`assertions`] - Assertion helpers for codec and policy results
//! - [`mock`] - Fake [`Cipher`](crate::utils::crypto::Cipher) implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sealed_session::testing::{TestFixtures, TestSessionBuilder};
//!
//! let now = TestFixtures::now();
//! let session = TestSessionBuilder::new(now)
//!     .valid_for_minutes(-1)
//!     .grace_started_minutes_ago(2)
//!     .build();
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod mock;

// Re-export commonly used items for convenience
pub use assertions::*;
pub use builders::TestSessionBuilder;
pub use fixtures::TestFixtures;
pub use mock::{FailingCipher, PassthroughCipher};

/// Common test constants
pub mod constants {
    /// Default provider slug
    pub const TEST_PROVIDER_SLUG: &str = "slug";

    /// Default provider implementation kind
    pub const TEST_PROVIDER_TYPE: &str = "sso";

    /// Default upstream access token
    pub const TEST_ACCESS_TOKEN: &str = "token1234";

    /// Default upstream refresh token
    pub const TEST_REFRESH_TOKEN: &str = "refresh4321";

    /// Default test email address
    pub const TEST_EMAIL: &str = "user@domain.com";

    /// Default test user name
    pub const TEST_USER: &str = "user";

    /// Fixed key for tests that need reproducible cipher setup
    pub const TEST_KEY: &[u8; 32] = b"test_key_32_bytes_long_for_test_";
}
