#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the sealed-session crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod clock;
pub mod models;
pub mod session;
pub mod settings;
pub mod utils;

// Make test utilities available for both unit tests and integration tests
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use clock::{Clock, FixedClock, SystemClock};
pub use models::{SessionLifetimes, SessionState};
pub use session::{
    marshal_session, unmarshal_session, ExpirationPolicy, SessionError, SessionStatus,
};
pub use settings::SessionSettings;
pub use utils::crypto::{generate_key, Aes256GcmCipher, Cipher, CipherError};
