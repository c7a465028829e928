//! Test fixtures providing pre-built test objects

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::clock::FixedClock;
use crate::models::{SessionLifetimes, SessionState};
use crate::session::ExpirationPolicy;
use crate::utils::crypto::{generate_key, Aes256GcmCipher};

use super::constants::{
    TEST_ACCESS_TOKEN, TEST_EMAIL, TEST_KEY, TEST_PROVIDER_SLUG, TEST_PROVIDER_TYPE,
    TEST_REFRESH_TOKEN, TEST_USER,
};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Current instant truncated to whole seconds
    #[must_use]
    pub fn now() -> DateTime<Utc> {
        let now = Utc::now();
        DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
    }

    /// Session signed in at `now` with default lifetimes
    #[must_use]
    pub fn session_at(now: DateTime<Utc>) -> SessionState {
        SessionState::builder()
            .provider(TEST_PROVIDER_SLUG, TEST_PROVIDER_TYPE)
            .tokens(TEST_ACCESS_TOKEN, TEST_REFRESH_TOKEN)
            .identity(TEST_EMAIL, TEST_USER)
            .build(now, &SessionLifetimes::default())
    }

    /// Standard session with every deadline in the future
    #[must_use]
    pub fn session() -> SessionState {
        Self::session_at(Self::now())
    }

    /// Session whose deadlines have all passed and whose grace period started
    /// two minutes before `now`
    #[must_use]
    pub fn expired_session(now: DateTime<Utc>) -> SessionState {
        SessionState {
            lifetime_deadline: Some(now - Duration::hours(1)),
            refresh_deadline: Some(now - Duration::hours(1)),
            valid_deadline: Some(now - Duration::minutes(1)),
            grace_period_start: Some(now - Duration::minutes(2)),
            ..Self::session_at(now)
        }
    }

    /// Cipher under a freshly generated key
    ///
    /// # Panics
    ///
    /// Panics if the generated key is rejected (should never happen)
    #[must_use]
    pub fn cipher() -> Aes256GcmCipher {
        Aes256GcmCipher::new(&generate_key()).expect("generated key has the right length")
    }

    /// Cipher under the fixed [`TEST_KEY`]
    ///
    /// # Panics
    ///
    /// Panics if the test key is rejected (should never happen)
    #[must_use]
    pub fn fixed_cipher() -> Aes256GcmCipher {
        Aes256GcmCipher::new(TEST_KEY).expect("test key has the right length")
    }

    /// Policy frozen at `now` with the given grace period
    #[must_use]
    pub fn policy_at(now: DateTime<Utc>, grace_period: Duration) -> ExpirationPolicy {
        ExpirationPolicy::new(
            Arc::new(FixedClock::new(now)),
            SessionLifetimes {
                grace_period,
                ..Default::default()
            },
        )
    }
}
