//! Fluent builders for creating customizable test objects

use chrono::{DateTime, Duration, Utc};

use crate::models::SessionState;

use super::fixtures::TestFixtures;

/// Builder for sessions whose deadlines are offsets from a reference instant
///
/// Positive offsets are in the future, negative ones in the past.
pub struct TestSessionBuilder {
    now: DateTime<Utc>,
    session: SessionState,
}

impl TestSessionBuilder {
    /// Start from the standard fixture session signed in at `now`
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            session: TestFixtures::session_at(now),
        }
    }

    #[must_use]
    pub fn with_provider(mut self, slug: &str, provider_type: &str) -> Self {
        self.session.provider_slug = slug.to_string();
        self.session.provider_type = provider_type.to_string();
        self
    }

    #[must_use]
    pub fn with_tokens(mut self, access_token: &str, refresh_token: &str) -> Self {
        self.session.access_token = access_token.to_string();
        self.session.refresh_token = refresh_token.to_string();
        self
    }

    #[must_use]
    pub fn lifetime_hours(mut self, hours: i64) -> Self {
        self.session.lifetime_deadline = Some(self.now + Duration::hours(hours));
        self
    }

    #[must_use]
    pub fn refresh_hours(mut self, hours: i64) -> Self {
        self.session.refresh_deadline = Some(self.now + Duration::hours(hours));
        self
    }

    #[must_use]
    pub fn valid_for_minutes(mut self, minutes: i64) -> Self {
        self.session.valid_deadline = Some(self.now + Duration::minutes(minutes));
        self
    }

    #[must_use]
    pub fn grace_started_minutes_ago(mut self, minutes: i64) -> Self {
        self.session.grace_period_start = Some(self.now - Duration::minutes(minutes));
        self
    }

    /// Clear every deadline back to the zero value
    #[must_use]
    pub fn without_deadlines(mut self) -> Self {
        self.session.lifetime_deadline = None;
        self.session.refresh_deadline = None;
        self.session.valid_deadline = None;
        self.session.grace_period_start = None;
        self
    }

    #[must_use]
    pub fn build(self) -> SessionState {
        self.session
    }
}
