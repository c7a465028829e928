//! Session expiration policy
//!
//! Classifies a decoded [`SessionState`] against the injected [`Clock`]. The
//! lifetime deadline is absolute: nothing, including the grace period, keeps a
//! session alive past it. The grace period only tolerates a failed refresh or
//! validation for a bounded window and never moves any deadline.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::models::{SessionLifetimes, SessionState};

/// What the caller should do with a session on this request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Access token is still trusted; allow the request
    Valid,
    /// Access token must be refreshed before the request is allowed
    RefreshRequired,
    /// Upstream refresh failed but the grace window still covers the session
    ProvisionallyValid,
    /// Session cannot be used; start a fresh sign-in
    Reauthenticate,
}

impl SessionStatus {
    /// Whether the request may proceed with this session
    #[must_use]
    pub fn is_usable(self) -> bool {
        matches!(self, SessionStatus::Valid | SessionStatus::ProvisionallyValid)
    }
}

/// Expiration rules bound to a clock and session TTLs
#[derive(Clone)]
pub struct ExpirationPolicy {
    clock: Arc<dyn Clock>,
    lifetimes: SessionLifetimes,
}

impl ExpirationPolicy {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, lifetimes: SessionLifetimes) -> Self {
        Self { clock, lifetimes }
    }

    /// Policy reading the system clock
    #[must_use]
    pub fn with_system_clock(lifetimes: SessionLifetimes) -> Self {
        Self::new(Arc::new(SystemClock), lifetimes)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn grace_period(&self) -> Duration {
        self.lifetimes.grace_period
    }

    #[must_use]
    pub fn lifetimes(&self) -> &SessionLifetimes {
        &self.lifetimes
    }

    /// Classify a freshly decoded session
    #[must_use]
    pub fn classify(&self, session: &SessionState) -> SessionStatus {
        let now = self.now();

        if session.lifetime_period_expired(now) {
            log::debug!(
                "Session from provider {} reached its lifetime deadline",
                session.provider_slug
            );
            return SessionStatus::Reauthenticate;
        }
        if !session.validation_period_expired(now) {
            return SessionStatus::Valid;
        }
        if !session.refresh_period_expired(now) {
            return SessionStatus::RefreshRequired;
        }

        log::debug!(
            "Session from provider {} can no longer be refreshed",
            session.provider_slug
        );
        SessionStatus::Reauthenticate
    }

    /// Classify a session after the upstream refresh or validation call failed
    ///
    /// Opens the grace period if this is the first failure, then allows the
    /// session only while it stays inside that window and its lifetime.
    pub fn classify_after_refresh_failure(&self, session: &mut SessionState) -> SessionStatus {
        let now = self.now();

        if session.lifetime_period_expired(now) {
            return SessionStatus::Reauthenticate;
        }
        if session.start_grace_period(now) {
            log::info!("Starting grace period for provider {}", session.provider_slug);
        }
        if session.is_within_grace_period(self.lifetimes.grace_period, now) {
            log::warn!(
                "Provider {} unavailable, honoring session within grace period",
                session.provider_slug
            );
            SessionStatus::ProvisionallyValid
        } else {
            log::info!("Grace period exhausted for provider {}", session.provider_slug);
            SessionStatus::Reauthenticate
        }
    }

    /// Apply a successful refresh and close any running grace period
    pub fn record_refresh_success(
        &self,
        session: &mut SessionState,
        access_token: String,
        refresh_token: Option<String>,
    ) {
        session.record_refresh(access_token, refresh_token, self.now(), &self.lifetimes);
    }

    /// Apply a successful validation and close any running grace period
    pub fn record_validation_success(&self, session: &mut SessionState) {
        session.record_validation(self.now(), &self.lifetimes);
    }
}

impl fmt::Debug for ExpirationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpirationPolicy")
            .field("lifetimes", &self.lifetimes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn policy_at(now: DateTime<Utc>) -> ExpirationPolicy {
        ExpirationPolicy::new(
            Arc::new(FixedClock::new(now)),
            SessionLifetimes {
                grace_period: Duration::minutes(3),
                ..Default::default()
            },
        )
    }

    fn session_at(now: DateTime<Utc>) -> SessionState {
        SessionState::builder()
            .provider("slug", "sso")
            .tokens("token1234", "refresh4321")
            .identity("user@domain.com", "user")
            .build(now, &SessionLifetimes::default())
    }

    #[test]
    fn test_fresh_session_is_valid() {
        let now = Utc::now();
        let status = policy_at(now).classify(&session_at(now));

        assert_eq!(status, SessionStatus::Valid);
        assert!(status.is_usable());
    }

    #[test]
    fn test_stale_access_token_requires_refresh() {
        let now = Utc::now();
        let mut session = session_at(now);
        session.valid_deadline = Some(now - Duration::minutes(1));

        let status = policy_at(now).classify(&session);
        assert_eq!(status, SessionStatus::RefreshRequired);
        assert!(!status.is_usable());
    }

    #[test]
    fn test_expired_refresh_requires_reauthentication() {
        let now = Utc::now();
        let mut session = session_at(now);
        session.valid_deadline = Some(now - Duration::minutes(1));
        session.refresh_deadline = Some(now - Duration::minutes(1));

        assert_eq!(policy_at(now).classify(&session), SessionStatus::Reauthenticate);
    }

    #[test]
    fn test_lifetime_overrides_valid_deadline() {
        let now = Utc::now();
        let mut session = session_at(now);
        session.lifetime_deadline = Some(now - Duration::seconds(1));

        assert_eq!(policy_at(now).classify(&session), SessionStatus::Reauthenticate);
    }

    #[test]
    fn test_refresh_failure_opens_grace_period() {
        let now = Utc::now();
        let policy = policy_at(now);
        let mut session = session_at(now);
        session.valid_deadline = Some(now - Duration::minutes(1));

        let status = policy.classify_after_refresh_failure(&mut session);

        assert_eq!(status, SessionStatus::ProvisionallyValid);
        assert_eq!(session.grace_period_start, Some(now));
    }

    #[test]
    fn test_grace_period_exhausted() {
        let now = Utc::now();
        let mut session = session_at(now);
        session.grace_period_start = Some(now - Duration::minutes(4));

        let status = policy_at(now).classify_after_refresh_failure(&mut session);

        assert_eq!(status, SessionStatus::Reauthenticate);
        // The first failure stays the anchor
        assert_eq!(session.grace_period_start, Some(now - Duration::minutes(4)));
    }

    #[test]
    fn test_lifetime_overrides_grace_period() {
        let now = Utc::now();
        let mut session = session_at(now);
        session.lifetime_deadline = Some(now - Duration::hours(1));
        session.grace_period_start = Some(now - Duration::minutes(1));

        assert!(session.is_within_grace_period(Duration::minutes(3), now));
        let status = policy_at(now).classify_after_refresh_failure(&mut session);
        assert_eq!(status, SessionStatus::Reauthenticate);
        assert!(!status.is_usable());
    }

    #[test]
    fn test_refresh_success_resets_grace_period() {
        let now = Utc::now();
        let policy = policy_at(now);
        let mut session = session_at(now - Duration::hours(2));
        session.grace_period_start = Some(now - Duration::minutes(1));

        policy.record_refresh_success(&mut session, "token5678".to_string(), None);

        assert_eq!(session.access_token, "token5678");
        assert!(!session.grace_period_started());
        assert_eq!(policy.classify(&session), SessionStatus::Valid);
    }

    #[test]
    fn test_validation_success_resets_grace_period() {
        let now = Utc::now();
        let policy = policy_at(now);
        let mut session = session_at(now);
        session.valid_deadline = Some(now - Duration::minutes(1));
        session.grace_period_start = Some(now - Duration::minutes(1));

        policy.record_validation_success(&mut session);

        assert!(!session.grace_period_started());
        assert_eq!(policy.classify(&session), SessionStatus::Valid);
    }

    #[test]
    fn test_classify_is_repeatable() {
        let now = Utc::now();
        let policy = policy_at(now);
        let session = session_at(now - Duration::minutes(2));

        assert_eq!(policy.classify(&session), policy.classify(&session));
        assert_eq!(policy.classify(&session), SessionStatus::RefreshRequired);
    }

    #[test]
    fn test_system_clock_policy() {
        let before = Utc::now();
        let policy = ExpirationPolicy::with_system_clock(SessionLifetimes::default());
        let now = policy.now();

        assert!(before <= now && now <= Utc::now());
        assert_eq!(policy.lifetimes(), &SessionLifetimes::default());
        assert_eq!(policy.classify(&session_at(before)), SessionStatus::Valid);
    }
}
